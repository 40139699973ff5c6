//! Import lifecycle orchestration
//!
//! Runs the create path for a workflow task and the compensation path for
//! previously emitted modules.

use serde_json::{json, Map, Value};
use std::sync::Arc;
use svcmod_import_types::{
    ExternalTask, ImportError, ImportInstance, ImportResult, InstanceUserResolver,
    ModuleDeleteInfo, ModuleRecord, TaskOutcome, Token, TokenExchange,
};
use tracing::{debug, error, info, warn};

use super::client::ImportClient;
use super::extractor::RequestExtractor;
use super::transform::{IdentityTransformer, RequestTransformer};
use crate::config::ImportConfig;

const IMPORT_KEY: &str = "import";
const IMPORT_ID_OUTPUT: &str = "import_id";

/// Compensation that could not be completed for one module
#[derive(Debug)]
pub struct CompensationFailure {
    pub module_id: String,
    pub error: ImportError,
}

/// Merge caller module data with the created import
///
/// The import result is laid down first and the caller data second, so caller
/// keys are never replaced by the `import` entry.
pub fn merge_module_data(caller: Map<String, Value>, import: Value) -> Map<String, Value> {
    let mut merged = Map::new();
    merged.insert(IMPORT_KEY.to_string(), import);
    merged.extend(caller);
    merged
}

/// Task handler creating and compensating import instances
pub struct ImportHandler {
    config: ImportConfig,
    users: Arc<dyn InstanceUserResolver>,
    tokens: Arc<dyn TokenExchange>,
    transformer: Arc<dyn RequestTransformer>,
    extractor: RequestExtractor,
    client: ImportClient,
}

impl ImportHandler {
    pub fn new(
        config: ImportConfig,
        users: Arc<dyn InstanceUserResolver>,
        tokens: Arc<dyn TokenExchange>,
    ) -> ImportResult<Self> {
        let client = ImportClient::new(&config.import_deploy_url)?;
        let extractor = RequestExtractor::new(config.worker_param_prefix.clone());

        Ok(Self {
            config,
            users,
            tokens,
            transformer: Arc::new(IdentityTransformer),
            extractor,
            client,
        })
    }

    /// Replace the default pass-through transformer
    pub fn with_transformer(mut self, transformer: Arc<dyn RequestTransformer>) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn client(&self) -> &ImportClient {
        &self.client
    }

    fn module_id(task: &ExternalTask) -> String {
        format!("{}.{}", task.process_instance_id, task.id)
    }

    async fn task_token(&self, task: &ExternalTask) -> ImportResult<Token> {
        let user_id = self
            .users
            .get_instance_user(&task.process_instance_id)
            .await
            .map_err(|e| {
                error!("Unable to get instance user for {}: {}", task.process_instance_id, e);
                upstream(e)
            })?;

        self.tokens.exchange_user_token(&user_id).await.map_err(|e| {
            error!("Unable to exchange user token for {}: {}", user_id, e);
            upstream(e)
        })
    }

    /// Create the import for a task and describe the resulting module
    pub async fn do_task(&self, task: &ExternalTask) -> ImportResult<TaskOutcome> {
        debug!("Handling task {} of process {}", task.id, task.process_instance_id);

        let token = self.task_token(task).await?;

        let request = self.extractor.request(task)?;
        let caller_data = self.extractor.module_data(task);

        let request = self
            .transformer
            .transform(&token, task, request)
            .await
            .map_err(|e| match e {
                ImportError::InvalidImportRequest(_) => e,
                other => ImportError::InvalidImportRequest(other.to_string()),
            })?;

        let created = self.client.create(&token, &request).await?;
        info!("Created import {} for task {}", created.id, task.id);

        Ok(self.build_outcome(task, &token, caller_data, created))
    }

    fn build_outcome(
        &self,
        task: &ExternalTask,
        token: &Token,
        caller_data: Map<String, Value>,
        created: ImportInstance,
    ) -> TaskOutcome {
        let delete_info = ModuleDeleteInfo {
            url: self.client.instance_url(&created.id),
            user_id: token.user_id().to_string(),
        };

        let mut outputs = Map::new();
        outputs.insert(IMPORT_ID_OUTPUT.to_string(), json!(created.id));

        let import = serde_json::to_value(&created).unwrap_or_else(|e| {
            warn!("Unable to encode import {}: {}", created.id, e);
            json!({ "id": created.id })
        });

        TaskOutcome {
            modules: vec![ModuleRecord {
                id: Self::module_id(task),
                process_instance_id: task.process_instance_id.clone(),
                module_type: self.config.worker_topic.clone(),
                module_data: merge_module_data(caller_data, import),
                delete_info: Some(delete_info),
            }],
            outputs,
        }
    }

    /// Remove every import referenced by the given modules
    ///
    /// Each module is compensated independently; failures are logged and
    /// returned, never short-circuiting the rest.
    pub async fn undo(&self, modules: &[ModuleRecord], reason: &str) -> Vec<CompensationFailure> {
        debug!("Undo of {} modules, reason: {}", modules.len(), reason);

        let mut failures = Vec::new();
        for module in modules {
            let Some(info) = &module.delete_info else {
                continue;
            };

            if let Err(e) = self.use_delete_info(info).await {
                error!("Unable to use delete info of module {}: {}", module.id, e);
                failures.push(CompensationFailure {
                    module_id: module.id.clone(),
                    error: e,
                });
            }
        }
        failures
    }

    async fn use_delete_info(&self, info: &ModuleDeleteInfo) -> ImportResult<()> {
        let token = if info.user_id.is_empty() {
            None
        } else {
            Some(
                self.tokens
                    .exchange_user_token(&info.user_id)
                    .await
                    .map_err(upstream)?,
            )
        };

        self.client.delete(token.as_ref(), &info.url).await
    }
}

fn upstream(e: ImportError) -> ImportError {
    match e {
        ImportError::UpstreamLookupFailed(_) => e,
        other => ImportError::UpstreamLookupFailed(other.to_string()),
    }
}
