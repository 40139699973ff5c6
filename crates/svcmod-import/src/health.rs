//! Health verification of created imports

use serde_json::{Map, Value};
use std::sync::Arc;
use svcmod_import_types::{
    HealthCheckOutcome, ImportError, ImportResult, RegisteredModule, TokenExchange,
};
use tracing::debug;

use crate::registry::{HealthCheckFn, HealthCheckFuture};
use crate::services::ImportClient;

/// Read the import id stored under `import.id` in module data
pub fn get_import_id(module_data: &Map<String, Value>) -> ImportResult<String> {
    let import = module_data
        .get("import")
        .ok_or_else(|| ImportError::MalformedModuleData("missing import in module data".into()))?;

    let import = import
        .as_object()
        .ok_or_else(|| ImportError::MalformedModuleData("invalid import in module data".into()))?;

    import
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ImportError::MalformedModuleData(
                "invalid import in module data (id is not string)".into(),
            )
        })
}

/// Probes the imports behind registered modules
pub struct HealthVerifier {
    tokens: Arc<dyn TokenExchange>,
    client: ImportClient,
}

impl HealthVerifier {
    pub fn new(tokens: Arc<dyn TokenExchange>, client: ImportClient) -> Self {
        Self { tokens, client }
    }

    /// Check one module; `Ok` carries healthy or degraded, `Err` means the check itself failed
    pub async fn check(&self, module: &RegisteredModule) -> ImportResult<HealthCheckOutcome> {
        let id = get_import_id(&module.record.module_data)?;

        let token = self
            .tokens
            .exchange_user_token(&module.user_id)
            .await
            .map_err(|e| match e {
                ImportError::UpstreamLookupFailed(_) => e,
                other => ImportError::UpstreamLookupFailed(other.to_string()),
            })?;

        let code = self.client.check_health(&token, &id).await?;
        debug!("Import {} of module {} answered {}", id, module.record.id, code);

        Ok(HealthCheckOutcome::from_status(code))
    }

    /// Wrap this verifier into the function value handed to the registry
    pub fn into_check_fn(self: Arc<Self>) -> HealthCheckFn {
        Arc::new(move |module: RegisteredModule| -> HealthCheckFuture {
            let verifier = self.clone();
            Box::pin(async move { verifier.check(&module).await })
        })
    }
}
