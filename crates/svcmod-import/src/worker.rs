//! Worker start-up
//!
//! Builds the task handler and hooks the health check into the module registry:
//! one sweep right away and a recurring sweep at the configured interval.

use std::sync::Arc;
use svcmod_import_types::{ImportResult, InstanceUserResolver, ModuleQuery, TokenExchange};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::ImportConfig;
use crate::health::HealthVerifier;
use crate::registry::ModuleRegistry;
use crate::services::{ImportHandler, RequestTransformer};

/// Collaborators supplied by the hosting process
pub struct WorkerDependencies {
    pub users: Arc<dyn InstanceUserResolver>,
    pub tokens: Arc<dyn TokenExchange>,
    pub registry: Arc<dyn ModuleRegistry>,
    /// Pass-through when `None`
    pub transformer: Option<Arc<dyn RequestTransformer>>,
}

/// Running import worker
pub struct ImportWorker {
    handler: Arc<ImportHandler>,
    health_check: JoinHandle<()>,
    cancel: CancellationToken,
}

impl ImportWorker {
    /// Build the handler and start health checking
    ///
    /// Returns once the initial sweep has finished. The recurring sweep keeps
    /// running until `cancel` fires.
    pub async fn start(
        config: ImportConfig,
        deps: WorkerDependencies,
        cancel: CancellationToken,
    ) -> ImportResult<Self> {
        let interval = config.health_check_interval()?;
        let query = ModuleQuery::by_type(config.worker_topic.clone());

        let mut handler = ImportHandler::new(config, deps.users, deps.tokens.clone())?;
        if let Some(transformer) = deps.transformer {
            handler = handler.with_transformer(transformer);
        }
        let handler = Arc::new(handler);

        let verifier = Arc::new(HealthVerifier::new(deps.tokens, handler.client().clone()));
        let check = verifier.into_check_fn();

        let health_check = deps.registry.clone().start_health_check(
            cancel.clone(),
            interval,
            query.clone(),
            check.clone(),
        );

        match deps.registry.run_health_check(&query, check).await {
            Ok(count) => info!("Initial health check covered {} modules", count),
            Err(e) => error!("Initial health check failed: {}", e),
        }

        info!(
            "Import worker started, health checks every {}",
            humantime::format_duration(interval)
        );

        Ok(Self {
            handler,
            health_check,
            cancel,
        })
    }

    /// Handler to hand tasks and compensations to
    pub fn handler(&self) -> Arc<ImportHandler> {
        self.handler.clone()
    }

    /// Stop the recurring health check and wait for it to finish
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.health_check.await {
            error!("Health check task failed: {:?}", e);
        }
    }
}
