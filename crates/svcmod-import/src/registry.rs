//! Module registry seam
//!
//! The registry owns the persisted modules and the health reports. The worker
//! only contributes the check function; sweeping and scheduling are default
//! methods a registry may override.

use async_trait::async_trait;
use futures::StreamExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use svcmod_import_types::{HealthCheckOutcome, ImportResult, ModuleQuery, RegisteredModule};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Maximum number of modules probed at the same time during a sweep
pub const SWEEP_CONCURRENCY: usize = 10;

pub type HealthCheckFuture =
    Pin<Box<dyn Future<Output = ImportResult<HealthCheckOutcome>> + Send + 'static>>;

/// Check run against each module of a sweep
pub type HealthCheckFn = Arc<dyn Fn(RegisteredModule) -> HealthCheckFuture + Send + Sync>;

#[async_trait]
pub trait ModuleRegistry: Send + Sync + 'static {
    /// Modules matching the query
    async fn list_modules(&self, query: &ModuleQuery) -> ImportResult<Vec<RegisteredModule>>;

    /// Record the result of checking one module
    async fn report_health(
        &self,
        module: &RegisteredModule,
        result: ImportResult<HealthCheckOutcome>,
    );

    /// Check every matching module once and report each result
    ///
    /// A failing module never stops the sweep. Returns the number of modules checked.
    async fn run_health_check(
        &self,
        query: &ModuleQuery,
        check: HealthCheckFn,
    ) -> ImportResult<usize> {
        let modules = self.list_modules(query).await?;
        let count = modules.len();
        debug!("Health check sweep over {} modules", count);

        futures::stream::iter(modules)
            .for_each_concurrent(SWEEP_CONCURRENCY, |module| {
                let check = check.clone();
                async move {
                    let result = check(module.clone()).await;
                    match &result {
                        Ok(outcome) if outcome.degraded => {
                            warn!("Module {} is unhealthy: {}", module.record.id, outcome.detail)
                        }
                        Ok(_) => debug!("Module {} is healthy", module.record.id),
                        Err(e) => error!("Health check of module {} failed: {}", module.record.id, e),
                    }
                    self.report_health(&module, result).await;
                }
            })
            .await;

        Ok(count)
    }

    /// Run `run_health_check` every `interval` until `cancel` fires
    ///
    /// The first sweep happens one interval after the call.
    fn start_health_check(
        self: Arc<Self>,
        cancel: CancellationToken,
        interval: Duration,
        query: ModuleQuery,
        check: HealthCheckFn,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            if interval.is_zero() {
                error!("Refusing to schedule health checks with a zero interval");
                return;
            }

            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    result = self.run_health_check(&query, check.clone()) => {
                        if let Err(e) = result {
                            error!("Health check cycle failed: {}", e);
                        }
                    }
                }
            }

            info!("Health check scheduler received cancellation signal");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use svcmod_import_types::{ImportError, ModuleRecord};

    #[derive(Default)]
    struct FakeRegistry {
        modules: Vec<RegisteredModule>,
        reports: Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl ModuleRegistry for FakeRegistry {
        async fn list_modules(&self, query: &ModuleQuery) -> ImportResult<Vec<RegisteredModule>> {
            Ok(self
                .modules
                .iter()
                .filter(|m| query.matches(&m.record))
                .cloned()
                .collect())
        }

        async fn report_health(
            &self,
            module: &RegisteredModule,
            result: ImportResult<HealthCheckOutcome>,
        ) {
            self.reports
                .lock()
                .unwrap()
                .push((module.record.id.clone(), result.is_ok()));
        }
    }

    fn module(id: &str, module_type: &str) -> RegisteredModule {
        RegisteredModule {
            user_id: "user-1".to_string(),
            record: ModuleRecord {
                id: id.to_string(),
                process_instance_id: "pi".to_string(),
                module_type: module_type.to_string(),
                module_data: Map::new(),
                delete_info: None,
            },
        }
    }

    fn counting_check(calls: Arc<AtomicUsize>) -> HealthCheckFn {
        Arc::new(move |module: RegisteredModule| -> HealthCheckFuture {
            let calls = calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if module.record.id == "bad" {
                    Err(ImportError::MalformedModuleData("no import".into()))
                } else {
                    Ok(HealthCheckOutcome::from_status(200))
                }
            })
        })
    }

    #[tokio::test]
    async fn test_sweep_filters_and_isolates_failures() {
        let registry = FakeRegistry {
            modules: vec![
                module("a", "import"),
                module("bad", "import"),
                module("c", "import"),
                module("other", "analytics"),
            ],
            ..Default::default()
        };
        let calls = Arc::new(AtomicUsize::new(0));

        let checked = registry
            .run_health_check(&ModuleQuery::by_type("import"), counting_check(calls.clone()))
            .await
            .unwrap();

        assert_eq!(checked, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let mut reports = registry.reports.lock().unwrap().clone();
        reports.sort();
        assert_eq!(
            reports,
            vec![
                ("a".to_string(), true),
                ("bad".to_string(), false),
                ("c".to_string(), true)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_recurring_sweep_stops_on_cancel() {
        let registry = Arc::new(FakeRegistry {
            modules: vec![module("a", "import")],
            ..Default::default()
        });
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let handle = registry.clone().start_health_check(
            cancel.clone(),
            Duration::from_secs(60),
            ModuleQuery::by_type("import"),
            counting_check(calls.clone()),
        );

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cancel.cancel();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
