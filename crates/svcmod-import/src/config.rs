//! Worker configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use svcmod_import_types::{ImportError, ImportResult};

/// Settings consumed by the import worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Prefix prepended to every task variable name the worker reads
    #[serde(default)]
    pub worker_param_prefix: String,
    /// Base URL of the import deploy service
    pub import_deploy_url: String,
    /// Interval between health check sweeps, e.g. `10m` or `1h 30m`
    pub health_check_interval: String,
    /// Worker topic; doubles as module type and health check filter
    pub worker_topic: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            worker_param_prefix: String::new(),
            import_deploy_url: "http://localhost:8080".to_string(),
            health_check_interval: "10m".to_string(),
            worker_topic: "import".to_string(),
        }
    }
}

impl ImportConfig {
    /// Parse the health check interval
    pub fn health_check_interval(&self) -> ImportResult<Duration> {
        let interval = humantime::parse_duration(self.health_check_interval.trim()).map_err(|e| {
            ImportError::Configuration(format!(
                "invalid health_check_interval '{}': {}",
                self.health_check_interval, e
            ))
        })?;

        if interval.is_zero() {
            return Err(ImportError::Configuration(
                "health_check_interval must be greater than zero".to_string(),
            ));
        }

        Ok(interval)
    }

    /// Full task variable name for a worker parameter
    pub fn param(&self, name: &str) -> String {
        format!("{}{}", self.worker_param_prefix, name)
    }
}
