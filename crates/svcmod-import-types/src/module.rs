//! Module records
//!
//! A module is the persisted outcome of one successful task execution. Its
//! `delete_info` is the only data compensation relies on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Everything needed to remove a created import later
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDeleteInfo {
    pub url: String,
    #[serde(default)]
    pub user_id: String,
}

/// Persisted outcome of one task execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// `<process instance id>.<task id>`
    pub id: String,
    pub process_instance_id: String,
    pub module_type: String,
    #[serde(default)]
    pub module_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_info: Option<ModuleDeleteInfo>,
}

/// Module as stored by the registry, with its owning user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredModule {
    pub user_id: String,
    #[serde(flatten)]
    pub record: ModuleRecord,
}

/// Filter used when iterating registered modules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleQuery {
    pub type_filter: Option<String>,
}

impl ModuleQuery {
    pub fn by_type(module_type: impl Into<String>) -> Self {
        Self {
            type_filter: Some(module_type.into()),
        }
    }

    pub fn matches(&self, module: &ModuleRecord) -> bool {
        self.type_filter
            .as_deref()
            .map_or(true, |t| t == module.module_type)
    }
}

/// Result of a create task: the modules to persist and the task outputs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskOutcome {
    pub modules: Vec<ModuleRecord>,
    pub outputs: Map<String, Value>,
}

/// Health of a probed import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckOutcome {
    pub degraded: bool,
    pub detail: String,
}

impl HealthCheckOutcome {
    /// Interpret a status code returned by the deploy service
    pub fn from_status(code: u16) -> Self {
        if code >= 300 {
            Self {
                degraded: true,
                detail: format!("import health check returned status-code {}", code),
            }
        } else {
            Self {
                degraded: false,
                detail: format!("import is healthy (status-code {})", code),
            }
        }
    }
}
