//! External task as delivered by the workflow engine

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A single task variable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskVariable {
    #[serde(default)]
    pub value: Value,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

impl TaskVariable {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            value_type: None,
        }
    }
}

/// Fetched and locked external task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalTask {
    pub id: String,
    pub process_instance_id: String,
    #[serde(default)]
    pub variables: HashMap<String, TaskVariable>,
}

impl ExternalTask {
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name).map(|v| &v.value)
    }
}
