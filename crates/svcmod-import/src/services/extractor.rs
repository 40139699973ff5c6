//! Task variable extraction
//!
//! Reads the import request, optional module data and per-config overrides
//! from the variables of an external task.

use serde_json::{Map, Number, Value};
use svcmod_import_types::{ExternalTask, ImportError, ImportInstance, ImportResult};
use tracing::debug;

const MODULE_DATA_VARIABLE: &str = "module_data";
const REQUEST_VARIABLE: &str = "request";
const CONFIG_OVERWRITE_PREFIX: &str = "config.json_overwrite.";

/// Value of a `config.json_overwrite.<name>` task variable
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOverride {
    /// JSON text, or a plain string if it does not parse
    Text(String),
    Number(Number),
    Bool(bool),
    /// Object carrying the new value under `value`
    Nested(Value),
}

impl ConfigOverride {
    /// Decode a raw variable value; `None` for shapes that are not overrides
    pub fn decode(raw: &Value) -> Option<Self> {
        match raw {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Object(obj) => obj.get("value").cloned().map(Self::Nested),
            Value::Null | Value::Array(_) => None,
        }
    }

    /// The config value this override stands for
    pub fn into_value(self) -> Value {
        match self {
            Self::Text(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
            Self::Number(n) => Value::Number(n),
            Self::Bool(b) => Value::Bool(b),
            Self::Nested(value) => value,
        }
    }
}

/// Extracts import requests from task variables
#[derive(Debug, Clone, Default)]
pub struct RequestExtractor {
    prefix: String,
}

impl RequestExtractor {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn variable_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Caller supplied module data; anything unusable yields an empty map
    pub fn module_data(&self, task: &ExternalTask) -> Map<String, Value> {
        let variable_name = self.variable_name(MODULE_DATA_VARIABLE);
        let Some(Value::String(raw)) = task.variable(&variable_name) else {
            return Map::new();
        };

        match serde_json::from_str::<Map<String, Value>>(raw) {
            Ok(data) => data,
            Err(e) => {
                debug!(
                    "Ignoring unparsable {} in task {}: {}",
                    variable_name, task.id, e
                );
                Map::new()
            }
        }
    }

    /// Import request with all config overrides applied
    pub fn request(&self, task: &ExternalTask) -> ImportResult<ImportInstance> {
        let variable_name = self.variable_name(REQUEST_VARIABLE);
        let raw = match task.variable(&variable_name) {
            None => {
                return Err(ImportError::InvalidTask(format!(
                    "missing value in {}",
                    variable_name
                )))
            }
            Some(Value::String(raw)) => raw,
            Some(_) => {
                return Err(ImportError::InvalidTask(format!(
                    "value in {} is not a string",
                    variable_name
                )))
            }
        };

        let mut request: ImportInstance = serde_json::from_str(raw).map_err(|e| {
            ImportError::InvalidTask(format!(
                "unable to interpret import request ({}): {}",
                variable_name, e
            ))
        })?;

        self.apply_overrides(task, &mut request)?;
        Ok(request)
    }

    fn apply_overrides(
        &self,
        task: &ExternalTask,
        request: &mut ImportInstance,
    ) -> ImportResult<()> {
        for config in request.configs.iter_mut() {
            let variable_name =
                self.variable_name(&format!("{}{}", CONFIG_OVERWRITE_PREFIX, config.name));
            let Some(raw) = task.variable(&variable_name) else {
                continue;
            };

            let override_value = ConfigOverride::decode(raw).ok_or_else(|| {
                ImportError::InvalidConfigOverride {
                    config: config.name.clone(),
                    task_id: task.id.clone(),
                }
            })?;

            debug!("Overwriting config {} from {}", config.name, variable_name);
            config.value = override_value.into_value();
        }
        Ok(())
    }
}
