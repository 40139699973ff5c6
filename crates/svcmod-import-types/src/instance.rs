//! Import instance types
//!
//! Wire representation of an import instance as understood by the deploy service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Import instance creation request and, once created, the authoritative remote state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportInstance {
    /// Assigned by the deploy service; empty until created
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub import_type_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image: String,
    /// Topic the import publishes to
    #[serde(rename = "kafka_topic", deserialize_with = "null_as_default")]
    pub topic: String,
    #[serde(deserialize_with = "null_as_default")]
    pub configs: Vec<InstanceConfig>,
    pub restart: Option<bool>,
    /// Never sent over the wire
    #[serde(skip)]
    pub service_id: String,
    /// Never sent over the wire
    #[serde(skip)]
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub generated: bool,
}

impl ImportInstance {
    /// Find a config entry by name
    pub fn config(&self, name: &str) -> Option<&InstanceConfig> {
        self.configs.iter().find(|c| c.name == name)
    }
}

/// Single named config value of an import instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub value: Value,
}
