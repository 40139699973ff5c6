//! Error types for the import worker

use thiserror::Error;

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;

/// Errors that can occur while creating, compensating or checking imports
#[derive(Error, Debug)]
pub enum ImportError {
    /// Owning user or token could not be resolved
    #[error("Upstream lookup failed: {0}")]
    UpstreamLookupFailed(String),

    /// Required task variable is missing or malformed
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// Config override has a shape that cannot be interpreted
    #[error("Invalid config override for '{config}' in task {task_id}")]
    InvalidConfigOverride { config: String, task_id: String },

    /// Request was rejected by the transformer
    #[error("Invalid import request: {0}")]
    InvalidImportRequest(String),

    /// Deploy service refused or failed the create call
    #[error("Remote create failed: {0}")]
    RemoteCreateFailed(String),

    /// Deploy service refused or failed the delete call
    #[error("Remote delete failed: {0}")]
    RemoteDeleteFailed(String),

    /// Module data does not carry a usable import id
    #[error("Malformed module data: {0}")]
    MalformedModuleData(String),

    /// Status probe could not be performed
    #[error("Health check transport failed: {0}")]
    HealthCheckTransportFailed(String),

    /// Worker configuration is unusable
    #[error("Configuration error: {0}")]
    Configuration(String),
}
