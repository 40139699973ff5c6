//! Core types and traits for the import-instance module worker
//!
//! This crate provides the data model shared between the lifecycle orchestrator,
//! the health verifier and the operator tooling.
//!
//! # Architecture
//!
//! - **Instances**: `ImportInstance` is the creation request sent to the deploy service
//! - **Modules**: `ModuleRecord` is the persisted outcome of a task, carrying compensation data
//! - **Tasks**: `ExternalTask` is the untyped variable bag delivered by the workflow engine
//! - **Identity**: `InstanceUserResolver` and `TokenExchange` are the collaborator seams
//! - **Errors**: Unified error handling across the worker

pub mod error;
pub mod identity;
pub mod instance;
pub mod module;
pub mod task;

pub use error::{ImportError, ImportResult};
pub use identity::{InstanceUserResolver, Token, TokenExchange};
pub use instance::{ImportInstance, InstanceConfig};
pub use module::{
    HealthCheckOutcome, ModuleDeleteInfo, ModuleQuery, ModuleRecord, RegisteredModule,
    TaskOutcome,
};
pub use task::{ExternalTask, TaskVariable};
