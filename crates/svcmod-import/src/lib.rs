//! Import instance module worker
//!
//! This crate turns workflow tasks into import instances on the deploy service,
//! compensates them on rollback, and keeps checking that created imports stay healthy.
//!
//! # Architecture
//!
//! - **Services**: request extraction, transformation, the deploy-service client and the
//!   lifecycle orchestrator
//! - **Health**: per-module health verification
//! - **Registry**: the module registry seam and its sweep/timer behaviour
//! - **Worker**: wiring of the handler and the health checks at start-up
//!
//! # Usage
//!
//! The hosting process supplies the identity collaborators and a module registry,
//! then calls [`ImportWorker::start`].

pub mod config;
pub mod health;
pub mod registry;
pub mod services;
pub mod worker;

pub use config::ImportConfig;
pub use health::{get_import_id, HealthVerifier};
pub use registry::{HealthCheckFn, HealthCheckFuture, ModuleRegistry};
pub use services::{
    merge_module_data, CompensationFailure, ConfigOverride, IdentityTransformer, ImportClient,
    ImportHandler, RequestExtractor, RequestTransformer,
};
pub use worker::{ImportWorker, WorkerDependencies};

pub use svcmod_import_types::*;
