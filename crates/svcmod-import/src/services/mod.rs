//! Import lifecycle services

mod client;
mod extractor;
mod orchestrator;
mod transform;

pub use client::{ImportClient, REQUEST_TIMEOUT};
pub use extractor::{ConfigOverride, RequestExtractor};
pub use orchestrator::{merge_module_data, CompensationFailure, ImportHandler};
pub use transform::{IdentityTransformer, RequestTransformer};
