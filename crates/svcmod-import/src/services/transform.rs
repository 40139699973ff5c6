//! Request transformation before submission

use async_trait::async_trait;
use svcmod_import_types::{ExternalTask, ImportInstance, ImportResult, Token};

/// Validates and normalizes an import request before it is sent
///
/// Deployments plug policy checks in here (permissions, schema checks on configs).
/// Errors are reported to the task source as invalid import requests.
#[async_trait]
pub trait RequestTransformer: Send + Sync {
    async fn transform(
        &self,
        token: &Token,
        task: &ExternalTask,
        request: ImportInstance,
    ) -> ImportResult<ImportInstance>;
}

/// Passes requests through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformer;

#[async_trait]
impl RequestTransformer for IdentityTransformer {
    async fn transform(
        &self,
        _token: &Token,
        _task: &ExternalTask,
        request: ImportInstance,
    ) -> ImportResult<ImportInstance> {
        Ok(request)
    }
}
