//! Deploy service client
//!
//! Creates, deletes and probes import instances under `<deploy url>/instances`.

use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use svcmod_import_types::{ImportError, ImportInstance, ImportResult, Token};
use tracing::{debug, warn};
use url::Url;

/// Upper bound for every call against the deploy service
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const USER_ID_HEADER: &str = "X-UserId";

/// HTTP client for the import deploy service
#[derive(Debug, Clone)]
pub struct ImportClient {
    client: Client,
    base_url: Url,
}

impl ImportClient {
    pub fn new(deploy_url: &str) -> ImportResult<Self> {
        let base_url = Url::parse(deploy_url).map_err(|e| {
            ImportError::Configuration(format!("invalid import deploy url '{}': {}", deploy_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ImportError::Configuration(format!(
                "import deploy url '{}' cannot be used as a base url",
                deploy_url
            )));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                ImportError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, base_url })
    }

    fn url_with_segments(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.to_string()
    }

    /// Collection url used for creation
    pub fn instances_url(&self) -> String {
        self.url_with_segments(&["instances"])
    }

    /// Url of a single instance, with the id path-escaped
    pub fn instance_url(&self, id: &str) -> String {
        self.url_with_segments(&["instances", id])
    }

    fn authorize(request: RequestBuilder, token: &Token) -> RequestBuilder {
        request
            .bearer_auth(token.jwt())
            .header(USER_ID_HEADER, token.user_id())
    }

    /// Create an import instance; the response body is the authoritative state
    pub async fn create(
        &self,
        token: &Token,
        request: &ImportInstance,
    ) -> ImportResult<ImportInstance> {
        let url = self.instances_url();
        debug!("Sending import request for {} to {}", request.name, url);

        let response = Self::authorize(self.client.post(&url), token)
            .json(request)
            .send()
            .await
            .map_err(|e| ImportError::RemoteCreateFailed(format!("request failed: {}", e)))?;

        let status = response.status();
        if status.as_u16() >= 300 {
            let body = response.text().await.unwrap_or_default();
            warn!("Import creation rejected with status {}: {}", status, body);
            return Err(ImportError::RemoteCreateFailed(format!(
                "unexpected status {}: {}",
                status, body
            )));
        }

        let created = response.json::<ImportInstance>().await.map_err(|e| {
            ImportError::RemoteCreateFailed(format!("Failed to parse response: {}", e))
        })?;

        // Without an id there is nothing to address for deletion or health checks
        if created.id.is_empty() {
            warn!("Import creation for {} returned no instance id", request.name);
            return Err(ImportError::RemoteCreateFailed(
                "created import has no id".to_string(),
            ));
        }

        Ok(created)
    }

    /// Delete an import instance by its url; a missing instance counts as deleted
    pub async fn delete(&self, token: Option<&Token>, url: &str) -> ImportResult<()> {
        debug!("Deleting import instance {}", url);

        let mut request = self.client.delete(url);
        if let Some(token) = token {
            request = Self::authorize(request, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ImportError::RemoteDeleteFailed(format!("request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("Import instance {} already gone", url);
            return Ok(());
        }
        if status.as_u16() >= 300 {
            let body = response.text().await.unwrap_or_default();
            return Err(ImportError::RemoteDeleteFailed(format!(
                "unexpected response: {}, {}",
                status, body
            )));
        }

        Ok(())
    }

    /// Probe an import instance and return the raw status code
    pub async fn check_health(&self, token: &Token, id: &str) -> ImportResult<u16> {
        let url = self.instance_url(id);
        debug!("Checking import instance {}", url);

        let response = Self::authorize(self.client.get(&url), token)
            .send()
            .await
            .map_err(|e| ImportError::HealthCheckTransportFailed(format!("{}: {}", url, e)))?;

        Ok(response.status().as_u16())
    }
}
