//! Communication Service - Main application use case
//!
//! The verb surface callers use to talk to named backends. Each call builds a
//! per-request executor (resolving the backend on the way), issues the
//! request, and classifies the response through the validator.

use crate::domain::ports::{BackendProvider, DiscoveryClient, TokenManager};
use crate::error::CommError;
use crate::infrastructure::executor::{RequestExecutorFactory, RequestOptions};
use crate::infrastructure::resolver::ResourceResolver;
use crate::infrastructure::validator::ResponseValidator;
use std::sync::Arc;

/// REST communication service over named backends.
///
/// Holds the capability set `{ backend provider, discovery client, token
/// manager }` injected at construction.
pub struct CommService {
    factory: RequestExecutorFactory,
    validator: ResponseValidator,
    resolver: Arc<ResourceResolver>,
}

impl CommService {
    pub fn new(
        backends: Arc<dyn BackendProvider>,
        discovery: Arc<dyn DiscoveryClient>,
        token_manager: Option<Arc<dyn TokenManager>>,
    ) -> Self {
        let resolver = Arc::new(ResourceResolver::new(backends.clone(), discovery));
        let factory = RequestExecutorFactory::new(resolver.clone(), backends);
        let validator = ResponseValidator::new(token_manager);
        Self {
            factory,
            validator,
            resolver,
        }
    }

    /// The resolver backing this service; exposed for observability.
    pub fn resolver(&self) -> &Arc<ResourceResolver> {
        &self.resolver
    }

    pub async fn get(
        &self,
        correlation_id: Option<&str>,
        key: &str,
        url: &str,
        options: &RequestOptions,
    ) -> Result<serde_json::Value, CommError> {
        let executor = self.factory.create(correlation_id, key, options).await?;
        let raw = executor.get(&format_url(url)).await?;
        self.validator.validate(executor.correlation_id(), raw).await
    }

    pub async fn get_by_id(
        &self,
        correlation_id: Option<&str>,
        key: &str,
        url: &str,
        id: &str,
        options: &RequestOptions,
    ) -> Result<serde_json::Value, CommError> {
        let executor = self.factory.create(correlation_id, key, options).await?;
        let raw = executor.get(&format_url_params(url, id)).await?;
        self.validator.validate(executor.correlation_id(), raw).await
    }

    pub async fn post(
        &self,
        correlation_id: Option<&str>,
        key: &str,
        url: &str,
        body: &serde_json::Value,
        options: &RequestOptions,
    ) -> Result<serde_json::Value, CommError> {
        let executor = self.factory.create(correlation_id, key, options).await?;
        let raw = executor.post(&format_url(url), body).await?;
        self.validator.validate(executor.correlation_id(), raw).await
    }

    pub async fn post_by_id(
        &self,
        correlation_id: Option<&str>,
        key: &str,
        url: &str,
        id: &str,
        body: &serde_json::Value,
        options: &RequestOptions,
    ) -> Result<serde_json::Value, CommError> {
        let executor = self.factory.create(correlation_id, key, options).await?;
        let raw = executor.post(&format_url_params(url, id), body).await?;
        self.validator.validate(executor.correlation_id(), raw).await
    }

    pub async fn delete(
        &self,
        correlation_id: Option<&str>,
        key: &str,
        url: &str,
        options: &RequestOptions,
    ) -> Result<serde_json::Value, CommError> {
        let executor = self.factory.create(correlation_id, key, options).await?;
        let raw = executor.delete(&format_url(url)).await?;
        self.validator.validate(executor.correlation_id(), raw).await
    }

    pub async fn delete_by_id(
        &self,
        correlation_id: Option<&str>,
        key: &str,
        url: &str,
        id: &str,
        options: &RequestOptions,
    ) -> Result<serde_json::Value, CommError> {
        let executor = self.factory.create(correlation_id, key, options).await?;
        let raw = executor.delete(&format_url_params(url, id)).await?;
        self.validator.validate(executor.correlation_id(), raw).await
    }
}

/// Normalize a relative request path.
fn format_url(url: &str) -> String {
    url.trim_start_matches('/').to_string()
}

/// Normalize a relative request path and append an id segment.
fn format_url_params(url: &str, id: &str) -> String {
    let base = format_url(url);
    let base = base.trim_end_matches('/');
    format!("{}/{}", base, id)
}
