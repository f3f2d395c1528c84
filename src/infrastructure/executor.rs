//! Request Executor Factory
//!
//! Builds a per-call HTTP client bound to a resolved backend url, with the
//! API-key, correlation-id, bearer, and content-type headers assembled, and
//! the transport configured to treat any status in [200, 503] as a regular
//! response. Success/failure classification is the validator's job.

use crate::domain::ports::BackendProvider;
use crate::domain::value_objects::ServiceLocation;
use crate::error::CommError;
use crate::infrastructure::resolver::ResourceResolver;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// API-key header sent to backends that require one.
pub const HEADER_API_KEY: &str = "x-api-key";
/// Correlation-id header propagated for cross-service tracing.
pub const HEADER_CORRELATION_ID: &str = "x-correlation-id";

const COMPONENT: &str = "RequestExecutorFactory";
const OP_CREATE: &str = "create";
const OP_EXECUTE: &str = "execute";

/// Lowest status the transport accepts without raising.
const STATUS_WINDOW_MIN: u16 = 200;
/// Highest status the transport accepts without raising.
const STATUS_WINDOW_MAX: u16 = 503;

/// Generate a fresh correlation id.
pub fn new_correlation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Per-call options supplied by the caller.
///
/// Never mutated by the factory; the effective correlation id is observable
/// on the returned [`RequestExecutor`] instead.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Explicit base url; when set, resolution and the cache are skipped.
    pub url: Option<String>,
    /// Overrides the resolved resource's api key.
    pub api_key: Option<String>,
    /// Bearer token for the Authorization header.
    pub token: Option<String>,
    /// Overrides the backend-configured timeout.
    pub timeout: Option<Duration>,
    /// Extra headers merged over the computed defaults (last-write-wins).
    pub headers: BTreeMap<String, String>,
    /// One-off destination override passed through to the resolver.
    pub resource: Option<ServiceLocation>,
}

impl RequestOptions {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_resource(mut self, resource: ServiceLocation) -> Self {
        self.resource = Some(resource);
        self
    }
}

/// Ephemeral description of one outbound call: base url, headers, timeout,
/// and the correlation id the call runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub base_url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
    pub correlation_id: String,
}

/// Raw response surfaced by the transport before classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

/// Builds [`RequestExecutor`]s bound to resolved backends.
pub struct RequestExecutorFactory {
    resolver: Arc<ResourceResolver>,
    backends: Arc<dyn BackendProvider>,
}

impl RequestExecutorFactory {
    pub fn new(resolver: Arc<ResourceResolver>, backends: Arc<dyn BackendProvider>) -> Self {
        Self { resolver, backends }
    }

    /// Create an executor for one call against the named backend.
    ///
    /// Resolution is skipped entirely when `options.url` is set. The
    /// correlation id is the caller's, or freshly generated when absent.
    pub async fn create(
        &self,
        correlation_id: Option<&str>,
        key: &str,
        options: &RequestOptions,
    ) -> Result<RequestExecutor, CommError> {
        let spec = self.build_spec(correlation_id, key, options).await?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = spec.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            CommError::transport(
                COMPONENT,
                OP_CREATE,
                &spec.correlation_id,
                "failed to build http client",
                Some(e),
            )
        })?;

        tracing::debug!(
            correlation_id = %spec.correlation_id,
            key,
            base_url = %spec.base_url,
            "request executor created"
        );

        Ok(RequestExecutor { client, spec })
    }

    /// Assemble the request spec as a pure value.
    async fn build_spec(
        &self,
        correlation_id: Option<&str>,
        key: &str,
        options: &RequestOptions,
    ) -> Result<RequestSpec, CommError> {
        let correlation_id = match correlation_id {
            Some(cid) => cid.to_string(),
            None => new_correlation_id(),
        };

        let (mut base_url, resolved_api_key, config_timeout) = match &options.url {
            Some(url) => (url.clone(), None, None),
            None => {
                let resolved = self
                    .resolver
                    .resolve(&correlation_id, key, options.resource.as_ref())
                    .await?;
                let config_timeout = self
                    .backends
                    .backend(key)
                    .await
                    .and_then(|c| c.timeout());
                (resolved.url, resolved.authentication.api_key, config_timeout)
            }
        };

        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let mut headers = BTreeMap::new();
        if let Some(api_key) = options.api_key.clone().or(resolved_api_key) {
            headers.insert(HEADER_API_KEY.to_string(), api_key);
        }
        headers.insert(HEADER_CORRELATION_ID.to_string(), correlation_id.clone());
        if let Some(token) = &options.token {
            headers.insert("authorization".to_string(), format!("Bearer {}", token));
        }
        headers.insert("content-type".to_string(), "application/json".to_string());

        // Caller-supplied headers win over the computed defaults.
        for (name, value) in &options.headers {
            headers.insert(name.to_lowercase(), value.clone());
        }

        Ok(RequestSpec {
            base_url,
            headers,
            timeout: options.timeout.or(config_timeout),
            correlation_id,
        })
    }
}

/// A per-call HTTP client bound to one backend.
///
/// Any status in the [200, 503] window comes back as a [`RawResponse`];
/// classification, including the 401 auth-invalidation side effect, happens
/// in the validator.
#[derive(Debug)]
pub struct RequestExecutor {
    client: reqwest::Client,
    spec: RequestSpec,
}

impl RequestExecutor {
    /// The correlation id every request from this executor carries.
    pub fn correlation_id(&self) -> &str {
        &self.spec.correlation_id
    }

    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    pub async fn get(&self, path: &str) -> Result<RawResponse, CommError> {
        self.execute(Method::GET, path, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<RawResponse, CommError> {
        self.execute(Method::POST, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<RawResponse, CommError> {
        self.execute(Method::DELETE, path, None).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<RawResponse, CommError> {
        let url = format!("{}{}", self.spec.base_url, path.trim_start_matches('/'));
        let cid = &self.spec.correlation_id;

        let mut request = self.client.request(method.clone(), &url);
        request = request.headers(self.header_map(cid)?);
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(correlation_id = %cid, %method, %url, "issuing request");

        let response = request.send().await.map_err(|e| {
            CommError::transport(COMPONENT, OP_EXECUTE, cid, format!("{} {}", method, url), Some(e))
        })?;

        let status = response.status();
        if !Self::status_in_window(status) {
            return Err(CommError::transport(
                COMPONENT,
                OP_EXECUTE,
                cid,
                format!("status {} outside accepted window", status.as_u16()),
                None,
            ));
        }

        let text = response.text().await.map_err(|e| {
            CommError::transport(COMPONENT, OP_EXECUTE, cid, "failed to read body", Some(e))
        })?;
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }

    fn status_in_window(status: StatusCode) -> bool {
        (STATUS_WINDOW_MIN..=STATUS_WINDOW_MAX).contains(&status.as_u16())
    }

    fn header_map(&self, correlation_id: &str) -> Result<HeaderMap, CommError> {
        let mut map = HeaderMap::with_capacity(self.spec.headers.len());
        for (name, value) in &self.spec.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                CommError::transport(
                    COMPONENT,
                    OP_EXECUTE,
                    correlation_id,
                    format!("invalid header name '{}': {}", name, e),
                    None,
                )
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                CommError::transport(
                    COMPONENT,
                    OP_EXECUTE,
                    correlation_id,
                    format!("invalid header value for '{}': {}", name, e),
                    None,
                )
            })?;
            map.insert(name, value);
        }
        Ok(map)
    }
}
