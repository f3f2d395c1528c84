use crate::domain::ports::BackendProvider;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Static description of a named backend.
///
/// Loaded once by the embedding application's configuration layer and treated
/// as immutable afterwards.
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Logical key identifying this backend.
    pub key: String,
    /// Base url used when the backend is not discoverable.
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key sent on every request to this backend.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Discovery settings; absent means the backend is statically addressed.
    #[serde(default)]
    pub discoverable: Option<DiscoverableConfig>,
}

/// Discovery settings for a backend whose location is found at runtime.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DiscoverableConfig {
    /// Whether discovery is active for this backend.
    #[serde(default)]
    pub enabled: bool,
    /// Name registered with the discovery provider.
    #[serde(default)]
    pub name: String,
    /// Path appended to the discovered url, e.g. "/api".
    #[serde(default)]
    pub root: Option<String>,
}

impl BackendConfig {
    /// Create a statically addressed backend.
    pub fn new(key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            base_url: Some(base_url.into()),
            api_key: None,
            timeout_ms: None,
            discoverable: None,
        }
    }

    /// Create a discoverable backend resolved through the discovery provider.
    pub fn discoverable(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            base_url: None,
            api_key: None,
            timeout_ms: None,
            discoverable: Some(DiscoverableConfig {
                enabled: true,
                name: name.into(),
                root: None,
            }),
        }
    }

    /// Attach an api key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Attach a request timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Attach a discovery root path.
    pub fn with_discovery_root(mut self, root: impl Into<String>) -> Self {
        if let Some(d) = self.discoverable.as_mut() {
            d.root = Some(root.into());
        }
        self
    }

    /// Whether this backend resolves through the discovery provider.
    pub fn is_discoverable(&self) -> bool {
        self.discoverable.as_ref().map(|d| d.enabled).unwrap_or(false)
    }

    /// Request timeout as a `Duration`, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// In-memory backend registry.
///
/// The simplest [`BackendProvider`]: a frozen map from key to config, built
/// up-front by the embedding application.
#[derive(Debug, Default)]
pub struct StaticBackendProvider {
    backends: HashMap<String, BackendConfig>,
}

impl StaticBackendProvider {
    pub fn new(backends: Vec<BackendConfig>) -> Self {
        Self {
            backends: backends.into_iter().map(|b| (b.key.clone(), b)).collect(),
        }
    }
}

#[async_trait::async_trait]
impl BackendProvider for StaticBackendProvider {
    async fn backend(&self, key: &str) -> Option<BackendConfig> {
        self.backends.get(key).cloned()
    }
}
