//! Domain entities.

use crate::domain::value_objects::ServiceLocation;
use serde::{Deserialize, Serialize};

/// Authentication material attached to a resolved resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAuth {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// A backend's materialized network location.
///
/// Built once per backend key and treated as immutable afterwards. Cached
/// entries have no TTL and are never re-resolved while the process runs; if a
/// discovered endpoint moves, the process keeps the stale entry (known
/// limitation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedResource {
    /// Final base url, e.g. "https://api.example.com:8443/api".
    pub url: String,
    pub secure: bool,
    /// Host portion the url was built from.
    pub address: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub authentication: ResourceAuth,
}

impl ResolvedResource {
    /// Build from a statically configured base url.
    pub fn from_static(base_url: &str, api_key: Option<String>) -> Self {
        let secure = base_url.starts_with("https://");
        let address = base_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .split(['/', ':'])
            .next()
            .unwrap_or(base_url)
            .to_string();
        Self {
            url: base_url.to_string(),
            secure,
            address,
            port: None,
            authentication: ResourceAuth { api_key },
        }
    }

    /// Build from a discovered (or caller-overridden) location.
    ///
    /// Returns `None` when the location carries neither an address nor a DNS
    /// descriptor.
    pub fn from_location(
        location: &ServiceLocation,
        root: Option<&str>,
        api_key: Option<String>,
    ) -> Option<Self> {
        let url = location.url(root)?;
        let address = location.host()?;
        Some(Self {
            url,
            secure: location.secure,
            address,
            port: location.port,
            authentication: ResourceAuth { api_key },
        })
    }
}
