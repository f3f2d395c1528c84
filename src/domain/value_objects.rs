//! Value objects for service discovery results.
//!
//! These are immutable and identified by their value. Host and url
//! composition rules live here so the resolver stays a thin orchestration
//! layer.

use serde::{Deserialize, Serialize};

/// DNS descriptor returned by the discovery provider instead of a literal
/// address.
///
/// The host is composed by joining `label`, the optional `namespace`, and the
/// literal token `local` (when the flag is set) with `.`:
/// `{label:"svc", namespace:"ns", local:true}` becomes `svc.ns.local`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsDescriptor {
    pub label: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub local: bool,
}

impl DnsDescriptor {
    /// Compose the host name from the descriptor parts.
    pub fn host(&self) -> String {
        let mut parts = vec![self.label.clone()];
        if let Some(ns) = &self.namespace {
            parts.push(ns.clone());
        }
        if self.local {
            parts.push("local".to_string());
        }
        parts.join(".")
    }
}

/// Network location of a service, as reported by the discovery provider or
/// supplied by a caller as a one-off override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLocation {
    /// Literal address, e.g. "10.0.0.1" or "api.example.com".
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub secure: bool,
    /// DNS descriptor; takes precedence over `address` when present.
    #[serde(default)]
    pub dns: Option<DnsDescriptor>,
}

impl ServiceLocation {
    /// The host this location points at, or `None` when neither a DNS
    /// descriptor nor a literal address is present.
    pub fn host(&self) -> Option<String> {
        if let Some(dns) = &self.dns {
            return Some(dns.host());
        }
        self.address.clone()
    }

    /// Compose the final url: `http[s]://<host>[:<port>]` plus an optional
    /// root path.
    pub fn url(&self, root: Option<&str>) -> Option<String> {
        let host = self.host()?;
        let scheme = if self.secure { "https" } else { "http" };
        let mut url = match self.port {
            Some(port) => format!("{}://{}:{}", scheme, host, port),
            None => format!("{}://{}", scheme, host),
        };
        if let Some(root) = root {
            if !root.is_empty() {
                if !root.starts_with('/') {
                    url.push('/');
                }
                url.push_str(root);
            }
        }
        Some(url)
    }
}

/// Result of a discovery lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryOutcome {
    pub success: bool,
    #[serde(default)]
    pub results: Option<ServiceLocation>,
}

impl DiscoveryOutcome {
    /// Successful lookup carrying a location.
    pub fn found(location: ServiceLocation) -> Self {
        Self {
            success: true,
            results: Some(location),
        }
    }

    /// Failed lookup.
    pub fn failed() -> Self {
        Self {
            success: false,
            results: None,
        }
    }
}
