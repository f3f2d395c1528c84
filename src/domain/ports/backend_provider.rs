//! Backend Provider Port
//!
//! Defines the interface for looking up backend configuration by key.
//! Implementations may read from a config file, environment, or a remote
//! config service.

use crate::config::BackendConfig;
use async_trait::async_trait;

/// Source of backend configuration.
///
/// The resolver calls this port to map a logical backend key to its static
/// description without knowing where configuration comes from.
#[async_trait]
pub trait BackendProvider: Send + Sync {
    /// Get the configuration for a backend key, if known.
    async fn backend(&self, key: &str) -> Option<BackendConfig>;
}
