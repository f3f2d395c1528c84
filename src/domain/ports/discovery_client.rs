//! Service Discovery Port
//!
//! Defines the interface for resolving a discovery name to a network
//! location. Implementations may use Consul, Kubernetes DNS, or a bespoke
//! registry.

use crate::domain::value_objects::DiscoveryOutcome;
use crate::error::CommError;
use async_trait::async_trait;

/// Resolves discovery names to service locations.
#[async_trait]
pub trait DiscoveryClient: Send + Sync {
    /// Look up a service by its registered discovery name.
    ///
    /// A lookup that completes but finds nothing returns
    /// `DiscoveryOutcome { success: false, .. }` rather than an error; errors
    /// are reserved for the provider itself being unreachable.
    async fn get_service(
        &self,
        correlation_id: &str,
        name: &str,
    ) -> Result<DiscoveryOutcome, CommError>;
}
