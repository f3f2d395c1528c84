//! backline Library
//!
//! Backend-communication layer: issue HTTP requests to named backend services
//! without hard-coding their network locations. Backends resolve from static
//! configuration or through a service-discovery provider, with resolutions
//! cached for the life of the process.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-export commonly used types
pub use application::CommService;
pub use config::{BackendConfig, DiscoverableConfig, StaticBackendProvider};
pub use domain::entities::{ResolvedResource, ResourceAuth};
pub use domain::ports::{BackendProvider, DiscoveryClient, TokenManager};
pub use domain::value_objects::{DiscoveryOutcome, DnsDescriptor, ServiceLocation};
pub use error::CommError;
pub use infrastructure::executor::{
    new_correlation_id, RawResponse, RequestExecutor, RequestExecutorFactory, RequestOptions,
    RequestSpec, HEADER_API_KEY, HEADER_CORRELATION_ID,
};
pub use infrastructure::resolver::ResourceResolver;
pub use infrastructure::validator::ResponseValidator;
