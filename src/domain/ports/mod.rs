//! Outbound ports of the communication layer.

mod backend_provider;
mod discovery_client;
mod token_manager;

pub use backend_provider::BackendProvider;
pub use discovery_client::DiscoveryClient;
pub use token_manager::TokenManager;
