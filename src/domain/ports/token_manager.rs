//! Auth Token Port
//!
//! Defines the interface to the token holder that owns bearer-token
//! lifecycle. The communication layer only ever asks it to invalidate and
//! refresh; it never reads or writes the token directly.

use async_trait::async_trait;

/// Holds and refreshes the bearer token for outbound calls.
#[async_trait]
pub trait TokenManager: Send + Sync {
    /// Invalidate the current token, optionally for a specific user, and
    /// refresh it when `force_refresh` is set.
    ///
    /// Called with `(None, true)` whenever a backend answers 401.
    async fn invalidate(&self, user: Option<&str>, force_refresh: bool);
}
