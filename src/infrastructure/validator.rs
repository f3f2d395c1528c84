//! Response Validator
//!
//! Classifies a raw HTTP response into a success payload or one of the fixed
//! error kinds. The transport hands over anything in the [200, 503] window;
//! this is where success and failure are decided.

use crate::domain::ports::TokenManager;
use crate::error::CommError;
use crate::infrastructure::executor::RawResponse;
use std::sync::Arc;

const COMPONENT: &str = "ResponseValidator";
const OP_VALIDATE: &str = "validate";

/// Classifies raw responses.
///
/// When a token manager is configured, a 401 triggers one
/// invalidate-and-refresh call before the error is returned. The side effect
/// never suppresses the error.
pub struct ResponseValidator {
    token_manager: Option<Arc<dyn TokenManager>>,
}

impl ResponseValidator {
    pub fn new(token_manager: Option<Arc<dyn TokenManager>>) -> Self {
        Self { token_manager }
    }

    /// Classify a raw response.
    ///
    /// * 200 → success payload (the body).
    /// * 401 → token invalidation side effect, then `Auth`.
    /// * 404 → `NotFound`.
    /// * anything else → `Validation`.
    pub async fn validate(
        &self,
        correlation_id: &str,
        response: RawResponse,
    ) -> Result<serde_json::Value, CommError> {
        match response.status {
            200 => Ok(response.body),
            401 => {
                if let Some(tokens) = &self.token_manager {
                    tracing::warn!(correlation_id, "401 response, invalidating auth token");
                    tokens.invalidate(None, true).await;
                }
                Err(CommError::auth(COMPONENT, OP_VALIDATE, correlation_id))
            }
            404 => Err(CommError::not_found(COMPONENT, OP_VALIDATE, correlation_id)),
            status => {
                tracing::debug!(correlation_id, status, "response failed validation");
                Err(CommError::validation(
                    COMPONENT,
                    OP_VALIDATE,
                    correlation_id,
                    status,
                ))
            }
        }
    }
}
