//! Shared rule for turning a response outcome into success or an error.

use crate::error::{SetupError, TransportError};
use crate::transport::Response;

pub const NOT_FOUND: u16 = 404;

/// Only these two codes count as success. `201`/`202` are rejected.
pub const fn is_accepted(status: u16) -> bool {
    matches!(status, 200 | 204)
}

/// Classifies the outcome of a single request.
///
/// A transport error is returned as-is without touching any body. A `200`
/// or `204` succeeds whatever the body holds. Anything else reads the body
/// and reports it with the status code. The body is dropped on every path.
///
/// # Errors
///
/// Returns [`SetupError::Transport`], [`SetupError::UnexpectedStatus`] or
/// [`SetupError::UnreadableBody`].
pub async fn classify(outcome: Result<Response, TransportError>) -> Result<(), SetupError> {
    check(outcome?).await
}

/// [`classify`] for a response that is already known to have arrived.
pub async fn check(response: Response) -> Result<(), SetupError> {
    let status = response.status();
    if is_accepted(status) {
        return Ok(());
    }
    match response.text().await {
        Ok(body) => Err(SetupError::UnexpectedStatus { status, body }),
        Err(source) => Err(SetupError::UnreadableBody { status, source }),
    }
}
