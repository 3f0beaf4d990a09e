use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The two remote services a setup run talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Storage service (cluster health, indices, users).
    Elasticsearch,
    /// Dashboard service (status, roles, spaces, dashboards).
    Kibana,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elasticsearch => f.write_str("Elasticsearch"),
            Self::Kibana => f.write_str("Kibana"),
        }
    }
}

/// A request never produced a response (connection refused, DNS, timeout, ...).
#[derive(Debug, Clone, Error)]
#[error("failed to send {service} request to '{path}': {message}")]
pub struct TransportError {
    pub service: Service,
    pub path: String,
    pub message: String,
}

impl TransportError {
    pub fn new(service: Service, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            service,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A response body could not be read to completion.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct BodyError(pub String);

/// Errors produced by the setup library.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Network or connection failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The service answered with something other than 200 or 204.
    #[error("response code was {status} - response body: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The service answered with an error status and the body could not be read.
    #[error("got {status} response code and couldn't read response body: {source}")]
    UnreadableBody {
        status: u16,
        #[source]
        source: BodyError,
    },

    /// The response did not have the expected shape.
    #[error("failed to decode {service} response: {message}")]
    Decode { service: Service, message: String },

    /// A bounded health gate ran out of attempts.
    #[error("{service} was not ready after {attempts} attempts")]
    NotReady { service: Service, attempts: u32 },

    /// A payload file could not be read.
    #[error("failed to read payload '{}': {source}", path.display())]
    Payload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration or provisioning plan.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SetupError {
    /// Returns the HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } | Self::UnreadableBody { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_names_service_and_path() {
        let err = TransportError::new(Service::Kibana, "/api/status", "connection refused");
        assert_eq!(
            err.to_string(),
            "failed to send Kibana request to '/api/status': connection refused"
        );
    }

    #[test]
    fn test_unexpected_status_message_contains_code_and_body() {
        let err = SetupError::UnexpectedStatus {
            status: 409,
            body: r#"{"error":"conflict"}"#.into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("409"));
        assert!(msg.contains(r#"{"error":"conflict"}"#));
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_status_absent_for_transport_error() {
        let err: SetupError =
            TransportError::new(Service::Elasticsearch, "/", "refused").into();
        assert_eq!(err.status(), None);
    }
}
