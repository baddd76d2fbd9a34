//! Error types for collaborator calls

use thiserror::Error;

/// The backend service a collaborator call was addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Payments,
    Messaging,
    Audit,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Payments => write!(f, "payments service"),
            Self::Messaging => write!(f, "messaging service"),
            Self::Audit => write!(f, "audit service"),
        }
    }
}

/// Failures of the payments, messaging and audit services.
///
/// A payment lookup that finds nothing is not represented here; it is a
/// normal `PaymentLookup::NotFound` outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// The call did not complete within its timeout
    #[error("{service} did not respond in time")]
    Timeout { service: Service },

    /// Connection refused, DNS failure, reset, ...
    #[error("{service} unreachable: {message}")]
    Transport { service: Service, message: String },

    /// The service answered with a non-success status
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: Service,
        status: u16,
        body: String,
    },

    /// The service answered 2xx with a body we could not read
    #[error("{service} returned an unreadable response: {message}")]
    Decode { service: Service, message: String },
}

impl CollaboratorError {
    /// The service that failed
    pub fn service(&self) -> Service {
        match self {
            Self::Timeout { service }
            | Self::Transport { service, .. }
            | Self::Status { service, .. }
            | Self::Decode { service, .. } => *service,
        }
    }
}

/// Failures of the text-generation capability.
///
/// These are transport-level only. What the generated text says is never
/// an error at this layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("text generation timed out")]
    Timeout,

    #[error("text generation unreachable: {0}")]
    Transport(String),

    #[error("text generation returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("text generation response malformed: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display_names_service() {
        let err = CollaboratorError::Status {
            service: Service::Audit,
            status: 404,
            body: "Flat not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("audit service"));
        assert!(msg.contains("404"));
        assert!(msg.contains("Flat not found"));
        assert_eq!(err.service(), Service::Audit);
    }

    #[test]
    fn test_timeout_error_display() {
        let err = CollaboratorError::Timeout {
            service: Service::Messaging,
        };
        assert_eq!(err.to_string(), "messaging service did not respond in time");
    }
}
