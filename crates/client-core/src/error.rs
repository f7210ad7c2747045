//! Error types for the client facade.
//!
//! Errors fall into the categories returned by [`ClientError::category`]:
//!
//! - **validation** - malformed capabilities or parameters from the server or caller
//! - **negotiation** - no usable codec where one was required
//! - **sdp** - a local description the SDP codec could not read
//! - **state** - an operation called out of order (produce before load, unknown mid).
//!   These are caller bugs and are never recoverable.
//! - **signaling** / **transport** - failures of the external boundaries, annotated
//!   with the method or operation. This crate does not retry; the boundary owns
//!   retry policy.
//!
//! ```rust
//! use ortc_client_core::ClientError;
//!
//! let err = ClientError::signaling("produce", "transport not found");
//! assert_eq!(err.category(), "signaling");
//! assert!(err.is_recoverable());
//!
//! let err = ClientError::invalid_state("produce", "device not loaded");
//! assert!(!err.is_recoverable());
//! ```

use ortc_core::{NegotiationError, ValidationError};
use ortc_sdp_core::SdpError;
use thiserror::Error;

/// Result type alias for client-core operations
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Negotiation failed: {0}")]
    Negotiation(#[from] NegotiationError),

    #[error("SDP error: {0}")]
    Sdp(#[from] SdpError),

    /// Operation invoked in a state that does not allow it.
    #[error("Invalid state for {operation}: {reason}")]
    InvalidState { operation: String, reason: String },

    #[error("Signaling request {method} failed: {reason}")]
    Signaling { method: String, reason: String },

    /// The server answered a request with `ok: false`.
    #[error("Signaling request {method} rejected: {code} {reason}")]
    SignalingRejected { method: String, code: u16, reason: String },

    #[error("Signaling request {method} timed out after {duration_ms}ms")]
    SignalingTimeout { method: String, duration_ms: u64 },

    #[error("Transport operation {operation} failed: {reason}")]
    Transport { operation: String, reason: String },

    #[error("{what} not found: {id}")]
    NotFound { what: String, id: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    #[error("Closed")]
    Closed,
}

impl ClientError {
    pub fn invalid_state(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidState { operation: operation.into(), reason: reason.into() }
    }

    pub fn signaling(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Signaling { method: method.into(), reason: reason.into() }
    }

    pub fn transport(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport { operation: operation.into(), reason: reason.into() }
    }

    pub fn not_found(what: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound { what: what.into(), id: id.into() }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClientError::Signaling { .. }
            | ClientError::SignalingTimeout { .. }
            | ClientError::Transport { .. } => true,

            ClientError::Validation(_)
            | ClientError::Negotiation(_)
            | ClientError::Sdp(_)
            | ClientError::InvalidState { .. }
            | ClientError::SignalingRejected { .. }
            | ClientError::Serialization { .. }
            | ClientError::Closed => false,

            _ => false,
        }
    }

    /// Error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "validation",
            ClientError::Negotiation(_) => "negotiation",
            ClientError::Sdp(_) => "sdp",
            ClientError::InvalidState { .. } | ClientError::NotFound { .. } | ClientError::Closed => "state",
            ClientError::Signaling { .. }
            | ClientError::SignalingRejected { .. }
            | ClientError::SignalingTimeout { .. }
            | ClientError::Serialization { .. } => "signaling",
            ClientError::Transport { .. } => "transport",
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization { reason: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_layer_conversions() {
        let err: ClientError = ValidationError::missing("codec.mimeType").into();
        assert_eq!(err.category(), "validation");
        assert!(!err.is_recoverable());

        let err: ClientError = NegotiationError::NoCodecs.into();
        assert_eq!(err.category(), "negotiation");

        let err: ClientError = SdpError::MissingLine('v').into();
        assert_eq!(err.category(), "sdp");
    }

    #[test]
    fn test_boundary_errors_are_recoverable() {
        assert!(ClientError::transport("create_offer", "closed").is_recoverable());
        assert!(ClientError::SignalingTimeout { method: "join".into(), duration_ms: 10 }.is_recoverable());
        assert!(!ClientError::SignalingRejected { method: "join".into(), code: 500, reason: "x".into() }
            .is_recoverable());
    }

    #[test]
    fn test_state_errors() {
        let err = ClientError::invalid_state("rtp_capabilities", "device not loaded");
        assert_eq!(err.category(), "state");
        assert_eq!(err.to_string(), "Invalid state for rtp_capabilities: device not loaded");
        assert!(!ClientError::Closed.is_recoverable());
    }

    #[test]
    fn test_json_errors_convert() {
        let parse: Result<u32, _> = serde_json::from_str("nope");
        let err: ClientError = parse.unwrap_err().into();
        assert!(matches!(err, ClientError::Serialization { .. }));
    }
}
