//! Error types for capability validation and negotiation.

use thiserror::Error;

/// Result alias for validation functions.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result alias for negotiation functions.
pub type NegotiationResult<T> = Result<T, NegotiationError>;

/// Malformed capability or parameter input.
///
/// The `field` names the offending member using its wire name, e.g.
/// `codec.mimeType` or `headerExtension.preferredId`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing mandatory {field}")]
    MissingField { field: String },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wire name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } | Self::InvalidField { field, .. } => field,
        }
    }
}

/// A required codec could not be found in the negotiated set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    #[error("no codec matching {mime_type} in the negotiated set")]
    NoMatchingCodec { mime_type: String },

    #[error("empty codec list")]
    NoCodecs,

    #[error("no negotiated codec for kind {kind}")]
    UnsupportedKind { kind: String },

    #[error("profile-level-id negotiation failed: {0}")]
    ProfileLevelId(#[from] ProfileLevelIdError),
}

/// H.264 `profile-level-id` errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileLevelIdError {
    #[error("invalid profile-level-id {0:?}")]
    Invalid(String),

    #[error("profile-level-id profiles differ: {local} vs {remote}")]
    ProfileMismatch { local: String, remote: String },

    #[error("level 1b is not representable for profile {0}")]
    UnrepresentableLevel1b(String),
}
