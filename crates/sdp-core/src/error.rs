//! Error types for SDP parsing.

use thiserror::Error;

/// Result type alias for SDP operations.
pub type Result<T> = std::result::Result<T, SdpError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SdpError {
    /// A line that is not of the form `<type>=<value>` or whose value does
    /// not follow the grammar of its type.
    #[error("SDP parse error at line {line}: {reason}")]
    ParseError { line: usize, reason: String },

    /// An attribute value that does not follow its grammar.
    #[error("invalid a={name} value {value:?}")]
    InvalidAttribute { name: String, value: String },

    /// A mandatory session line is absent.
    #[error("missing mandatory {0}= line")]
    MissingLine(char),
}

impl SdpError {
    pub fn invalid_attribute(name: &str, value: &str) -> Self {
        SdpError::InvalidAttribute {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}
