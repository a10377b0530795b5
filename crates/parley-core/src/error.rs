//! Shared error type across parley crates.

use thiserror::Error;

/// Stable error codes (used in logs and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Caller-supplied input rejected before any side effect.
    Validation,
    /// Connect / subscribe / unsubscribe / publish failed.
    Transport,
    /// Inbound bytes did not decode to a well-formed envelope or frame.
    MalformedEnvelope,
    /// Config file unreadable or unparseable.
    Config,
    /// Unsupported config or frame version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Validation => "VALIDATION",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::MalformedEnvelope => "MALFORMED_ENVELOPE",
            ErrorCode::Config => "CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ParleyError>;

/// Unified error type used by core and peer.
#[derive(Debug, Error)]
pub enum ParleyError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ParleyError::Validation(_) => ErrorCode::Validation,
            ParleyError::Transport(_) => ErrorCode::Transport,
            ParleyError::MalformedEnvelope(_) => ErrorCode::MalformedEnvelope,
            ParleyError::Config(_) => ErrorCode::Config,
            ParleyError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            ParleyError::Internal(_) => ErrorCode::Internal,
        }
    }
}
