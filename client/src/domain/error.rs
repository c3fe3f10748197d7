//! Failure taxonomy shared by every remote operation.
//!
//! `Display` for validation, HTTP and auth failures is the bare message so
//! callers can show `error.to_string()` to a user directly.

use super::ports::define_port_error;

/// HTTP status that marks a rejected or expired credential.
pub const UNAUTHORIZED: u16 = 401;

define_port_error! {
    /// Error returned by API ports and surfaced by session and hooks.
    pub enum ApiError {
        /// Input was rejected locally before any request was issued.
        Validation { message: String } => "{message}",
        /// No response was received (DNS, connect, timeout).
        Network { message: String } => "network error: {message}",
        /// The server answered with a failure status.
        Http { status: u16, message: String } => "{message}",
        /// The server rejected the credential.
        Auth { status: u16, message: String } => "{message}",
        /// A success response did not have the expected shape.
        Decode { message: String } => "unexpected response payload: {message}",
    }
}

/// Coarse category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// See [`ApiError::Validation`].
    Validation,
    /// See [`ApiError::Network`].
    Network,
    /// See [`ApiError::Http`].
    Http,
    /// See [`ApiError::Auth`].
    Auth,
    /// See [`ApiError::Decode`].
    Decode,
}

impl ApiError {
    /// Classify a failure status, routing credential rejections to `Auth`.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        if status == UNAUTHORIZED {
            Self::auth(status, message)
        } else {
            Self::http(status, message)
        }
    }

    /// Category without the payload.
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            Self::Validation { .. } => ApiErrorKind::Validation,
            Self::Network { .. } => ApiErrorKind::Network,
            Self::Http { .. } => ApiErrorKind::Http,
            Self::Auth { .. } => ApiErrorKind::Auth,
            Self::Decode { .. } => ApiErrorKind::Decode,
        }
    }

    /// Whether the server rejected the credential.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Response status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Auth { status, .. } => Some(*status),
            _ => None,
        }
    }
}
