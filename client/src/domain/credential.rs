//! Opaque bearer credential issued by the hospital API.
//!
//! A credential is either absent or a non-empty string that is not one of the
//! literal placeholder markers older clients wrote into storage when a value
//! was missing. Anything else is treated as absent.

use std::fmt;

use zeroize::Zeroizing;

/// Placeholder strings that are never accepted as credentials.
pub const PLACEHOLDER_MARKERS: [&str; 2] = ["undefined", "null"];

/// Reasons a raw string was rejected as a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// The raw value was the empty string.
    Empty,
    /// The raw value was a serialised placeholder such as `"null"`.
    Placeholder {
        /// The marker that matched.
        marker: &'static str,
    },
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "credential must not be empty"),
            Self::Placeholder { marker } => {
                write!(f, "credential must not be the placeholder {marker:?}")
            }
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Validated bearer credential.
///
/// The secret is zeroised on drop and redacted from `Debug` output so it
/// never reaches logs.
///
/// # Examples
/// ```
/// use hospital_client::domain::Credential;
///
/// let credential = Credential::parse("abc123").unwrap();
/// assert_eq!(credential.expose(), "abc123");
/// assert!(Credential::parse("undefined").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Zeroizing<String>);

impl Credential {
    /// Validate a raw string against the credential invariant.
    ///
    /// The value is stored verbatim; surrounding whitespace is significant to
    /// the server and is not trimmed.
    pub fn parse(raw: &str) -> Result<Self, CredentialValidationError> {
        if raw.is_empty() {
            return Err(CredentialValidationError::Empty);
        }
        if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|marker| **marker == raw) {
            return Err(CredentialValidationError::Placeholder { marker: *marker });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Raw secret for transport headers and storage.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
