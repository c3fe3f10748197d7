//! Login and registration payloads.
//!
//! Inputs are validated here, before a request is issued, so that a missing
//! field is reported as a local validation failure rather than a server error.

use std::fmt;

use zeroize::Zeroizing;

use super::{ApiError, Role};

/// Tenant assigned when a registration does not name one.
pub const DEFAULT_HOSPITAL_ID: &str = "hospital_demo";

/// Domain error returned when login or registration inputs are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
    /// Display name was missing or blank once trimmed.
    EmptyName,
    /// Role string was not one of the known roles.
    UnknownRole(String),
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::UnknownRole(raw) => write!(f, "unknown role: {raw:?}"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

impl From<AuthValidationError> for ApiError {
    fn from(value: AuthValidationError) -> Self {
        Self::validation(value.to_string())
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use hospital_client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" doc@x.com ", "pw").unwrap();
/// assert_eq!(creds.email(), "doc@x.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Trimmed login email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password exactly as entered.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated self-registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationProfile {
    name: String,
    credentials: LoginCredentials,
    role: Role,
    hospital_id: String,
}

impl RegistrationProfile {
    /// Validate raw registration inputs.
    ///
    /// A blank `hospital_id` falls back to [`DEFAULT_HOSPITAL_ID`].
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        role: &str,
        hospital_id: Option<&str>,
    ) -> Result<Self, AuthValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthValidationError::EmptyName);
        }
        let credentials = LoginCredentials::try_from_parts(email, password)?;
        let role =
            Role::parse(role.trim()).ok_or_else(|| AuthValidationError::UnknownRole(role.to_owned()))?;
        let hospital_id = hospital_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_HOSPITAL_ID)
            .to_owned();
        Ok(Self {
            name: name.to_owned(),
            credentials,
            role,
            hospital_id,
        })
    }

    /// Trimmed display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Trimmed login email.
    pub fn email(&self) -> &str {
        self.credentials.email()
    }

    /// Password exactly as entered.
    pub fn password(&self) -> &str {
        self.credentials.password()
    }

    /// Requested role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Hospital tenant, defaulted when blank.
    pub fn hospital_id(&self) -> &str {
        self.hospital_id.as_str()
    }
}
