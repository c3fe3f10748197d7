//! Driven port for the remote authentication endpoints.
//!
//! Operations that act on an existing session take the credential explicitly
//! so the session manager decides which credential is presented, independent
//! of what the token store holds at the time of the call.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::{ApiError, Credential, LoginCredentials, RegistrationProfile, SessionUser};

/// Successful login or registration response.
///
/// `token` stays raw here; the session manager validates it before storing.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthGrant {
    pub token: Option<String>,
    pub user: SessionUser,
}

/// Remote authentication operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange email and password for a credential.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthGrant, ApiError>;

    /// Create an account and sign it in.
    async fn register(&self, profile: &RegistrationProfile) -> Result<AuthGrant, ApiError>;

    /// Invalidate a credential server-side.
    async fn logout(&self, credential: &Credential) -> Result<(), ApiError>;

    /// Resolve the user a credential belongs to.
    async fn current_user(&self, credential: &Credential) -> Result<SessionUser, ApiError>;
}

/// In-memory authenticator with scripted accounts.
///
/// Registered accounts receive sequential tokens. Tokens issued by login or
/// registration stay valid for `current_user` until logged out.
#[derive(Debug, Default)]
pub struct FixtureAuthApi {
    state: Mutex<FixtureAuthState>,
}

#[derive(Debug, Default)]
struct FixtureAuthState {
    accounts: Vec<FixtureAccount>,
    active: Vec<(String, SessionUser)>,
    fail_logout: bool,
    issued: usize,
    logout_calls: usize,
}

#[derive(Debug)]
struct FixtureAccount {
    email: String,
    password: String,
    token: String,
    user: SessionUser,
}

impl FixtureAuthApi {
    /// Accept `email`/`password` and answer with `token` and `user`.
    pub fn with_account(
        self,
        email: &str,
        password: &str,
        token: &str,
        user: SessionUser,
    ) -> Self {
        self.lock().accounts.push(FixtureAccount {
            email: email.to_owned(),
            password: password.to_owned(),
            token: token.to_owned(),
            user,
        });
        self
    }

    /// Treat `token` as an already signed-in session for `user`.
    pub fn with_active_session(self, token: &str, user: SessionUser) -> Self {
        self.lock().active.push((token.to_owned(), user));
        self
    }

    /// Make every remote logout fail with a server error.
    pub fn failing_logout(self) -> Self {
        self.lock().fail_logout = true;
        self
    }

    /// Number of remote logout calls received.
    pub fn logout_calls(&self) -> usize {
        self.lock().logout_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FixtureAuthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AuthApi for FixtureAuthApi {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthGrant, ApiError> {
        let mut state = self.lock();
        let account = state
            .accounts
            .iter()
            .find(|a| a.email == credentials.email() && a.password == credentials.password())
            .map(|a| (a.token.clone(), a.user.clone()));
        let Some((token, user)) = account else {
            return Err(ApiError::auth(401_u16, "Invalid credentials"));
        };
        state.active.push((token.clone(), user.clone()));
        Ok(AuthGrant {
            token: Some(token),
            user,
        })
    }

    async fn register(&self, profile: &RegistrationProfile) -> Result<AuthGrant, ApiError> {
        let mut state = self.lock();
        if state.accounts.iter().any(|a| a.email == profile.email()) {
            return Err(ApiError::http(400_u16, "User already exists"));
        }
        state.issued += 1;
        let token = format!("fixture-token-{}", state.issued);
        let user = SessionUser::new(profile.name(), Some(profile.role()))
            .with_email(profile.email())
            .with_hospital_id(profile.hospital_id());
        state.accounts.push(FixtureAccount {
            email: profile.email().to_owned(),
            password: profile.password().to_owned(),
            token: token.clone(),
            user: user.clone(),
        });
        state.active.push((token.clone(), user.clone()));
        Ok(AuthGrant {
            token: Some(token),
            user,
        })
    }

    async fn logout(&self, credential: &Credential) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.logout_calls += 1;
        if state.fail_logout {
            return Err(ApiError::http(503_u16, "Service unavailable"));
        }
        state.active.retain(|(token, _)| token != credential.expose());
        Ok(())
    }

    async fn current_user(&self, credential: &Credential) -> Result<SessionUser, ApiError> {
        self.lock()
            .active
            .iter()
            .find(|(token, _)| token == credential.expose())
            .map(|(_, user)| user.clone())
            .ok_or_else(|| ApiError::auth(401_u16, "Invalid token"))
    }
}
