//! Session state machine and authorization queries.
//!
//! One [`SessionManager`] exists per running client. It starts in
//! [`Session::Unknown`], settles in `Anonymous` or `Authenticated` after the
//! startup probe, and afterwards only moves on login, registration, logout or
//! an explicit revalidation.
//!
//! Transitions are serialised: a login issued while a logout is in flight
//! waits for the logout to finish, so the final state always reflects the
//! last transition issued. Queries never wait.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use super::{
    ApiError, Credential, LoginCredentials, RegistrationProfile, Role, Section, SessionUser,
    TokenStore,
    ports::{AuthApi, AuthGrant},
};

/// The client's belief about who is signed in.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    /// Startup probe has not finished.
    #[default]
    Unknown,
    /// Nobody is signed in.
    Anonymous,
    /// A user is signed in.
    Authenticated(SessionUser),
}

/// Discriminant of [`Session`] without the user payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// See [`Session::Unknown`].
    Unknown,
    /// See [`Session::Anonymous`].
    Anonymous,
    /// See [`Session::Authenticated`].
    Authenticated,
}

impl Session {
    /// State without the user payload.
    pub fn status(&self) -> SessionStatus {
        match self {
            Self::Unknown => SessionStatus::Unknown,
            Self::Anonymous => SessionStatus::Anonymous,
            Self::Authenticated(_) => SessionStatus::Authenticated,
        }
    }

    /// Signed-in user, if any.
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Role of the signed-in user; `None` when anonymous or unrecognised.
    pub fn role(&self) -> Option<Role> {
        self.user().and_then(SessionUser::role)
    }
}

/// Owns the session and the transitions between its states.
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    tokens: TokenStore,
    session: watch::Sender<Session>,
    transitions: Mutex<()>,
}

impl SessionManager {
    /// Create a manager in the `Unknown` state without probing.
    pub fn new(api: Arc<dyn AuthApi>, tokens: TokenStore) -> Self {
        let (session, _) = watch::channel(Session::Unknown);
        Self {
            api,
            tokens,
            session,
            transitions: Mutex::new(()),
        }
    }

    /// Create a manager and run the startup probe.
    pub async fn start(api: Arc<dyn AuthApi>, tokens: TokenStore) -> Self {
        let manager = Self::new(api, tokens);
        manager.probe().await;
        manager
    }

    /// Resolve the stored credential into a session.
    ///
    /// Without a credential this settles in `Anonymous` with no network call.
    /// Any failure clears the credential and settles in `Anonymous` silently.
    pub async fn probe(&self) -> SessionStatus {
        let _transition = self.transitions.lock().await;
        let Some(credential) = self.tokens.get() else {
            debug!("no stored credential; session is anonymous");
            self.session.send_replace(Session::Anonymous);
            return SessionStatus::Anonymous;
        };

        match self.api.current_user(&credential).await {
            Ok(user) => {
                debug!(role = ?user.role(), "stored credential resolved");
                self.session.send_replace(Session::Authenticated(user));
                SessionStatus::Authenticated
            }
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "session probe failed; demoting to anonymous");
                self.tokens.clear();
                self.session.send_replace(Session::Anonymous);
                SessionStatus::Anonymous
            }
        }
    }

    /// Re-run the probe on demand, e.g. after a resource call reported an
    /// authentication failure.
    pub async fn revalidate(&self) -> SessionStatus {
        self.probe().await
    }

    /// Sign in with email and password.
    ///
    /// On failure the session is unchanged, except that `Unknown` settles in
    /// `Anonymous`. The error is returned for display.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ApiError> {
        let _transition = self.transitions.lock().await;
        let outcome = match LoginCredentials::try_from_parts(email, password) {
            Ok(credentials) => self.api.login(&credentials).await,
            Err(err) => Err(err.into()),
        };
        self.settle(outcome, "login")
    }

    /// Create an account and sign it in. Same contract as [`Self::login`].
    pub async fn register(&self, profile: &RegistrationProfile) -> Result<SessionUser, ApiError> {
        let _transition = self.transitions.lock().await;
        let outcome = self.api.register(profile).await;
        self.settle(outcome, "register")
    }

    /// Sign out.
    ///
    /// The credential is cleared and the session becomes `Anonymous` before
    /// the server is told; a failed remote logout is logged and ignored.
    pub async fn logout(&self) {
        let _transition = self.transitions.lock().await;
        let credential = self.tokens.get();
        self.tokens.clear();
        self.session.send_replace(Session::Anonymous);
        info!("signed out");

        let Some(credential) = credential else {
            return;
        };
        if let Err(err) = self.api.logout(&credential).await {
            warn!(error = %err, "remote logout failed; local session already cleared");
        }
    }

    fn settle(
        &self,
        outcome: Result<AuthGrant, ApiError>,
        operation: &'static str,
    ) -> Result<SessionUser, ApiError> {
        match outcome.and_then(accept_grant) {
            Ok((credential, user)) => {
                if !self.tokens.store(&credential) {
                    warn!(operation, "credential not persisted; session will not survive restart");
                }
                info!(operation, role = ?user.role(), "signed in");
                self.session.send_replace(Session::Authenticated(user.clone()));
                Ok(user)
            }
            Err(err) => {
                debug!(operation, error = %err, "authentication attempt failed");
                self.session.send_if_modified(|session| {
                    let was_unknown = matches!(session, Session::Unknown);
                    if was_unknown {
                        *session = Session::Anonymous;
                    }
                    was_unknown
                });
                Err(err)
            }
        }
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Current state without the user payload.
    pub fn status(&self) -> SessionStatus {
        self.session.borrow().status()
    }

    /// Copy of the signed-in user, if any.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.session.borrow().user().cloned()
    }

    /// Watch session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Whether the signed-in user holds one of `roles`.
    ///
    /// False unless authenticated with a recognised role that is listed.
    pub fn has_role(&self, roles: &[Role]) -> bool {
        self.session
            .borrow()
            .role()
            .is_some_and(|role| roles.contains(&role))
    }

    /// Authenticated in memory and a valid credential is still stored.
    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated && self.tokens.get().is_some()
    }

    /// Navigation for the signed-in user; empty otherwise.
    pub fn sections(&self) -> &'static [Section] {
        self.session
            .borrow()
            .role()
            .map(Role::sections)
            .unwrap_or_default()
    }

    /// Whether `section` is in the signed-in user's navigation.
    pub fn can_access(&self, section: Section) -> bool {
        self.sections().contains(&section)
    }

    /// Credential slot shared with API adapters.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }
}

fn accept_grant(grant: AuthGrant) -> Result<(Credential, SessionUser), ApiError> {
    let raw = grant
        .token
        .ok_or_else(|| ApiError::decode("response did not include a token"))?;
    let credential = Credential::parse(&raw)
        .map_err(|err| ApiError::decode(format!("response token rejected: {err}")))?;
    Ok((credential, grant.user))
}
