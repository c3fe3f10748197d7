//! Validated access to the persisted bearer credential.
//!
//! `TokenStore` never propagates storage failures. A backend error while
//! reading is reported as an absent credential and a failed write is logged;
//! callers only ever see "have a credential" or "do not".

use std::{fmt, sync::Arc};

use tracing::warn;

use super::{
    Credential,
    ports::{CredentialBackend, MemoryCredentialBackend},
};

/// Credential slot shared by the session manager and the API client.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn CredentialBackend>,
}

impl TokenStore {
    /// Wrap a storage backend.
    pub fn new(backend: Arc<dyn CredentialBackend>) -> Self {
        Self { backend }
    }

    /// Store backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCredentialBackend::default()))
    }

    /// Current credential, if the stored raw value passes validation.
    pub fn get(&self) -> Option<Credential> {
        let raw = match self.backend.read() {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(error = %err, "credential storage unreadable; treating as absent");
                return None;
            }
        };
        Credential::parse(&raw).ok()
    }

    /// Persist a raw value if it is a valid credential.
    ///
    /// Invalid or absent input leaves the slot untouched and is reported as a
    /// diagnostic. Returns whether the value was written.
    pub fn set(&self, value: Option<&str>) -> bool {
        let Some(raw) = value else {
            warn!("refusing to store an absent credential");
            return false;
        };
        match Credential::parse(raw) {
            Ok(credential) => self.store(&credential),
            Err(err) => {
                warn!(reason = %err, "refusing to store invalid credential");
                false
            }
        }
    }

    /// Persist an already validated credential. Returns whether it was written.
    pub fn store(&self, credential: &Credential) -> bool {
        match self.backend.write(credential.expose()) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to persist credential");
                false
            }
        }
    }

    /// Remove any stored value. Safe to call repeatedly.
    pub fn clear(&self) {
        if let Err(err) = self.backend.remove() {
            warn!(error = %err, "failed to clear credential");
        }
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}
