//! Driven port for the single durable credential slot.
//!
//! The slot holds the raw string exactly as written. Validation against the
//! credential invariant happens one level up in [`crate::domain::TokenStore`]
//! so that backends stay dumb key-value storage.

use std::sync::{Mutex, PoisonError};

use super::define_port_error;

/// Fixed storage key under which the credential is persisted.
pub const CREDENTIAL_STORAGE_KEY: &str = "authToken";

define_port_error! {
    /// Errors raised by credential storage backends.
    pub enum CredentialBackendError {
        /// The underlying store could not be read or written.
        Io { message: String } => "credential storage failed: {message}",
        /// The stored bytes could not be interpreted as a string.
        Corrupt { message: String } => "stored credential is unreadable: {message}",
    }
}

/// Raw key-value access to the credential slot.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialBackend: Send + Sync {
    /// Read the raw stored value, if any.
    fn read(&self) -> Result<Option<String>, CredentialBackendError>;

    /// Replace the stored value.
    fn write(&self, value: &str) -> Result<(), CredentialBackendError>;

    /// Remove the stored value. Removing an absent value succeeds.
    fn remove(&self) -> Result<(), CredentialBackendError>;
}

/// Process-local backend used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialBackend {
    slot: Mutex<Option<String>>,
}

impl MemoryCredentialBackend {
    /// Start with a raw value already present, as if written by another client.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(value.into())),
        }
    }
}

impl CredentialBackend for MemoryCredentialBackend {
    fn read(&self) -> Result<Option<String>, CredentialBackendError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn write(&self, value: &str) -> Result<(), CredentialBackendError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.to_owned());
        Ok(())
    }

    fn remove(&self) -> Result<(), CredentialBackendError> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    #[test]
    fn memory_backend_round_trips_raw_values() {
        let backend = MemoryCredentialBackend::default();
        assert_eq!(backend.read(), Ok(None));

        backend.write("undefined").expect("write");
        assert_eq!(backend.read(), Ok(Some("undefined".to_owned())));

        backend.remove().expect("remove");
        backend.remove().expect("second remove is a no-op");
        assert_eq!(backend.read(), Ok(None));
    }
}
