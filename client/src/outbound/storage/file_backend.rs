//! Credential slot persisted as a single file.
//!
//! The file is re-read on every access, so a credential cleared by another
//! process is noticed on the next read. Concurrent writers are not
//! coordinated; the last write wins.

use std::{fmt, io};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use super::atomic_write::write_atomic;
use crate::domain::ports::{CREDENTIAL_STORAGE_KEY, CredentialBackend, CredentialBackendError};

/// Credential stored as `<dir>/authToken`.
pub struct FileCredentialBackend {
    dir: Dir,
    path: Utf8PathBuf,
}

impl FileCredentialBackend {
    /// Open (creating if needed) the directory holding the credential.
    pub fn open(directory: &Utf8Path) -> Result<Self, CredentialBackendError> {
        std::fs::create_dir_all(directory).map_err(|err| io_error(directory, &err))?;
        let dir = Dir::open_ambient_dir(directory, ambient_authority())
            .map_err(|err| io_error(directory, &err))?;
        Ok(Self {
            dir,
            path: directory.join(CREDENTIAL_STORAGE_KEY),
        })
    }

    /// Location of the credential file.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

fn io_error(path: &Utf8Path, err: &io::Error) -> CredentialBackendError {
    CredentialBackendError::io(format!("{path}: {err}"))
}

impl CredentialBackend for FileCredentialBackend {
    fn read(&self) -> Result<Option<String>, CredentialBackendError> {
        match self.dir.read_to_string(CREDENTIAL_STORAGE_KEY) {
            Ok(raw) => Ok(Some(raw.trim_end_matches(&['\r', '\n'][..]).to_owned())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => Err(
                CredentialBackendError::corrupt(format!("{}: {err}", self.path)),
            ),
            Err(err) => Err(io_error(&self.path, &err)),
        }
    }

    fn write(&self, value: &str) -> Result<(), CredentialBackendError> {
        write_atomic(&self.dir, CREDENTIAL_STORAGE_KEY, value)
            .map_err(|err| io_error(&self.path, &err))?;
        debug!(path = %self.path, "credential persisted");
        Ok(())
    }

    fn remove(&self) -> Result<(), CredentialBackendError> {
        match self.dir.remove_file(CREDENTIAL_STORAGE_KEY) {
            Ok(()) => {
                debug!(path = %self.path, "credential removed");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&self.path, &err)),
        }
    }
}

impl fmt::Debug for FileCredentialBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCredentialBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
