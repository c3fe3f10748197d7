//! Session, authorization and resource-synchronisation core of the hospital
//! records client.
//!
//! The crate keeps a single bearer credential, derives the signed-in user and
//! their role-based permissions from it, and exposes resource hooks that keep
//! collections (patients, doctors, staff, appointments, dashboard figures) in
//! sync with the hospital REST API.
//!
//! ```
//! use hospital_client::domain::{Credential, LoginCredentials};
//!
//! assert!(Credential::parse("undefined").is_err());
//! let creds = LoginCredentials::try_from_parts(" dr@example.org ", "pw").unwrap();
//! assert_eq!(creds.email(), "dr@example.org");
//! ```

pub mod config;
pub mod domain;
pub mod hooks;
pub mod outbound;
