//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod appointment_book;
mod auth_api;
mod credential_backend;
mod dashboard_api;
mod directory_api;
mod health_probe;
mod record_collection;

pub use appointment_book::AppointmentBook;
#[cfg(test)]
pub use appointment_book::MockAppointmentBook;
#[cfg(test)]
pub use auth_api::MockAuthApi;
pub use auth_api::{AuthApi, AuthGrant, FixtureAuthApi};
#[cfg(test)]
pub use credential_backend::MockCredentialBackend;
pub use credential_backend::{
    CREDENTIAL_STORAGE_KEY, CredentialBackend, CredentialBackendError, MemoryCredentialBackend,
};
pub use dashboard_api::DashboardApi;
#[cfg(test)]
pub use dashboard_api::MockDashboardApi;
pub use directory_api::DirectoryApi;
pub use health_probe::HealthProbe;
pub use record_collection::RecordCollection;
