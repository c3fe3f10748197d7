//! Driven port for read-only directory lookups used by forms and pickers.

use async_trait::async_trait;

use crate::domain::{ApiError, Doctor, Patient};

/// Remote directory lookups.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// Patients most recently added to the hospital.
    async fn recently_added_patients(&self) -> Result<Vec<Patient>, ApiError>;

    /// Doctors currently accepting appointments.
    async fn available_doctors(&self) -> Result<Vec<Doctor>, ApiError>;

    /// Department names staff can be assigned to.
    async fn staff_departments(&self) -> Result<Vec<String>, ApiError>;
}
