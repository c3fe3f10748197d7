//! Driven port for appointment scheduling.
//!
//! Unlike other collections, removing an appointment is a cancellation: the
//! server keeps the record and marks it cancelled.

use async_trait::async_trait;

use crate::domain::{ApiError, Appointment, AppointmentDraft, RecordId};

/// Remote appointment operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentBook: Send + Sync {
    async fn list(&self) -> Result<Vec<Appointment>, ApiError>;

    /// Appointments that have not happened yet.
    async fn upcoming(&self) -> Result<Vec<Appointment>, ApiError>;

    /// Appointments assigned to one doctor.
    async fn for_doctor(&self, doctor: &RecordId) -> Result<Vec<Appointment>, ApiError>;

    async fn create(&self, draft: &AppointmentDraft) -> Result<Appointment, ApiError>;

    async fn update(
        &self,
        id: &RecordId,
        draft: &AppointmentDraft,
    ) -> Result<Appointment, ApiError>;

    /// Cancel an appointment. The record stays in the book.
    async fn cancel(&self, id: &RecordId) -> Result<(), ApiError>;
}
