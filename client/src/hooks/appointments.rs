//! Appointment collection hook.
//!
//! Follows the collection pattern except that cancelling keeps the record
//! and flips its status to cancelled.

use std::sync::Arc;

use tokio::sync::watch;

use super::{FetchOutcome, HookState, Resource};
use crate::domain::{
    ApiError, Appointment, AppointmentDraft, AppointmentScope, AppointmentStatus, Record,
    RecordId, ports::AppointmentBook,
};

/// Appointments in one [`AppointmentScope`], kept in sync with the server.
pub struct AppointmentsHook {
    book: Arc<dyn AppointmentBook>,
    resource: Resource<AppointmentScope, Vec<Appointment>>,
}

impl AppointmentsHook {
    /// Unmounted hook tracking `scope`.
    pub fn new(book: Arc<dyn AppointmentBook>, scope: AppointmentScope) -> Self {
        let source = Arc::clone(&book);
        let resource = Resource::new(scope, move |scope: AppointmentScope| {
            let source = Arc::clone(&source);
            async move {
                match scope {
                    AppointmentScope::All => source.list().await,
                    AppointmentScope::Upcoming => source.upcoming().await,
                    AppointmentScope::Doctor(doctor) => source.for_doctor(&doctor).await,
                }
            }
        });
        Self { book, resource }
    }

    /// Mount and fetch for the current scope.
    pub async fn mount(&self) -> FetchOutcome {
        self.resource.mount().await
    }

    /// Stop applying responses.
    pub fn unmount(&self) {
        self.resource.unmount();
    }

    /// Track a different set of appointments.
    pub async fn set_scope(&self, scope: AppointmentScope) -> FetchOutcome {
        self.resource.set_dependencies(scope).await
    }

    /// Fetch again for the current scope.
    pub async fn refetch(&self) -> FetchOutcome {
        self.resource.refetch().await
    }

    /// Book an appointment and append the server's copy.
    pub async fn create(&self, draft: &AppointmentDraft) -> Result<Appointment, ApiError> {
        let created = self.book.create(draft).await?;
        let record = created.clone();
        self.resource
            .reconcile(move |data| data.get_or_insert_with(Vec::new).push(record));
        Ok(created)
    }

    /// Update an appointment and replace the local entry.
    pub async fn update(
        &self,
        id: &RecordId,
        draft: &AppointmentDraft,
    ) -> Result<Appointment, ApiError> {
        let updated = self.book.update(id, draft).await?;
        let record = updated.clone();
        self.resource.reconcile(|data| {
            for entry in data.iter_mut().flatten().filter(|entry| entry.id() == id) {
                *entry = record.clone();
            }
        });
        Ok(updated)
    }

    /// Cancel an appointment; the entry stays with a cancelled status.
    pub async fn cancel(&self, id: &RecordId) -> Result<(), ApiError> {
        self.book.cancel(id).await?;
        self.resource.reconcile(|data| {
            for entry in data.iter_mut().flatten().filter(|entry| entry.id() == id) {
                entry.status = Some(AppointmentStatus::Cancelled);
            }
        });
        Ok(())
    }

    /// Current appointments; empty until the first successful fetch.
    pub fn appointments(&self) -> Vec<Appointment> {
        self.resource.state().data.unwrap_or_default()
    }

    /// Snapshot of the hook state.
    pub fn state(&self) -> HookState<Vec<Appointment>> {
        self.resource.state()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<HookState<Vec<Appointment>>> {
        self.resource.subscribe()
    }
}
