//! Searchable record collection with confirmed mutations.
//!
//! Query changes are debounced; an empty query lists the collection and any
//! other query searches it. Mutations call the server first and touch local
//! state only once the server has confirmed them.

use std::sync::Arc;

use tokio::sync::watch;

use super::{Debouncer, FetchOutcome, HookState, HookStatus, Resource};
use crate::domain::{
    ApiError, Doctor, Patient, Record, RecordId, StaffMember, ports::RecordCollection,
};

/// Patients page hook.
pub type PatientsHook = CollectionHook<Patient>;
/// Doctors page hook.
pub type DoctorsHook = CollectionHook<Doctor>;
/// Staff page hook.
pub type StaffHook = CollectionHook<StaffMember>;

/// Searchable collection of records kept in sync with the server.
///
/// An empty or whitespace-only query lists everything; anything else is sent
/// to the search endpoint after the debounce window.
pub struct CollectionHook<R: Record> {
    api: Arc<dyn RecordCollection<R>>,
    resource: Resource<String, Vec<R>>,
    debouncer: Debouncer,
}

impl<R: Record> CollectionHook<R> {
    /// Unmounted hook over the full listing.
    pub fn new(api: Arc<dyn RecordCollection<R>>, debouncer: Debouncer) -> Self {
        Self::with_query(api, debouncer, String::new())
    }

    /// Start from `query` instead of the full listing.
    pub fn with_query(
        api: Arc<dyn RecordCollection<R>>,
        debouncer: Debouncer,
        query: impl Into<String>,
    ) -> Self {
        let source = Arc::clone(&api);
        let resource = Resource::new(query.into(), move |query: String| {
            let source = Arc::clone(&source);
            async move {
                let query = query.trim();
                if query.is_empty() {
                    source.list().await
                } else {
                    source.search(query).await
                }
            }
        });
        Self {
            api,
            resource,
            debouncer,
        }
    }

    /// Mount and fetch after the debounce window.
    pub async fn mount(&self) -> FetchOutcome {
        self.resource.mark_mounted();
        self.debounced_refetch().await
    }

    /// Stop applying responses.
    pub fn unmount(&self) {
        self.resource.unmount();
    }

    /// Change the search text. Only the last change in a burst fetches.
    pub async fn set_query(&self, query: impl Into<String>) -> FetchOutcome {
        let changed = self.resource.replace_dependencies(query.into());
        if !changed && self.resource.state().status() != HookStatus::Idle {
            return FetchOutcome::Unchanged;
        }
        self.debounced_refetch().await
    }

    /// Current search text.
    pub fn query(&self) -> String {
        self.resource.dependencies()
    }

    /// Fetch again immediately for the current query.
    pub async fn refetch(&self) -> FetchOutcome {
        self.resource.refetch().await
    }

    async fn debounced_refetch(&self) -> FetchOutcome {
        if !self.debouncer.settle().await {
            return FetchOutcome::Debounced;
        }
        self.resource.refetch().await
    }

    /// Create a record and append the server's copy.
    pub async fn create(&self, draft: &R::Draft) -> Result<R, ApiError> {
        let created = self.api.create(draft).await?;
        let record = created.clone();
        self.resource
            .reconcile(move |data| data.get_or_insert_with(Vec::new).push(record));
        Ok(created)
    }

    /// Update a record and replace the local entry with the server's copy.
    pub async fn update(&self, id: &RecordId, draft: &R::Draft) -> Result<R, ApiError> {
        let updated = self.api.update(id, draft).await?;
        let record = updated.clone();
        self.resource.reconcile(|data| {
            for entry in data.iter_mut().flatten().filter(|entry| entry.id() == id) {
                *entry = record.clone();
            }
        });
        Ok(updated)
    }

    /// Delete a record and drop the local entry.
    pub async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        self.api.delete(id).await?;
        self.resource.reconcile(|data| {
            if let Some(records) = data {
                records.retain(|entry| entry.id() != id);
            }
        });
        Ok(())
    }

    /// Current records; empty until the first successful fetch.
    pub fn records(&self) -> Vec<R> {
        self.resource.state().data.unwrap_or_default()
    }

    /// Snapshot of the hook state.
    pub fn state(&self) -> HookState<Vec<R>> {
        self.resource.state()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<HookState<Vec<R>>> {
        self.resource.subscribe()
    }
}
