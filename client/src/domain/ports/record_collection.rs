//! Driven port for a CRUD collection of remote records.

use async_trait::async_trait;

use crate::domain::{ApiError, Record, RecordId};

/// Remote collection of one record type.
#[async_trait]
pub trait RecordCollection<R: Record>: Send + Sync {
    /// Every record visible to the caller.
    async fn list(&self) -> Result<Vec<R>, ApiError>;

    /// Records matching a free-text query.
    async fn search(&self, query: &str) -> Result<Vec<R>, ApiError>;

    async fn get(&self, id: &RecordId) -> Result<R, ApiError>;

    /// Create a record and return it as stored by the server.
    async fn create(&self, draft: &R::Draft) -> Result<R, ApiError>;

    /// Update a record and return it as stored by the server.
    async fn update(&self, id: &RecordId, draft: &R::Draft) -> Result<R, ApiError>;

    async fn delete(&self, id: &RecordId) -> Result<(), ApiError>;
}
