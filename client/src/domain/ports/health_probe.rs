//! Driven port for the unauthenticated service health check.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ApiError;

/// Liveness probe against the hospital API. Never sends a credential.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn health(&self) -> Result<Value, ApiError>;
}
