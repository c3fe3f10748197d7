//! Driven port for dashboard aggregates.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{ApiError, Appointment, DashboardStats, Patient};

/// Remote dashboard queries.
///
/// The insight endpoints return chart data whose shape varies per hospital,
/// so they are exposed as untyped JSON.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn stats(&self) -> Result<DashboardStats, ApiError>;

    async fn recent_patients(&self) -> Result<Vec<Patient>, ApiError>;

    async fn today_appointments(&self) -> Result<Vec<Appointment>, ApiError>;

    async fn appointment_trends(&self) -> Result<Value, ApiError>;

    async fn department_stats(&self) -> Result<Value, ApiError>;

    async fn doctor_workload(&self) -> Result<Value, ApiError>;
}
