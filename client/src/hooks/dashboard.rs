//! Dashboard aggregate hook.
//!
//! The three dashboard queries run concurrently and the aggregate succeeds
//! only if all three do. A single failure fails the whole snapshot; partial
//! results are never exposed.

use std::sync::Arc;

use futures_util::try_join;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use super::{FetchOutcome, HookState, Resource};
use crate::domain::{ApiError, Appointment, DashboardStats, Patient, ports::DashboardApi};

/// Everything the dashboard landing view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Headline counters.
    pub stats: DashboardStats,
    /// Most recently registered patients.
    pub recent_patients: Vec<Patient>,
    /// Appointments booked for today.
    pub today_appointments: Vec<Appointment>,
}

/// Chart data for the analytics panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardInsights {
    /// Appointment counts over time, as sent by the server.
    pub appointment_trends: Value,
    /// Per-department counters.
    pub department_stats: Value,
    /// Appointments per doctor.
    pub doctor_workload: Value,
}

/// Dashboard landing view, fetched as one all-or-nothing snapshot.
pub struct DashboardHook {
    api: Arc<dyn DashboardApi>,
    resource: Resource<(), DashboardSnapshot>,
}

impl DashboardHook {
    /// Unmounted dashboard hook.
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        let source = Arc::clone(&api);
        let resource = Resource::new((), move |()| {
            let source = Arc::clone(&source);
            async move {
                let (stats, recent_patients, today_appointments) = try_join!(
                    source.stats(),
                    source.recent_patients(),
                    source.today_appointments(),
                )?;
                Ok::<_, ApiError>(DashboardSnapshot {
                    stats,
                    recent_patients,
                    today_appointments,
                })
            }
        });
        Self { api, resource }
    }

    /// Mount and fetch the snapshot.
    pub async fn mount(&self) -> FetchOutcome {
        self.resource.mount().await
    }

    /// Stop applying responses.
    pub fn unmount(&self) {
        self.resource.unmount();
    }

    /// Fetch all three queries again.
    pub async fn refetch(&self) -> FetchOutcome {
        self.resource.refetch().await
    }

    /// Last complete snapshot, if any.
    pub fn snapshot(&self) -> Option<DashboardSnapshot> {
        self.resource.state().data
    }

    /// Snapshot of the hook state.
    pub fn state(&self) -> HookState<DashboardSnapshot> {
        self.resource.state()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<HookState<DashboardSnapshot>> {
        self.resource.subscribe()
    }

    /// Load the analytics panels, failing if any one of them fails.
    pub async fn insights(&self) -> Result<DashboardInsights, ApiError> {
        let (appointment_trends, department_stats, doctor_workload) = try_join!(
            self.api.appointment_trends(),
            self.api.department_stats(),
            self.api.doctor_workload(),
        )?;
        Ok(DashboardInsights {
            appointment_trends,
            department_stats,
            doctor_workload,
        })
    }
}
