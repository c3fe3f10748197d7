//! Resource hooks binding views to remote collections.
//!
//! Hooks depend only on domain ports, never on a concrete transport.

mod appointments;
mod collection;
mod dashboard;
mod debounce;
mod resource;
mod state;

pub use appointments::AppointmentsHook;
pub use collection::{CollectionHook, DoctorsHook, PatientsHook, StaffHook};
pub use dashboard::{DashboardHook, DashboardInsights, DashboardSnapshot};
pub use debounce::{DEFAULT_WINDOW, Debouncer};
pub use resource::{FetchOutcome, Resource};
pub use state::{HookState, HookStatus};
