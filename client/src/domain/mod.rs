//! Domain types, ports and the session service.
//!
//! Nothing in here performs I/O directly; transport and storage live behind
//! the traits in [`ports`].

pub mod auth;
pub mod credential;
pub mod error;
pub mod ports;
pub mod records;
pub mod role;
pub mod session;
pub mod token_store;
pub mod user;

pub use self::auth::{AuthValidationError, DEFAULT_HOSPITAL_ID, LoginCredentials, RegistrationProfile};
pub use self::credential::{Credential, CredentialValidationError};
pub use self::error::{ApiError, ApiErrorKind};
pub use self::records::{
    Appointment, AppointmentDraft, AppointmentScope, AppointmentStatus, DashboardStats, Doctor,
    DoctorDraft, EmptyRecordId, Patient, PatientDraft, Record, RecordId, StaffDraft, StaffMember,
};
pub use self::role::{Role, Section, UnknownRole};
pub use self::session::{Session, SessionManager, SessionStatus};
pub use self::token_store::TokenStore;
pub use self::user::SessionUser;
