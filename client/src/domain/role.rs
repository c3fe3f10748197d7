//! Closed set of user roles and the navigation each role is granted.
//!
//! Role strings arriving from the API are matched exactly. Anything outside
//! the four known spellings is "no role", which grants nothing.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// User category gating navigation and mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// A patient viewing their own records.
    Patient,
    /// A treating doctor.
    Doctor,
    /// The administrator owning a hospital tenant.
    HospitalOwner,
    /// Clinical or administrative staff.
    Staff,
}

/// Raised when a role string is not one of the known spellings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl Role {
    /// Every role, in display order.
    pub const ALL: [Self; 4] = [Self::Patient, Self::Doctor, Self::HospitalOwner, Self::Staff];

    /// Match the wire spelling exactly.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "patient" => Some(Self::Patient),
            "doctor" => Some(Self::Doctor),
            "hospitalOwner" => Some(Self::HospitalOwner),
            "staff" => Some(Self::Staff),
            _ => None,
        }
    }

    /// Wire spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::HospitalOwner => "hospitalOwner",
            Self::Staff => "staff",
        }
    }

    /// Ordered navigation sections this role may open.
    pub const fn sections(self) -> &'static [Section] {
        use Section::*;
        match self {
            Self::Patient => &[Dashboard, Reports, Prescriptions, Appointments, Settings],
            Self::Doctor => &[Dashboard, Patients, Appointments, Reports, Settings],
            Self::HospitalOwner => &[Dashboard, Doctors, Staff, Reports, Settings],
            Self::Staff => &[Dashboard, Patients, UploadReports, Reminders, Settings],
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigable area of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Dashboard,
    Patients,
    Doctors,
    Staff,
    Appointments,
    Reports,
    Prescriptions,
    UploadReports,
    Reminders,
    Settings,
}

impl Section {
    /// Route path of the section.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::Patients => "/patients",
            Self::Doctors => "/doctors",
            Self::Staff => "/staff",
            Self::Appointments => "/appointments",
            Self::Reports => "/reports",
            Self::Prescriptions => "/prescriptions",
            Self::UploadReports => "/upload-reports",
            Self::Reminders => "/reminders",
            Self::Settings => "/settings",
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Patients => "Patients",
            Self::Doctors => "Doctors",
            Self::Staff => "Staff",
            Self::Appointments => "Appointments",
            Self::Reports => "Reports",
            Self::Prescriptions => "Prescriptions",
            Self::UploadReports => "Upload Reports",
            Self::Reminders => "Reminders",
            Self::Settings => "Settings",
        }
    }
}
