//! Identity of the authenticated user as reported by the hospital API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{RecordId, Role};

/// User attached to an authenticated session.
///
/// `role` is `None` when the server omitted it or sent a spelling outside the
/// known set; such a user holds no permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(
        flatten,
        with = "crate::domain::records::record_key::optional",
        skip_serializing_if = "Option::is_none"
    )]
    id: Option<RecordId>,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_role",
        skip_serializing_if = "Option::is_none"
    )]
    role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hospital_id: Option<String>,
}

fn lenient_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(Role::parse))
}

impl SessionUser {
    /// Build a user from its display name and role.
    pub fn new(name: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: None,
            role,
            hospital_id: None,
        }
    }

    /// Attach the server identifier.
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Attach the login email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach the hospital tenant.
    pub fn with_hospital_id(mut self, hospital_id: impl Into<String>) -> Self {
        self.hospital_id = Some(hospital_id.into());
        self
    }

    /// Server identifier, when the payload carried one.
    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    /// Display name; empty when the server omitted it.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Login email.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Access role, or `None` for a user without permissions.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Hospital tenant.
    pub fn hospital_id(&self) -> Option<&str> {
        self.hospital_id.as_deref()
    }
}
