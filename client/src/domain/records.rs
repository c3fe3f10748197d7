//! Remote record types held in resource collections.
//!
//! The hospital API is loose about shapes: identifiers arrive as `id` or
//! `_id`, sometimes numeric, and records carry fields this client does not
//! model. Every record therefore keeps unmodelled fields in `extra` so an
//! update sends them back unchanged.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, DeserializeOwned},
};
use serde_json::{Map, Value};

/// Raised when an identifier is empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("record id must not be empty")]
pub struct EmptyRecordId;

/// Stable identifier of a remote record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct RecordId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecordId {
    Text(String),
    Number(i64),
}

impl RecordId {
    /// Validate and construct an identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyRecordId> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EmptyRecordId);
        }
        Ok(Self(id))
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = match RawRecordId::deserialize(deserializer)? {
            RawRecordId::Text(text) => text,
            RawRecordId::Number(number) => number.to_string(),
        };
        Self::new(id).map_err(de::Error::custom)
    }
}

impl TryFrom<&str> for RecordId {
    type Error = EmptyRecordId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identifier carried under `_id`, `id` or both.
///
/// Used as `#[serde(flatten, with = "...")]` so both keys are claimed before
/// the remaining fields reach a record's `extra` map. When both are present
/// `_id` wins. Serialisation always writes `id`.
pub(crate) mod record_key {
    use super::*;

    #[derive(Deserialize)]
    struct Keys {
        #[serde(rename = "_id")]
        document: Option<RecordId>,
        id: Option<RecordId>,
    }

    impl Keys {
        fn pick(self) -> Option<RecordId> {
            self.document.or(self.id)
        }
    }

    #[derive(Serialize)]
    struct Key<'a> {
        id: &'a RecordId,
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<RecordId, D::Error>
    where
        D: Deserializer<'de>,
    {
        Keys::deserialize(deserializer)?
            .pick()
            .ok_or_else(|| de::Error::missing_field("id"))
    }

    pub(crate) fn serialize<S>(id: &RecordId, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Key { id }.serialize(serializer)
    }

    /// Same keys for payloads where the identifier may be absent.
    pub(crate) mod optional {
        use super::*;

        #[derive(Serialize)]
        struct MaybeKey<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            id: Option<&'a RecordId>,
        }

        pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Ok(Keys::deserialize(deserializer)?.pick())
        }

        pub(crate) fn serialize<S>(id: &Option<RecordId>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            MaybeKey { id: id.as_ref() }.serialize(serializer)
        }
    }
}

/// Element of a resource collection.
pub trait Record: Clone + fmt::Debug + DeserializeOwned + Send + Sync + 'static {
    /// Payload sent to create or update a record.
    type Draft: Serialize + fmt::Debug + Send + Sync + 'static;

    /// Identifier used to reconcile mutations against the collection.
    fn id(&self) -> &RecordId;
}

/// Registered patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(flatten, with = "record_key")]
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, alias = "dob", skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, alias = "mrn", skip_serializing_if = "Option::is_none")]
    pub medical_record_number: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Patient {
    /// Name suitable for lists: `name`, else first and last name joined.
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return Some(name.to_owned());
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!joined.is_empty()).then_some(joined)
    }
}

/// Fields sent when creating or updating a patient.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Patient {
    type Draft = PatientDraft;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Doctor on the hospital roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(flatten, with = "record_key")]
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, alias = "specialty", skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields sent when creating or updating a doctor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Doctor {
    type Draft = DoctorDraft;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Member of hospital staff. `role` is the job title, not an access role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    #[serde(flatten, with = "record_key")]
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields sent when creating or updating a staff member.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for StaffMember {
    type Draft = StaffDraft;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Lifecycle state of an appointment.
///
/// Known states compare case-insensitively; anything else is preserved
/// verbatim in `Other` so it is written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    Other(String),
}

impl AppointmentStatus {
    /// Wire spelling.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Confirmed => "Confirmed",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for AppointmentStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "scheduled" => Self::Scheduled,
            "confirmed" => Self::Confirmed,
            "completed" => Self::Completed,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(value),
        }
    }
}

impl From<AppointmentStatus> for String {
    fn from(value: AppointmentStatus) -> Self {
        match value {
            AppointmentStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

/// Booked appointment. Participants may be ids or populated objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(flatten, with = "record_key")]
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Appointment {
    /// Whether the appointment has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status == Some(AppointmentStatus::Cancelled)
    }
}

/// Fields sent when booking or updating an appointment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Appointment {
    type Draft = AppointmentDraft;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Which appointments an appointment collection tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AppointmentScope {
    /// Every appointment visible to the caller.
    #[default]
    All,
    /// Appointments that have not yet happened.
    Upcoming,
    /// Appointments assigned to one doctor.
    Doctor(RecordId),
}

/// Headline counters shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_patients: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_doctors: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_staff: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today_appointments: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"id": "p9", "firstName": "Jane"}))]
    #[case(json!({"_id": "p9", "firstName": "Jane"}))]
    #[case(json!({"_id": "p9", "id": "p9", "firstName": "Jane"}))]
    #[case(json!({"_id": "p9", "id": "legacy-4", "firstName": "Jane"}))]
    fn patient_accepts_either_identifier_key(#[case] payload: Value) {
        let patient: Patient = serde_json::from_value(payload).expect("patient");
        assert_eq!(patient.id.as_str(), "p9");
        assert_eq!(patient.first_name.as_deref(), Some("Jane"));
        assert!(!patient.extra.contains_key("_id"));
        assert!(!patient.extra.contains_key("id"));
    }

    #[test]
    fn records_carrying_both_keys_decode_in_a_list() {
        let list: Vec<Appointment> = serde_json::from_value(json!([
            {"_id": "a1", "id": "a1", "status": "Scheduled"},
            {"id": 7},
        ]))
        .expect("appointments");
        let ids: Vec<_> = list.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a1", "7"]);

        let written = serde_json::to_value(&list[0]).expect("serialise");
        assert_eq!(written["id"], json!("a1"));
        assert!(written.get("_id").is_none());
    }

    #[test]
    fn numeric_identifiers_become_text() {
        let doctor: Doctor = serde_json::from_value(json!({"id": 42})).expect("doctor");
        assert_eq!(doctor.id.as_str(), "42");
    }

    #[rstest]
    #[case(json!({"id": ""}))]
    #[case(json!({"id": "   "}))]
    #[case(json!({"name": "no id"}))]
    fn records_without_usable_id_are_rejected(#[case] payload: Value) {
        assert!(serde_json::from_value::<StaffMember>(payload).is_err());
    }

    #[test]
    fn unmodelled_fields_survive_a_round_trip() {
        let payload = json!({
            "_id": "p1",
            "mrn": "MRN-001",
            "dob": "1990-01-01",
            "bloodGroup": "O+",
            "allergies": ["penicillin"],
        });
        let patient: Patient = serde_json::from_value(payload).expect("patient");
        assert_eq!(patient.medical_record_number.as_deref(), Some("MRN-001"));
        assert_eq!(patient.date_of_birth.as_deref(), Some("1990-01-01"));

        let written = serde_json::to_value(&patient).expect("serialise");
        assert_eq!(written["bloodGroup"], json!("O+"));
        assert_eq!(written["allergies"], json!(["penicillin"]));
        assert_eq!(written["id"], json!("p1"));
    }

    #[rstest]
    #[case("Cancelled", AppointmentStatus::Cancelled)]
    #[case("cancelled", AppointmentStatus::Cancelled)]
    #[case("canceled", AppointmentStatus::Cancelled)]
    #[case("SCHEDULED", AppointmentStatus::Scheduled)]
    #[case("No-show", AppointmentStatus::Other("No-show".to_owned()))]
    fn appointment_status_parsing(#[case] raw: &str, #[case] expected: AppointmentStatus) {
        assert_eq!(AppointmentStatus::from(raw.to_owned()), expected);
    }

    #[test]
    fn appointment_participants_may_be_populated() {
        let appointment: Appointment = serde_json::from_value(json!({
            "_id": "a1",
            "patient": {"_id": "p1", "name": "Ann"},
            "doctor": "d1",
            "status": "scheduled",
        }))
        .expect("appointment");
        assert_eq!(appointment.doctor, Some(json!("d1")));
        assert_eq!(appointment.status, Some(AppointmentStatus::Scheduled));
        assert!(!appointment.is_cancelled());
    }

    #[rstest]
    #[case(Some("Ann Lee"), None, None, Some("Ann Lee"))]
    #[case(None, Some("Jane"), Some("Doe"), Some("Jane Doe"))]
    #[case(Some(" "), Some("Jane"), None, Some("Jane"))]
    #[case(None, None, None, None)]
    fn patient_display_name(
        #[case] name: Option<&str>,
        #[case] first: Option<&str>,
        #[case] last: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let patient = Patient {
            id: RecordId::new("p1").expect("id"),
            name: name.map(str::to_owned),
            first_name: first.map(str::to_owned),
            last_name: last.map(str::to_owned),
            email: None,
            phone: None,
            date_of_birth: None,
            gender: None,
            medical_record_number: None,
            extra: Map::new(),
        };
        assert_eq!(patient.display_name().as_deref(), expected);
    }

    #[test]
    fn draft_omits_unset_fields() {
        let draft = PatientDraft {
            first_name: Some("Jane".to_owned()),
            ..PatientDraft::default()
        };
        assert_eq!(serde_json::to_value(&draft).expect("serialise"), json!({"firstName": "Jane"}));
    }
}
