//! Wire payloads for the hospital API.
//!
//! Collections and single records arrive wrapped in a `data` envelope,
//! authentication responses carry the token next to the user, and failures
//! carry a `message` (older handlers use `error`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    LoginCredentials, RegistrationProfile, Role, SessionUser, ports::AuthGrant,
};

#[derive(Debug, Deserialize)]
pub(super) struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthResponseDto {
    #[serde(default)]
    token: Option<String>,
    user: SessionUser,
}

impl From<AuthResponseDto> for AuthGrant {
    fn from(value: AuthResponseDto) -> Self {
        Self {
            token: value.token,
            user: value.user,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CurrentUserDto {
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub(super) struct LoginRequestDto<'a> {
    email: &'a str,
    password: &'a str,
}

impl<'a> From<&'a LoginCredentials> for LoginRequestDto<'a> {
    fn from(value: &'a LoginCredentials) -> Self {
        Self {
            email: value.email(),
            password: value.password(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RegisterRequestDto<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    role: Role,
    hospital_id: &'a str,
}

impl<'a> From<&'a RegistrationProfile> for RegisterRequestDto<'a> {
    fn from(value: &'a RegistrationProfile) -> Self {
        Self {
            name: value.name(),
            email: value.email(),
            password: value.password(),
            role: value.role(),
            hospital_id: value.hospital_id(),
        }
    }
}

/// Body sent with requests that carry no payload but must be JSON.
#[derive(Debug, Serialize)]
pub(super) struct EmptyBody {}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBodyDto {
    /// First non-blank human-readable message in the body.
    pub fn into_message(self) -> Option<String> {
        self.message
            .into_iter()
            .chain(self.error)
            .find(|message| !message.trim().is_empty())
    }
}

/// Department entries are plain names or objects carrying a `name`.
pub(super) fn department_name(entry: Value) -> Option<String> {
    match entry {
        Value::String(name) => Some(name),
        Value::Object(mut fields) => match fields.remove("name") {
            Some(Value::String(name)) => Some(name),
            _ => None,
        },
        _ => None,
    }
}

/// Chart endpoints may or may not wrap their payload in `data`.
pub(super) fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut fields) if fields.contains_key("data") => {
            fields.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(r#"{"message":"Patient not found"}"#, Some("Patient not found"))]
    #[case(r#"{"error":"Forbidden"}"#, Some("Forbidden"))]
    #[case(r#"{"message":"  ","error":"Fallback"}"#, Some("Fallback"))]
    #[case(r#"{"detail":"nope"}"#, None)]
    fn error_messages_prefer_message_then_error(#[case] body: &str, #[case] expected: Option<&str>) {
        let dto: ErrorBodyDto = serde_json::from_str(body).expect("error body");
        assert_eq!(dto.into_message().as_deref(), expected);
    }

    #[test]
    fn registration_payload_uses_camel_case() {
        let profile =
            RegistrationProfile::try_from_parts("Ann", "ann@x.com", "pw", "hospitalOwner", None)
                .expect("profile");
        let payload = serde_json::to_value(RegisterRequestDto::from(&profile)).expect("payload");
        assert_eq!(
            payload,
            json!({
                "name": "Ann",
                "email": "ann@x.com",
                "password": "pw",
                "role": "hospitalOwner",
                "hospitalId": "hospital_demo",
            })
        );
    }

    #[rstest]
    #[case(json!("Cardiology"), Some("Cardiology"))]
    #[case(json!({"name": "Radiology", "head": "d1"}), Some("Radiology"))]
    #[case(json!({"id": 3}), None)]
    #[case(json!(4), None)]
    fn department_entries(#[case] entry: Value, #[case] expected: Option<&str>) {
        assert_eq!(department_name(entry).as_deref(), expected);
    }

    #[rstest]
    #[case(json!({"data": [1, 2]}), json!([1, 2]))]
    #[case(json!([1, 2]), json!([1, 2]))]
    #[case(json!({"labels": []}), json!({"labels": []}))]
    fn chart_payload_envelopes_are_optional(#[case] raw: Value, #[case] expected: Value) {
        assert_eq!(unwrap_data(raw), expected);
    }
}
