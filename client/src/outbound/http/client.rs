//! Reqwest-backed adapter for the hospital API.
//!
//! This adapter owns transport details only: URL building, bearer injection,
//! HTTP error mapping and JSON decoding. It performs no retries.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned, de::IgnoredAny};
use serde_json::Value;
use tracing::debug;

use super::{
    dto::{
        AuthResponseDto, CurrentUserDto, DataEnvelope, EmptyBody, ErrorBodyDto,
        LoginRequestDto, RegisterRequestDto, department_name, unwrap_data,
    },
    routes::{RestResource, SearchRoute},
};
use crate::{
    config::ApiEndpoints,
    domain::{
        ApiError, Appointment, AppointmentDraft, Credential, DashboardStats, Doctor,
        LoginCredentials, Patient, RecordId, RegistrationProfile, SessionUser, TokenStore,
        ports::{
            AppointmentBook, AuthApi, AuthGrant, DashboardApi, DirectoryApi, HealthProbe,
            RecordCollection,
        },
    },
};

/// Which credential, if any, a request presents.
#[derive(Clone, Copy)]
enum Bearer<'a> {
    /// Whatever the token store holds at send time.
    Stored,
    /// A specific credential, regardless of the store.
    Explicit(&'a Credential),
    /// No authorization header.
    Anonymous,
}

/// Hospital API adapter implementing every remote port.
#[derive(Debug, Clone)]
pub struct HospitalApiClient {
    http: Client,
    endpoints: ApiEndpoints,
    tokens: TokenStore,
}

impl HospitalApiClient {
    /// Build an adapter using a reqwest client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoints: ApiEndpoints, tokens: TokenStore) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(endpoints.timeout()).build()?;
        Ok(Self {
            http,
            endpoints,
            tokens,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        resolve(self.endpoints.base_url(), segments)
    }

    async fn fetch<R: DeserializeOwned>(&self, url: Url) -> Result<R, ApiError> {
        self.send::<EmptyBody, R>(Method::GET, url, None, Bearer::Stored)
            .await
    }

    async fn get_data<R: DeserializeOwned>(&self, segments: &[&str]) -> Result<R, ApiError> {
        let envelope: DataEnvelope<R> = self.fetch(self.endpoint(segments)?).await?;
        Ok(envelope.data)
    }

    async fn send_data<B, R>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        let envelope: DataEnvelope<R> = self.send(method, url, Some(body), Bearer::Stored).await?;
        Ok(envelope.data)
    }

    async fn delete_at(&self, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        self.send::<EmptyBody, IgnoredAny>(Method::DELETE, url, None, Bearer::Stored)
            .await
            .map(|_| ())
    }

    async fn send<B, R>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        bearer: Bearer<'_>,
    ) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let credential = match bearer {
            Bearer::Stored => self.tokens.get(),
            Bearer::Explicit(credential) => Some(credential.clone()),
            Bearer::Anonymous => None,
        };
        debug!(
            method = %method,
            path = url.path(),
            authenticated = credential.is_some(),
            "hospital API request"
        );

        let mut request = self.http.request(method, url);
        if let Some(credential) = &credential {
            request = request.bearer_auth(credential.expose());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        decode(bytes.as_ref())
    }
}

fn resolve(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::validation(format!("API base URL cannot take a path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn search_url(base: &Url, path: &str, route: SearchRoute, query: &str) -> Result<Url, ApiError> {
    let mut url = match route {
        SearchRoute::Dedicated => resolve(base, &[path, "search"])?,
        SearchRoute::Filter => resolve(base, &[path])?,
    };
    let key = match route {
        SearchRoute::Dedicated => "q",
        SearchRoute::Filter => "search",
    };
    url.query_pairs_mut().append_pair(key, query);
    Ok(url)
}

fn decode<R: DeserializeOwned>(body: &[u8]) -> Result<R, ApiError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|error| ApiError::decode(error.to_string()))
}

fn map_transport_error(error: reqwest::Error) -> ApiError {
    if error.is_builder() {
        ApiError::validation(format!("request could not be built: {error}"))
    } else if error.is_timeout() {
        ApiError::network(format!("request timed out: {error}"))
    } else {
        ApiError::network(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorBodyDto>(body)
        .ok()
        .and_then(ErrorBodyDto::into_message)
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
    ApiError::from_status(status.as_u16(), message)
}

#[async_trait]
impl AuthApi for HospitalApiClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthGrant, ApiError> {
        let url = self.endpoint(&["auth", "login"])?;
        let body = LoginRequestDto::from(credentials);
        let response: AuthResponseDto = self
            .send(Method::POST, url, Some(&body), Bearer::Stored)
            .await?;
        Ok(response.into())
    }

    async fn register(&self, profile: &RegistrationProfile) -> Result<AuthGrant, ApiError> {
        let url = self.endpoint(&["auth", "register"])?;
        let body = RegisterRequestDto::from(profile);
        let response: AuthResponseDto = self
            .send(Method::POST, url, Some(&body), Bearer::Stored)
            .await?;
        Ok(response.into())
    }

    async fn logout(&self, credential: &Credential) -> Result<(), ApiError> {
        let url = self.endpoint(&["auth", "logout"])?;
        self.send::<_, IgnoredAny>(
            Method::POST,
            url,
            Some(&EmptyBody {}),
            Bearer::Explicit(credential),
        )
        .await
        .map(|_| ())
    }

    async fn current_user(&self, credential: &Credential) -> Result<SessionUser, ApiError> {
        let url = self.endpoint(&["auth", "me"])?;
        let response: CurrentUserDto = self
            .send::<EmptyBody, _>(Method::GET, url, None, Bearer::Explicit(credential))
            .await?;
        Ok(response.user)
    }
}

#[async_trait]
impl<R: RestResource> RecordCollection<R> for HospitalApiClient {
    async fn list(&self) -> Result<Vec<R>, ApiError> {
        self.get_data(&[R::PATH]).await
    }

    async fn search(&self, query: &str) -> Result<Vec<R>, ApiError> {
        let url = search_url(self.endpoints.base_url(), R::PATH, R::SEARCH, query)?;
        let envelope: DataEnvelope<Vec<R>> = self.fetch(url).await?;
        Ok(envelope.data)
    }

    async fn get(&self, id: &RecordId) -> Result<R, ApiError> {
        self.get_data(&[R::PATH, id.as_str()]).await
    }

    async fn create(&self, draft: &R::Draft) -> Result<R, ApiError> {
        self.send_data(Method::POST, &[R::PATH], draft).await
    }

    async fn update(&self, id: &RecordId, draft: &R::Draft) -> Result<R, ApiError> {
        self.send_data(Method::PUT, &[R::PATH, id.as_str()], draft)
            .await
    }

    async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        self.delete_at(&[R::PATH, id.as_str()]).await
    }
}

#[async_trait]
impl AppointmentBook for HospitalApiClient {
    async fn list(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get_data(&["appointments"]).await
    }

    async fn upcoming(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get_data(&["appointments", "upcoming"]).await
    }

    async fn for_doctor(&self, doctor: &RecordId) -> Result<Vec<Appointment>, ApiError> {
        self.get_data(&["appointments", "doctor", doctor.as_str()])
            .await
    }

    async fn create(&self, draft: &AppointmentDraft) -> Result<Appointment, ApiError> {
        self.send_data(Method::POST, &["appointments"], draft).await
    }

    async fn update(
        &self,
        id: &RecordId,
        draft: &AppointmentDraft,
    ) -> Result<Appointment, ApiError> {
        self.send_data(Method::PUT, &["appointments", id.as_str()], draft)
            .await
    }

    async fn cancel(&self, id: &RecordId) -> Result<(), ApiError> {
        self.delete_at(&["appointments", id.as_str()]).await
    }
}

#[async_trait]
impl DashboardApi for HospitalApiClient {
    async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.get_data(&["dashboard", "stats"]).await
    }

    async fn recent_patients(&self) -> Result<Vec<Patient>, ApiError> {
        self.get_data(&["dashboard", "recent-patients"]).await
    }

    async fn today_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get_data(&["dashboard", "today-appointments"]).await
    }

    async fn appointment_trends(&self) -> Result<Value, ApiError> {
        let raw: Value = self.fetch(self.endpoint(&["dashboard", "appointment-trends"])?).await?;
        Ok(unwrap_data(raw))
    }

    async fn department_stats(&self) -> Result<Value, ApiError> {
        let raw: Value = self.fetch(self.endpoint(&["dashboard", "department-stats"])?).await?;
        Ok(unwrap_data(raw))
    }

    async fn doctor_workload(&self) -> Result<Value, ApiError> {
        let raw: Value = self.fetch(self.endpoint(&["dashboard", "doctor-workload"])?).await?;
        Ok(unwrap_data(raw))
    }
}

#[async_trait]
impl DirectoryApi for HospitalApiClient {
    async fn recently_added_patients(&self) -> Result<Vec<Patient>, ApiError> {
        self.get_data(&["patients", "recent"]).await
    }

    async fn available_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
        self.get_data(&["doctors", "available"]).await
    }

    async fn staff_departments(&self) -> Result<Vec<String>, ApiError> {
        let entries: Vec<Value> = self.get_data(&["staff", "departments"]).await?;
        Ok(entries.into_iter().filter_map(department_name).collect())
    }
}

#[async_trait]
impl HealthProbe for HospitalApiClient {
    async fn health(&self) -> Result<Value, ApiError> {
        let url = self.endpoints.health_url().clone();
        self.send::<EmptyBody, _>(Method::GET, url, None, Bearer::Anonymous)
            .await
    }
}
