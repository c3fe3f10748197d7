//! HTTP adapter tests against a stub hospital API.
//!
//! The stub records every request it receives so the tests can assert on the
//! presented bearer credential, the path, the query string and the body.

use std::net::TcpListener;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::header;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use hospital_client::config::ApiEndpoints;
use hospital_client::domain::ports::{
    AppointmentBook, AuthApi, DashboardApi, DirectoryApi, HealthProbe, MemoryCredentialBackend,
    RecordCollection,
};
use hospital_client::domain::{
    ApiErrorKind, Credential, Doctor, Patient, PatientDraft, RecordId, Role, SessionManager,
    SessionStatus, TokenStore,
};
use hospital_client::hooks::{Debouncer, FetchOutcome, PatientsHook};
use hospital_client::outbound::http::HospitalApiClient;
use reqwest::Url;
use serde_json::{Value, json};

const VALID_TOKEN: &str = "tok-1";

#[derive(Debug, Clone)]
struct Seen {
    method: String,
    path: String,
    query: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: String,
}

#[derive(Default)]
struct Journal {
    requests: Mutex<Vec<Seen>>,
}

impl Journal {
    fn record(&self, seen: Seen) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(seen);
    }

    fn requests(&self) -> Vec<Seen> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn last(&self) -> Seen {
        self.requests().pop().expect("at least one request")
    }
}

/// Echo a record body back in the `{data: record}` envelope, keyed the way
/// Mongoose serialises documents with virtuals (`_id` and `id`).
fn saved_patient(id: &str, body: &[u8]) -> Value {
    let mut record = serde_json::from_slice::<Value>(body).unwrap_or_else(|_| json!({}));
    if let Some(fields) = record.as_object_mut() {
        fields.insert("_id".to_owned(), json!(id));
        fields.insert("id".to_owned(), json!(id));
    }
    json!({ "success": true, "data": record })
}

fn doctor_json() -> Value {
    json!({ "_id": "u1", "name": "Dr. X", "email": "doc@x.com", "role": "doctor" })
}

async fn stub(req: HttpRequest, body: web::Bytes, journal: web::Data<Journal>) -> HttpResponse {
    let header_text = |name| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let authorization = header_text(header::AUTHORIZATION);
    let bearer_ok = authorization.as_deref() == Some("Bearer tok-1");
    journal.record(Seen {
        method: req.method().to_string(),
        path: req.path().to_owned(),
        query: req.query_string().to_owned(),
        authorization,
        content_type: header_text(header::CONTENT_TYPE),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    match (req.method().as_str(), req.path()) {
        ("GET", "/health") => HttpResponse::Ok().json(json!({ "status": "ok" })),
        ("POST", "/api/auth/login") => {
            let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            if payload.get("password").and_then(Value::as_str) == Some("pw") {
                HttpResponse::Ok().json(json!({ "token": VALID_TOKEN, "user": doctor_json() }))
            } else {
                HttpResponse::Unauthorized().json(json!({ "message": "Invalid credentials" }))
            }
        }
        ("POST", "/api/auth/logout") => HttpResponse::Ok().json(json!({ "success": true })),
        ("GET", "/api/auth/me") if bearer_ok => {
            HttpResponse::Ok().json(json!({ "user": doctor_json() }))
        }
        ("GET", "/api/auth/me") => {
            HttpResponse::Unauthorized().json(json!({ "error": "Invalid token" }))
        }
        ("GET", "/api/patients") => HttpResponse::Ok().json(json!({
            "data": [{ "_id": "p1", "name": "Ann Lee" }, { "id": 7, "name": "Bo Chan" }]
        })),
        ("GET", "/api/patients/search") | ("GET", "/api/doctors") => {
            HttpResponse::Ok().json(json!({ "data": [] }))
        }
        ("POST", "/api/patients") => HttpResponse::Created().json(saved_patient("p3", &body)),
        ("PUT", "/api/patients/p3") => HttpResponse::Ok().json(saved_patient("p3", &body)),
        ("DELETE", "/api/patients/p3") => HttpResponse::Ok().json(json!({ "success": true })),
        ("GET", "/api/patients/missing") => {
            HttpResponse::NotFound().json(json!({ "message": "Patient not found" }))
        }
        ("GET", "/api/dashboard/stats") => HttpResponse::InternalServerError().body("oops"),
        ("GET", "/api/dashboard/department-stats") => {
            HttpResponse::Ok().json(json!({ "data": { "ICU": 3 } }))
        }
        ("GET", "/api/staff/departments") => HttpResponse::Ok().json(json!({
            "data": ["ICU", { "name": "Radiology" }, 42]
        })),
        ("DELETE", "/api/appointments/a1") => HttpResponse::NoContent().finish(),
        _ => HttpResponse::NotFound().finish(),
    }
}

struct Stub {
    base: String,
    journal: web::Data<Journal>,
    server: ServerHandle,
}

impl Stub {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let addr = listener.local_addr().expect("stub address");
        let journal = web::Data::new(Journal::default());
        let app_journal = journal.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_journal.clone())
                .default_service(web::to(stub))
        })
        .disable_signals()
        .workers(1)
        .listen(listener)
        .expect("listen")
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        Self {
            base: format!("http://{addr}"),
            journal,
            server: handle,
        }
    }

    fn client(&self, tokens: TokenStore) -> HospitalApiClient {
        endpoints_client(&self.base, tokens)
    }

    async fn stop(self) {
        self.server.stop(true).await;
    }
}

fn endpoints_client(base: &str, tokens: TokenStore) -> HospitalApiClient {
    let endpoints = ApiEndpoints::new(
        Url::parse(&format!("{base}/api")).expect("api url"),
        Url::parse(&format!("{base}/health")).expect("health url"),
        Duration::from_secs(5),
    )
    .expect("endpoints");
    HospitalApiClient::new(endpoints, tokens).expect("client")
}

fn signed_in_store() -> TokenStore {
    TokenStore::new(Arc::new(MemoryCredentialBackend::with_value(VALID_TOKEN)))
}

#[actix_rt::test]
async fn stored_credential_is_presented_as_bearer() {
    let stub = Stub::start().await;
    let client = stub.client(signed_in_store());

    let patients = RecordCollection::<Patient>::list(&client).await.expect("patients");

    assert_eq!(patients.len(), 2);
    assert_eq!(patients[1].id.as_str(), "7");
    let seen = stub.journal.last();
    assert_eq!(seen.path, "/api/patients");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer tok-1"));
    stub.stop().await;
}

#[actix_rt::test]
async fn no_authorization_header_without_a_credential() {
    let stub = Stub::start().await;
    let client = stub.client(TokenStore::in_memory());

    RecordCollection::<Patient>::list(&client).await.expect("patients");

    assert_eq!(stub.journal.last().authorization, None);
    stub.stop().await;
}

#[actix_rt::test]
async fn health_check_never_sends_the_credential() {
    let stub = Stub::start().await;
    let client = stub.client(signed_in_store());

    let health = client.health().await.expect("health");

    assert_eq!(health, json!({ "status": "ok" }));
    let seen = stub.journal.last();
    assert_eq!(seen.path, "/health");
    assert_eq!(seen.authorization, None);
    stub.stop().await;
}

#[actix_rt::test]
async fn search_text_is_query_encoded() {
    let stub = Stub::start().await;
    let client = stub.client(signed_in_store());

    RecordCollection::<Patient>::search(&client, "ali & bo")
        .await
        .expect("patient search");
    RecordCollection::<Doctor>::search(&client, "cardio")
        .await
        .expect("doctor search");

    let requests = stub.journal.requests();
    assert_eq!(requests[0].path, "/api/patients/search");
    assert_eq!(requests[0].query, "q=ali+%26+bo");
    assert_eq!(requests[1].path, "/api/doctors");
    assert_eq!(requests[1].query, "search=cardio");
    stub.stop().await;
}

#[actix_rt::test]
async fn server_messages_become_error_text() {
    let stub = Stub::start().await;
    let client = stub.client(signed_in_store());
    let missing = RecordId::new("missing").expect("id");

    let not_found = RecordCollection::<Patient>::get(&client, &missing)
        .await
        .expect_err("missing patient");
    let opaque = client.stats().await.expect_err("stats failure");

    assert_eq!(not_found.kind(), ApiErrorKind::Http);
    assert_eq!(not_found.status(), Some(404));
    assert_eq!(not_found.to_string(), "Patient not found");
    assert_eq!(opaque.to_string(), "HTTP error! status: 500");
    stub.stop().await;
}

#[actix_rt::test]
async fn unauthorised_responses_are_auth_errors() {
    let stub = Stub::start().await;
    let client = stub.client(TokenStore::in_memory());
    let stale = Credential::parse("stale").expect("credential");

    let err = client.current_user(&stale).await.expect_err("stale token");

    assert!(err.is_auth());
    assert_eq!(err.to_string(), "Invalid token");
    assert_eq!(stub.journal.last().authorization.as_deref(), Some("Bearer stale"));
    stub.stop().await;
}

#[actix_rt::test]
async fn empty_success_bodies_are_accepted() {
    let stub = Stub::start().await;
    let client = stub.client(signed_in_store());
    let id = RecordId::new("a1").expect("id");

    AppointmentBook::cancel(&client, &id).await.expect("cancel");

    assert_eq!(stub.journal.last().method, "DELETE");
    stub.stop().await;
}

#[actix_rt::test]
async fn department_entries_are_normalised() {
    let stub = Stub::start().await;
    let client = stub.client(signed_in_store());

    let departments = client.staff_departments().await.expect("departments");
    let breakdown = client.department_stats().await.expect("department stats");

    assert_eq!(departments, vec!["ICU".to_owned(), "Radiology".to_owned()]);
    assert_eq!(breakdown, json!({ "ICU": 3 }));
    stub.stop().await;
}

#[actix_rt::test]
async fn unreachable_server_is_a_network_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("address")
    };
    let client = endpoints_client(&format!("http://{addr}"), TokenStore::in_memory());

    let err = client.health().await.expect_err("closed port");

    assert_eq!(err.kind(), ApiErrorKind::Network);
    assert_eq!(err.status(), None);
}

#[actix_rt::test]
async fn login_round_trip_through_the_session_manager() {
    let stub = Stub::start().await;
    let tokens = TokenStore::in_memory();
    let client = Arc::new(stub.client(tokens.clone()));

    let session = SessionManager::start(client.clone(), tokens.clone()).await;
    assert_eq!(session.status(), SessionStatus::Anonymous);
    assert!(stub.journal.requests().is_empty());

    let rejected = session.login("doc@x.com", "wrong").await.expect_err("bad password");
    assert_eq!(rejected.to_string(), "Invalid credentials");
    assert!(tokens.get().is_none());

    let user = session.login(" doc@x.com ", "pw").await.expect("login");
    assert_eq!(user.role(), Some(Role::Doctor));
    assert_eq!(tokens.get().map(|c| c.expose().to_owned()).as_deref(), Some(VALID_TOKEN));
    let login = stub.journal.last();
    let body: Value = serde_json::from_str(&login.body).expect("login body");
    assert_eq!(body, json!({ "email": "doc@x.com", "password": "pw" }));

    let patients = PatientsHook::new(client.clone(), Debouncer::new(Duration::ZERO));
    assert_eq!(patients.mount().await, FetchOutcome::Applied);
    assert_eq!(patients.records().len(), 2);
    assert_eq!(stub.journal.last().authorization.as_deref(), Some("Bearer tok-1"));

    session.logout().await;
    let logout = stub.journal.last();
    assert_eq!(logout.path, "/api/auth/logout");
    assert_eq!(logout.authorization.as_deref(), Some("Bearer tok-1"));
    assert!(tokens.get().is_none());
    assert_eq!(session.status(), SessionStatus::Anonymous);
    stub.stop().await;
}

#[actix_rt::test]
async fn startup_probe_restores_a_stored_session() {
    let stub = Stub::start().await;
    let tokens = signed_in_store();
    let client = Arc::new(stub.client(tokens.clone()));

    let session = SessionManager::start(client, tokens).await;

    assert_eq!(session.status(), SessionStatus::Authenticated);
    assert_eq!(session.current_user().map(|u| u.name().to_owned()).as_deref(), Some("Dr. X"));
    assert_eq!(stub.journal.last().path, "/api/auth/me");
    stub.stop().await;
}

#[actix_rt::test]
async fn patient_mutations_round_trip_through_the_hook() {
    let stub = Stub::start().await;
    let client = Arc::new(stub.client(signed_in_store()));
    let patients = PatientsHook::new(client, Debouncer::new(Duration::ZERO));
    assert_eq!(patients.mount().await, FetchOutcome::Applied);

    let draft = PatientDraft {
        first_name: Some("Cy".to_owned()),
        last_name: Some("Diaz".to_owned()),
        ..PatientDraft::default()
    };
    let created = patients.create(&draft).await.expect("create");
    assert_eq!(created.id.as_str(), "p3");
    let post = stub.journal.last();
    assert_eq!((post.method.as_str(), post.path.as_str()), ("POST", "/api/patients"));
    assert_eq!(post.content_type.as_deref(), Some("application/json"));
    assert_eq!(post.authorization.as_deref(), Some("Bearer tok-1"));
    let sent: Value = serde_json::from_str(&post.body).expect("create body");
    assert_eq!(sent, json!({ "firstName": "Cy", "lastName": "Diaz" }));
    assert_eq!(patients.records().len(), 3);

    let renamed = PatientDraft {
        name: Some("Cy Diaz-Lee".to_owned()),
        ..PatientDraft::default()
    };
    let updated = patients.update(&created.id, &renamed).await.expect("update");
    assert_eq!(updated.name.as_deref(), Some("Cy Diaz-Lee"));
    let put = stub.journal.last();
    assert_eq!((put.method.as_str(), put.path.as_str()), ("PUT", "/api/patients/p3"));
    assert_eq!(put.content_type.as_deref(), Some("application/json"));
    let sent: Value = serde_json::from_str(&put.body).expect("update body");
    assert_eq!(sent, json!({ "name": "Cy Diaz-Lee" }));
    let names: Vec<_> = patients
        .records()
        .iter()
        .map(|p| p.name.clone().unwrap_or_default())
        .collect();
    assert_eq!(names, ["Ann Lee", "Bo Chan", "Cy Diaz-Lee"]);

    patients.delete(&created.id).await.expect("delete");
    let delete = stub.journal.last();
    assert_eq!((delete.method.as_str(), delete.path.as_str()), ("DELETE", "/api/patients/p3"));
    assert!(delete.body.is_empty());
    let ids: Vec<_> = patients.records().iter().map(|p| p.id.to_string()).collect();
    assert_eq!(ids, ["p1", "7"]);
    stub.stop().await;
}
