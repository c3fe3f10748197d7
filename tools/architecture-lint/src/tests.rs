//! Regression coverage for this module.

use rstest::rstest;

use super::*;

fn crossed(path: &str, text: &str) -> Vec<Boundary> {
    match check(&[SourceFile::new(path, text)]) {
        Ok(()) => Vec::new(),
        Err(LintError::Violations(findings)) => {
            findings.into_iter().map(|finding| finding.crossed).collect()
        }
        Err(other) => panic!("unexpected lint error: {other}"),
    }
}

#[rstest]
#[case("domain/session.rs", Some(Layer::Domain))]
#[case("domain/mod.rs", Some(Layer::Domain))]
#[case("hooks.rs", Some(Layer::Hooks))]
#[case("outbound/storage/atomic_write.rs", Some(Layer::Outbound))]
#[case("config.rs", None)]
#[case("main.rs", None)]
fn files_belong_to_their_top_level_module(#[case] path: &str, #[case] expected: Option<Layer>) {
    assert_eq!(Layer::of(Utf8Path::new(path)), expected);
}

#[rstest]
#[case("hooks/collection.rs", "use crate::domain::ports::RecordCollection;")]
#[case("hooks/collection.rs", "use super::{Debouncer, Resource};")]
#[case("domain/session.rs", "fn f() { let _ = std::sync::Arc::new(1); }")]
#[case("outbound/http/client.rs", "use crate::config::ApiEndpoints; use reqwest::Client;")]
#[case("outbound/http/client.rs", "use crate::domain::{ApiError, ports::AuthApi};")]
#[case("config.rs", "use crate::hooks::Resource; use reqwest::Client;")]
fn permitted_dependencies_pass(#[case] path: &str, #[case] text: &str) {
    assert_eq!(crossed(path, text), Vec::new());
}

#[rstest]
#[case("hooks/collection.rs", "use crate::outbound::http::HospitalApiClient;", Boundary::Module("outbound"))]
#[case("hooks/dashboard.rs", "use hospital_client::outbound::http;", Boundary::Module("outbound"))]
#[case("hooks/resource.rs", "fn f() { let _ = reqwest::Client::new(); }", Boundary::Crate("reqwest"))]
#[case("domain/session.rs", "use crate::hooks::Resource;", Boundary::Module("hooks"))]
#[case("domain/token_store.rs", "fn f(_: crate::config::ClientSettings) {}", Boundary::Module("config"))]
#[case("domain/ports/credential_backend.rs", "use cap_std::fs::Dir;", Boundary::Crate("cap_std"))]
#[case("domain/records.rs", "use ::url::Url;", Boundary::Crate("url"))]
#[case("outbound/http/client.rs", "use crate::hooks::PatientsHook;", Boundary::Module("hooks"))]
fn crossings_are_reported(#[case] path: &str, #[case] text: &str, #[case] expected: Boundary) {
    assert_eq!(crossed(path, text), vec![expected]);
}

#[rstest]
#[case("domain/mod.rs", "use super::outbound::http;")]
#[case("domain/ports/auth_api.rs", "use super::super::super::outbound::http;")]
#[case("domain/session.rs", "mod inner { use super::super::super::outbound::http; }")]
fn relative_paths_are_resolved_from_the_file_module(#[case] path: &str, #[case] text: &str) {
    assert_eq!(crossed(path, text), vec![Boundary::Module("outbound")]);
}

#[rstest]
fn inline_test_modules_resolve_super_to_their_parent() {
    let text = "mod tests { use super::Resource; fn f() { let _ = super::super::Debouncer::new; } }";
    assert_eq!(crossed("hooks/resource.rs", text), Vec::new());
}

#[rstest]
fn lone_identifiers_are_not_crate_references() {
    let text = "fn f(url: &str) -> usize { let reqwest = url; reqwest.len() }";
    assert_eq!(crossed("hooks/collection.rs", text), Vec::new());
}

#[rstest]
fn unparsable_sources_are_reported_by_file() {
    let err = check(&[SourceFile::new("hooks/broken.rs", "fn (")]).expect_err("parse failure");
    assert!(matches!(err, LintError::Parse { ref file, .. } if file.as_str() == "hooks/broken.rs"));
}

#[rstest]
fn every_crossing_in_a_file_is_listed_once() {
    let text = "use crate::hooks::A; use crate::hooks::B; use reqwest::Client; use url::Url;";
    let err = check(&[SourceFile::new("domain/user.rs", text)]).expect_err("violations");
    let rendered = err.to_string();
    assert!(rendered.starts_with("3 layering violation(s):"), "{rendered}");
    assert!(rendered.contains("domain/user.rs: domain must not depend on crate::hooks"));
    assert!(rendered.contains("external crate `reqwest`"));
}
