//! Session acquisition, re-authentication and cookie persistence

use crate::common::{file_names, home_page, login_page, mount_valid_session, test_config};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tycoon_autopilot::session::{AuthSession, CookieJar, CredentialStore, PortalRequest};
use tycoon_autopilot::{AutopilotError, ErrorDisposition, SessionStatus};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_expired_probe(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/login"))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_valid_session_is_probed_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(200).set_body_string(home_page()))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = AuthSession::new(&test_config(&server.uri(), dir.path())).unwrap();

    assert_eq!(session.acquire().await.unwrap(), SessionStatus::Verified);
    assert_eq!(session.acquire().await.unwrap(), SessionStatus::Reused);
    assert_eq!(session.request_count(), 1);
    assert!(session.is_validated());
}

#[tokio::test]
async fn test_invalidate_forces_a_new_probe() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(200).set_body_string(home_page()))
        .expect(2)
        .mount(&server)
        .await;

    let mut session = AuthSession::new(&test_config(&server.uri(), dir.path())).unwrap();
    session.acquire().await.unwrap();
    session.invalidate();

    assert_eq!(session.acquire().await.unwrap(), SessionStatus::Verified);
}

#[tokio::test]
async fn test_expired_session_logs_in_and_persists_cookies() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), dir.path());

    mount_expired_probe(&server).await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "PHPSESSID=fresh-session; path=/; HttpOnly")
                .set_body_string(login_page("tok-login")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login_check"))
        .and(body_string_contains("_csrf_token=tok-login"))
        .and(body_string_contains("_username=pilot%40example.com"))
        .and(body_string_contains("_password=hunter2"))
        .and(body_string_contains("_remember_me=off"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    // The second probe must carry the session cookie obtained while logging in
    Mock::given(method("GET"))
        .and(path("/home"))
        .and(header("cookie", "PHPSESSID=fresh-session"))
        .respond_with(ResponseTemplate::new(200).set_body_string(home_page()))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = AuthSession::new(&config).unwrap();
    assert_eq!(session.acquire().await.unwrap(), SessionStatus::Reauthenticated);
    assert_eq!(session.request_count(), 4);

    let persisted = CredentialStore::new(&config.storage.cookies_path).load().unwrap();
    assert_eq!(persisted.get("PHPSESSID"), Some("fresh-session"));
}

#[tokio::test]
async fn test_missing_csrf_token_is_a_protocol_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), dir.path());

    mount_expired_probe(&server).await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><form></form></html>"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login_check"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = AuthSession::new(&config).unwrap();
    let err = session.acquire().await.unwrap_err();

    assert!(matches!(err, AutopilotError::Protocol(_)));
    assert_eq!(err.disposition(), ErrorDisposition::Retry);
    assert!(!session.is_validated());

    let dumps = file_names(&config.storage.dump_dir);
    assert_eq!(dumps.len(), 1);
    assert!(dumps[0].ends_with("__csrf_token_field_not_found.html"));
}

#[tokio::test]
async fn test_rejected_login_is_reported() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/login"))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_page("tok-login")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login_check"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut session = AuthSession::new(&test_config(&server.uri(), dir.path())).unwrap();
    let err = session.acquire().await.unwrap_err();

    match err {
        AutopilotError::Protocol(message) => assert_eq!(message, "authentication rejected"),
        other => panic!("expected a protocol error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_redirects_are_followed_with_cookies() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_valid_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "/new")
                .insert_header("set-cookie", "hop=1; path=/"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("arrived"))
        .mount(&server)
        .await;

    let mut session = AuthSession::new(&test_config(&server.uri(), dir.path())).unwrap();
    let response = session.request(PortalRequest::get("/old")).await.unwrap();

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.body, "arrived");
    assert_eq!(response.url.path(), "/new");
    assert_eq!(session.cookies().get("hop"), Some("1"));
}

#[tokio::test]
async fn test_redirect_loop_hits_the_limit() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_valid_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .mount(&server)
        .await;

    let mut session = AuthSession::new(&test_config(&server.uri(), dir.path())).unwrap();
    let err = session.request(PortalRequest::get("/loop")).await.unwrap_err();

    assert!(matches!(err, AutopilotError::RedirectLimit { .. }));
    assert_eq!(err.disposition(), ErrorDisposition::Retry);
}

#[tokio::test]
async fn test_cookies_survive_a_restart() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "PHPSESSID=abc123; path=/")
                .set_body_string(home_page()),
        )
        .mount(&server)
        .await;

    let mut first = AuthSession::new(&config).unwrap();
    first.acquire().await.unwrap();
    drop(first);

    let second = AuthSession::new(&config).unwrap();
    assert_eq!(second.cookies().get("PHPSESSID"), Some("abc123"));
}

#[tokio::test]
async fn test_corrupt_cookie_blob_starts_empty() {
    let dir = TempDir::new().unwrap();
    let config = test_config("http://127.0.0.1:9", dir.path());
    std::fs::write(&config.storage.cookies_path, b"\x80\x03}q\x00(X").unwrap();

    let session = AuthSession::new(&config).unwrap();
    assert_eq!(session.cookies(), &CookieJar::new());
}

#[tokio::test]
async fn test_failed_request_still_pauses_and_persists_cookies() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config("http://127.0.0.1:9", dir.path());
    config.schedule.request_interval_min = 1;
    config.schedule.request_interval_max = 1;

    let mut session = AuthSession::new(&config).unwrap();
    let started = Instant::now();
    let err = session.acquire().await.unwrap_err();

    assert_eq!(err.disposition(), ErrorDisposition::Retry);
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(session.request_count(), 1);
    assert!(config.storage.cookies_path.exists());
}
