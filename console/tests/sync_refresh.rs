//! Refresh loop behavior against a mock API server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tutorlink_console::client::ApiClient;
use tutorlink_console::config::Config;
use tutorlink_console::error::ConsoleError;
use tutorlink_console::notify;
use tutorlink_console::state::StateStore;
use tutorlink_console::sync::Synchronizer;
use tutorlink_model::{TeacherOrigin, TeacherStatus};

fn ok_body(data: serde_json::Value) -> serde_json::Value {
    json!({"success": true, "message": "ok", "data": data})
}

async fn synchronizer(server: &MockServer, interval: Duration) -> (Arc<Synchronizer>, Arc<StateStore>) {
    let config = Config {
        api_url: format!("{}/api", server.uri()),
        ..Config::default()
    };
    let client = Arc::new(ApiClient::new(&config, Some("token-1")).unwrap());
    let store = Arc::new(StateStore::new());
    let (notifier, _notices) = notify::channel();
    let sync = Arc::new(Synchronizer::new(
        Arc::clone(&client),
        Arc::clone(&store),
        notifier,
        interval,
    ));
    (sync, store)
}

async fn mount_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/vacancies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!([{
            "id": "v1",
            "title": "AL Physics",
            "subject": "Physics",
            "salary": "Rs. 50,000",
            "applications": [
                {"id": "a1", "teacher": {"id": "t2", "fullName": "Kumari Silva"}, "status": "accepted"}
            ]
        }]))))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/teacher-apply/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!([{
            "id": "t1",
            "fullName": "Nimal Perera",
            "status": "approved"
        }]))))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_refresh_merges_signups_and_applicants() {
    let server = MockServer::start().await;
    mount_ok(&server).await;
    let (sync, store) = synchronizer(&server, Duration::from_secs(60)).await;

    sync.refresh(true).await.unwrap();

    let state = store.snapshot().await;
    assert!(!state.loading);
    assert_eq!(state.vacancies.len(), 1);
    assert_eq!(state.teachers.len(), 2);

    let direct = &state.teachers[0];
    assert_eq!(direct.id, "t1");
    assert_eq!(direct.origin, TeacherOrigin::DirectSignup);
    assert_eq!(direct.status, TeacherStatus::Approved);

    // The applicant without a signup is derived from the vacancy, with
    // accepted folded into the teacher-level approved.
    let derived = &state.teachers[1];
    assert_eq!(derived.id, "t2");
    assert_eq!(derived.full_name, "Kumari Silva");
    assert_eq!(derived.origin, TeacherOrigin::VacancyApplication);
    assert_eq!(derived.status, TeacherStatus::Approved);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_data() {
    let server = MockServer::start().await;
    mount_ok(&server).await;
    let (sync, store) = synchronizer(&server, Duration::from_secs(60)).await;

    sync.refresh(true).await.unwrap();
    let before = store.snapshot().await;

    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "down"})))
        .mount(&server)
        .await;

    let err = sync.refresh(false).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Api { status: 500, .. }));

    let after = store.snapshot().await;
    assert_eq!(after.vacancies, before.vacancies);
    assert_eq!(after.teachers, before.teachers);
}

#[tokio::test]
async fn test_success_false_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "index rebuild in progress"})),
        )
        .mount(&server)
        .await;
    let (sync, store) = synchronizer(&server, Duration::from_secs(60)).await;

    let err = sync.refresh(false).await.unwrap_err();
    match err {
        ConsoleError::Api { status, message } => {
            assert_eq!(status, 200);
            assert_eq!(message, "index rebuild in progress");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(store.snapshot().await.vacancies.is_empty());
}

#[tokio::test]
async fn test_missing_data_payload_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    let (sync, _store) = synchronizer(&server, Duration::from_secs(60)).await;

    let err = sync.refresh(false).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Api { .. }));
}

#[tokio::test]
async fn test_loop_polls_until_shutdown() {
    let server = MockServer::start().await;
    mount_ok(&server).await;
    let (sync, store) = synchronizer(&server, Duration::from_millis(30)).await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = {
        let sync = Arc::clone(&sync);
        tokio::spawn(async move { sync.run(shutdown_rx).await })
    };

    tokio::time::sleep(Duration::from_millis(150)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    // The immediate first tick plus at least one periodic cycle.
    let requests = server.received_requests().await.unwrap();
    let fetches = requests
        .iter()
        .filter(|r| r.url.path() == "/api/vacancies")
        .count();
    assert!(fetches >= 2, "expected repeated polling, saw {}", fetches);
    assert_eq!(store.snapshot().await.vacancies.len(), 1);
}
