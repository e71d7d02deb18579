//! Push channel behavior driven by a scripted transport.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use tutorlink_console::live::{LiveListener, ScriptedConnect, ScriptedTransport};
use tutorlink_console::state::StateStore;
use tutorlink_model::{Teacher, TeacherStatus, Vacancy, VacancyStatus};

fn teacher(id: &str, status: TeacherStatus) -> Teacher {
    Teacher {
        id: id.to_string(),
        full_name: format!("Teacher {}", id),
        email: String::new(),
        phone: String::new(),
        subjects: vec![],
        cv: None,
        status,
        origin: Default::default(),
        applied_at: None,
    }
}

fn vacancy(id: &str) -> Vacancy {
    Vacancy {
        id: id.to_string(),
        title: "Maths".to_string(),
        subject: "Mathematics".to_string(),
        description: String::new(),
        requirements: vec![],
        salary: String::new(),
        status: VacancyStatus::Open,
        featured: false,
        applications: vec![],
    }
}

fn status_frame(teacher_id: &str, status: &str) -> String {
    format!(
        r#"{{"type": "STATUS_UPDATE", "data": {{"teacherId": "{}", "status": "{}"}}}}"#,
        teacher_id, status
    )
}

async fn run_listener(store: Arc<StateStore>, script: Vec<ScriptedConnect>) {
    let transport = Arc::new(ScriptedTransport::new(script));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (listener, _state_rx) = LiveListener::new(
        store,
        transport,
        "ws://test.invalid/live",
        Duration::from_millis(5),
    );
    let handle = tokio::spawn(async move { listener.run(shutdown_rx).await });
    tokio::time::sleep(Duration::from_millis(80)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_pushed_approval_is_pinned_across_stale_refresh() {
    let store = Arc::new(StateStore::new());
    store
        .commit_refresh(vec![], vec![teacher("t1", TeacherStatus::Pending)])
        .await;

    run_listener(
        Arc::clone(&store),
        vec![ScriptedConnect::FramesThenHold(vec![status_frame(
            "t1", "approved",
        )])],
    )
    .await;

    // A stale poll right after the push must not regress the decision.
    store
        .commit_refresh(vec![], vec![teacher("t1", TeacherStatus::Pending)])
        .await;

    let state = store.snapshot().await;
    assert_eq!(state.teachers[0].status, TeacherStatus::Approved);
}

#[tokio::test]
async fn test_later_push_overrides_earlier_one() {
    let store = Arc::new(StateStore::new());
    store
        .commit_refresh(vec![], vec![teacher("t1", TeacherStatus::Pending)])
        .await;

    run_listener(
        Arc::clone(&store),
        vec![ScriptedConnect::FramesThenHold(vec![
            status_frame("t1", "approved"),
            status_frame("t1", "rejected"),
        ])],
    )
    .await;

    let state = store.snapshot().await;
    assert_eq!(state.teachers[0].status, TeacherStatus::Rejected);
    // The rejection cleared the approval pin, so a stale poll may flicker.
    assert_eq!(store.pinned_teacher("t1").await, None);
}

#[tokio::test]
async fn test_push_for_unknown_teacher_is_harmless() {
    let store = Arc::new(StateStore::new());
    store.commit_refresh(vec![vacancy("v1")], vec![]).await;

    run_listener(
        Arc::clone(&store),
        vec![ScriptedConnect::FramesThenHold(vec![status_frame(
            "t404", "approved",
        )])],
    )
    .await;

    // No roster entry matches, but the decision is still pinned for the
    // moment the teacher shows up in a poll.
    let state = store.snapshot().await;
    assert!(state.teachers.is_empty());
    assert_eq!(
        store.pinned_teacher("t404").await,
        Some(TeacherStatus::Approved)
    );

    store
        .commit_refresh(vec![], vec![teacher("t404", TeacherStatus::Pending)])
        .await;
    assert_eq!(
        store.snapshot().await.teachers[0].status,
        TeacherStatus::Approved
    );
}
