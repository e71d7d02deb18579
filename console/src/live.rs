//! Live update listener.
//!
//! Holds at most one push connection at a time and applies incoming
//! messages to the store in arrival order. The connection lifecycle is an
//! explicit state machine, observable through a watch channel:
//! disconnected, connecting, connected, backoff, then connecting again.
//! Every drop schedules exactly one reconnect attempt after a fixed delay,
//! and the cycle repeats until shutdown.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::stream::{self, Stream, StreamExt};
use tokio::sync::{watch, Mutex};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use tutorlink_model::{MessageError, PushMessage};

use crate::state::StateStore;

/// Lifecycle of the push connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Backoff,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Backoff => "backoff",
        };
        write!(f, "{}", s)
    }
}

/// Incoming text frames from one push connection.
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Push transport interface.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Open a connection and return its frame stream.
    async fn connect(&self, url: &str) -> Result<MessageStream>;
}

/// WebSocket transport.
pub struct WsTransport;

#[async_trait]
impl PushTransport for WsTransport {
    async fn connect(&self, url: &str) -> Result<MessageStream> {
        let (socket, _response) = connect_async(url).await?;
        let frames = socket.filter_map(|frame| async move {
            match frame {
                Ok(Message::Text(text)) => Some(Ok(text.to_string())),
                Ok(_) => None,
                Err(e) => Some(Err(anyhow::Error::from(e))),
            }
        });
        Ok(Box::pin(frames))
    }
}

/// Scripted transport for tests and offline development. Each connect
/// attempt pops the next entry from the script; an exhausted script stays
/// connected and silent.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<ScriptedConnect>>,
    connects: AtomicUsize,
}

pub enum ScriptedConnect {
    /// Connection refused.
    Fail,
    /// Deliver these frames, then close.
    Frames(Vec<String>),
    /// Deliver these frames, then hold the connection open.
    FramesThenHold(Vec<String>),
}

impl ScriptedTransport {
    pub fn new(script: Vec<ScriptedConnect>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            connects: AtomicUsize::new(0),
        }
    }

    /// How many connection attempts have been made.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushTransport for ScriptedTransport {
    async fn connect(&self, _url: &str) -> Result<MessageStream> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().await.pop_front() {
            Some(ScriptedConnect::Fail) => anyhow::bail!("scripted connection failure"),
            Some(ScriptedConnect::Frames(frames)) => {
                Ok(Box::pin(stream::iter(frames.into_iter().map(Ok))))
            }
            Some(ScriptedConnect::FramesThenHold(frames)) => Ok(Box::pin(
                stream::iter(frames.into_iter().map(Ok)).chain(stream::pending()),
            )),
            None => Ok(Box::pin(stream::pending())),
        }
    }
}

/// Listens on the push channel and applies messages to the store.
pub struct LiveListener {
    store: Arc<StateStore>,
    transport: Arc<dyn PushTransport>,
    url: String,
    reconnect_delay: Duration,
    state_tx: watch::Sender<ConnectionState>,
}

impl LiveListener {
    pub fn new(
        store: Arc<StateStore>,
        transport: Arc<dyn PushTransport>,
        url: impl Into<String>,
        reconnect_delay: Duration,
    ) -> (Self, watch::Receiver<ConnectionState>) {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        (
            Self {
                store,
                transport,
                url: url.into(),
                reconnect_delay,
                state_tx,
            },
            state_rx,
        )
    }

    /// Run the connection state machine until shutdown.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(url = %self.url, "Starting live update listener");

        'outer: loop {
            if *shutdown.borrow() {
                break;
            }

            self.set_state(ConnectionState::Connecting);
            let mut frames = match self.transport.connect(&self.url).await {
                Ok(frames) => {
                    info!("Live update channel connected");
                    self.set_state(ConnectionState::Connected);
                    frames
                }
                Err(e) => {
                    warn!(error = %e, "Live update connection failed");
                    if self.backoff(&mut shutdown).await {
                        break;
                    }
                    continue;
                }
            };

            loop {
                tokio::select! {
                    frame = frames.next() => {
                        match frame {
                            Some(Ok(text)) => self.handle_frame(&text).await,
                            Some(Err(e)) => {
                                warn!(error = %e, "Live update channel error");
                                break;
                            }
                            None => {
                                info!("Live update channel closed by server");
                                break;
                            }
                        }
                    }
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            break 'outer;
                        }
                    }
                }
            }

            if self.backoff(&mut shutdown).await {
                break;
            }
        }

        self.set_state(ConnectionState::Disconnected);
        info!("Live update listener shutting down");
    }

    /// Wait out the reconnect delay. Returns true when shutdown arrived
    /// during the wait.
    async fn backoff(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        self.set_state(ConnectionState::Backoff);
        debug!(
            delay_ms = self.reconnect_delay.as_millis() as u64,
            "Reconnecting after delay"
        );
        tokio::select! {
            _ = tokio::time::sleep(self.reconnect_delay) => false,
            _ = shutdown.changed() => *shutdown.borrow(),
        }
    }

    async fn handle_frame(&self, text: &str) {
        match PushMessage::parse(text) {
            Ok(PushMessage::NewApplication(event)) => {
                debug!(
                    teacher_id = %event.teacher.id,
                    vacancy_id = %event.vacancy.id,
                    application_id = %event.application.id,
                    "New application received"
                );
                self.store.apply_new_application(event).await;
            }
            Ok(PushMessage::StatusUpdate(event)) => {
                debug!(
                    teacher_id = %event.teacher_id,
                    status = %event.status,
                    "Status update received"
                );
                self.store
                    .apply_teacher_status(&event.teacher_id, event.status)
                    .await;
            }
            Err(MessageError::UnknownType(kind)) => {
                debug!(kind = %kind, "Ignoring unknown message type");
            }
            Err(e) => {
                warn!(error = %e, "Dropping malformed push message");
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        debug!(state = %state, "Push connection state changed");
        self.state_tx.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutorlink_model::{TeacherStatus, Vacancy, VacancyStatus};

    fn seed_vacancy(id: &str) -> Vacancy {
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

    fn new_application_frame(application_id: &str) -> String {
        format!(
            r#"{{"type": "NEW_APPLICATION", "data": {{
                "teacher": {{"id": "t1", "fullName": "Nimal Perera"}},
                "vacancy": {{"id": "v1"}},
                "application": {{"id": "{}", "teacher": {{"id": "t1"}}, "status": "pending"}}
            }}}}"#,
            application_id
        )
    }

    async fn run_until_idle(
        listener: LiveListener,
        shutdown_tx: watch::Sender<bool>,
        shutdown_rx: watch::Receiver<bool>,
    ) {
        let handle = tokio::spawn(async move { listener.run(shutdown_rx).await });
        tokio::time::sleep(Duration::from_millis(80)).await;
        let _ = shutdown_tx.send(true);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_frames_are_applied_in_order() {
        let store = Arc::new(StateStore::new());
        store.commit_refresh(vec![seed_vacancy("v1")], vec![]).await;

        let transport = Arc::new(ScriptedTransport::new(vec![ScriptedConnect::FramesThenHold(
            vec![
                new_application_frame("a1"),
                r#"{"type": "STATUS_UPDATE", "data": {"teacherId": "t1", "status": "approved"}}"#
                    .to_string(),
            ],
        )]));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (listener, _state) = LiveListener::new(
            Arc::clone(&store),
            transport,
            "ws://test.invalid/live",
            Duration::from_millis(5),
        );
        run_until_idle(listener, shutdown_tx, shutdown_rx).await;

        let state = store.snapshot().await;
        assert_eq!(state.vacancies[0].applications.len(), 1);
        assert_eq!(state.teachers.len(), 1);
        assert_eq!(state.teachers[0].status, TeacherStatus::Approved);
    }

    #[tokio::test]
    async fn test_single_delayed_reconnect_per_drop() {
        let store = Arc::new(StateStore::new());
        store.commit_refresh(vec![seed_vacancy("v1")], vec![]).await;

        let transport = Arc::new(ScriptedTransport::new(vec![
            ScriptedConnect::Frames(vec![new_application_frame("a1")]),
            ScriptedConnect::FramesThenHold(vec![new_application_frame("a2")]),
        ]));
        let counter = Arc::clone(&transport);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (listener, _state) = LiveListener::new(
            Arc::clone(&store),
            transport,
            "ws://test.invalid/live",
            Duration::from_millis(5),
        );
        run_until_idle(listener, shutdown_tx, shutdown_rx).await;

        assert_eq!(counter.connect_count(), 2);
        let state = store.snapshot().await;
        assert_eq!(state.vacancies[0].applications.len(), 2);
    }

    #[tokio::test]
    async fn test_connect_failure_retries_after_delay() {
        let store = Arc::new(StateStore::new());
        store.commit_refresh(vec![seed_vacancy("v1")], vec![]).await;

        let transport = Arc::new(ScriptedTransport::new(vec![
            ScriptedConnect::Fail,
            ScriptedConnect::FramesThenHold(vec![new_application_frame("a1")]),
        ]));
        let counter = Arc::clone(&transport);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (listener, mut state_rx) = LiveListener::new(
            Arc::clone(&store),
            transport,
            "ws://test.invalid/live",
            Duration::from_millis(5),
        );
        let handle = tokio::spawn(async move { listener.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(counter.connect_count(), 2);
        assert_eq!(*state_rx.borrow_and_update(), ConnectionState::Connected);

        let _ = shutdown_tx.send(true);
        handle.await.unwrap();
        assert_eq!(*state_rx.borrow_and_update(), ConnectionState::Disconnected);

        let state = store.snapshot().await;
        assert_eq!(state.vacancies[0].applications.len(), 1);
    }

    #[tokio::test]
    async fn test_bad_frames_do_not_disturb_state() {
        let store = Arc::new(StateStore::new());
        store.commit_refresh(vec![seed_vacancy("v1")], vec![]).await;

        let transport = Arc::new(ScriptedTransport::new(vec![ScriptedConnect::FramesThenHold(
            vec![
                r#"{"type": "PING", "data": {}}"#.to_string(),
                "not json at all".to_string(),
                r#"{"type": "NEW_APPLICATION", "data": {"teacher": 42}}"#.to_string(),
                new_application_frame("a1"),
            ],
        )]));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (listener, _state) = LiveListener::new(
            Arc::clone(&store),
            transport,
            "ws://test.invalid/live",
            Duration::from_millis(5),
        );
        run_until_idle(listener, shutdown_tx, shutdown_rx).await;

        let state = store.snapshot().await;
        assert_eq!(state.vacancies[0].applications.len(), 1);
        assert_eq!(state.vacancies[0].applications[0].id, "a1");
    }

    #[tokio::test]
    async fn test_redelivered_message_after_reconnect_is_deduped() {
        let store = Arc::new(StateStore::new());
        store.commit_refresh(vec![seed_vacancy("v1")], vec![]).await;

        // The same application arrives again on the second connection.
        let transport = Arc::new(ScriptedTransport::new(vec![
            ScriptedConnect::Frames(vec![new_application_frame("a1")]),
            ScriptedConnect::FramesThenHold(vec![new_application_frame("a1")]),
        ]));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (listener, _state) = LiveListener::new(
            Arc::clone(&store),
            transport,
            "ws://test.invalid/live",
            Duration::from_millis(5),
        );
        run_until_idle(listener, shutdown_tx, shutdown_rx).await;

        let state = store.snapshot().await;
        assert_eq!(state.vacancies[0].applications.len(), 1);
        assert_eq!(state.teachers.len(), 1);
    }
}
