//! In-process notifications.
//!
//! Operations report their outcomes here instead of printing. The binary
//! drains the channel and renders notices; tests assert on them directly.

use tokio::sync::mpsc;

use crate::error::ConsoleError;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A user-facing notification.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Sending half handed to every component that reports outcomes.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notice>,
}

/// Creates a notifier and the receiving half the binary drains.
pub fn channel() -> (Notifier, mpsc::UnboundedReceiver<Notice>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Notifier { tx }, rx)
}

impl Notifier {
    pub fn success(&self, message: impl Into<String>) {
        self.send(NoticeLevel::Success, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.send(NoticeLevel::Info, message.into());
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.send(NoticeLevel::Warning, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(NoticeLevel::Error, message.into());
    }

    /// Reports a failed operation, mapping the error to its user text.
    pub fn failure(&self, fallback: &str, err: &ConsoleError) {
        self.send(NoticeLevel::Error, err.user_message(fallback));
    }

    fn send(&self, level: NoticeLevel, message: String) {
        // A closed receiver means the binary is shutting down.
        let _ = self.tx.send(Notice { level, message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_arrive_in_order() {
        let (notifier, mut rx) = channel();
        notifier.success("Vacancy created successfully");
        notifier.error("Failed to fetch data");

        let first = rx.try_recv().unwrap();
        assert_eq!(first.level, NoticeLevel::Success);
        assert_eq!(first.message, "Vacancy created successfully");

        let second = rx.try_recv().unwrap();
        assert_eq!(second.level, NoticeLevel::Error);
    }

    #[test]
    fn test_failure_maps_session_expiry() {
        let (notifier, mut rx) = channel();
        notifier.failure("Failed to update status", &ConsoleError::SessionExpired);

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Session expired. Please login again.");
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silent() {
        let (notifier, rx) = channel();
        drop(rx);
        notifier.info("nobody listening");
    }
}
