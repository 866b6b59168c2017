//! Alerts raised by the controller for a front-end to display.

use std::sync::Mutex;

/// Visual weight a front-end should give an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Destructive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    MissingCredential,
    ConnectionFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn missing_credential() -> Self {
        Self {
            kind: NotificationKind::MissingCredential,
            title: "Thiếu API Key".to_string(),
            description: "Bạn cần cấu hình OPENROUTER_API_KEY trong cấu hình hoặc biến môi trường."
                .to_string(),
            severity: Severity::Destructive,
        }
    }

    pub fn connection_failure() -> Self {
        Self {
            kind: NotificationKind::ConnectionFailure,
            title: "Lỗi kết nối".to_string(),
            description: "Không thể kết nối với chatbot. Vui lòng thử lại.".to_string(),
            severity: Severity::Destructive,
        }
    }
}

/// Receives alerts. Implementations decide how (and whether) to show them.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Keeps every notification in memory; handy for headless use and tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        match self.seen.lock() {
            Ok(seen) => seen.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.notifications().iter().map(|n| n.kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        match self.seen.lock() {
            Ok(mut seen) => seen.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
