//! # User Notifications
//!
//! Workflows report outcomes ("Cupom criado", "Erro ao reservar") through a
//! [`Notifier`] passed to them. There is no process-wide handler: the API
//! injects a logging implementation, tests inject [`RecordingNotifier`].

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use ts_rs::TS;

/// Visual style of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Info,
    Success,
    Warning,
    Danger,
}

impl NotificationVariant {
    /// Title used when a caller does not give one.
    pub const fn default_title(&self) -> &'static str {
        match self {
            NotificationVariant::Info => "Informação",
            NotificationVariant::Success => "Sucesso",
            NotificationVariant::Warning => "Atenção",
            NotificationVariant::Danger => "Erro",
        }
    }
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn new(variant: NotificationVariant, message: impl Into<String>) -> Self {
        Notification {
            title: variant.default_title().to_string(),
            message: message.into(),
            variant,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Sink for user notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification::new(NotificationVariant::Success, message));
    }

    fn error(&self, message: &str) {
        self.notify(Notification::new(NotificationVariant::Danger, message));
    }

    fn warning(&self, message: &str) {
        self.notify(Notification::new(NotificationVariant::Warning, message));
    }

    fn info(&self, message: &str) {
        self.notify(Notification::new(NotificationVariant::Info, message));
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far, oldest first.
    pub fn sent(&self) -> Vec<Notification> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        match self.sent.lock() {
            Ok(mut sent) => sent.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
