use std::sync::{Arc, Mutex};

/// Fire-and-forget port for surfacing user-facing toasts.
///
/// Implementations must not block; the session workflow never waits on a
/// notification.
pub trait NotificationSink: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Sink that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn success(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// A notification captured by [`MemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

/// Records notifications in memory, mainly for tests.
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    messages: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in delivery order.
    #[must_use]
    pub fn messages(&self) -> Vec<Notification> {
        self.messages
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for MemoryNotifier {
    fn success(&self, message: &str) {
        if let Ok(mut guard) = self.messages.lock() {
            guard.push(Notification::Success(message.to_string()));
        }
    }

    fn error(&self, message: &str) {
        if let Ok(mut guard) = self.messages.lock() {
            guard.push(Notification::Error(message.to_string()));
        }
    }
}
