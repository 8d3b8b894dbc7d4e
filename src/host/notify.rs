use std::sync::{Mutex, PoisonError};

use tracing::warn;

/// Transient user-facing notifications (toasts)
pub trait Notifier: Send + Sync {
    /// Show an error message; fire-and-forget
    fn error(&self, message: &str);
}

/// Notifier that writes to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        warn!(target: "console_shell_lib::toast", "{}", message);
    }
}

/// Notifier that keeps every message it was asked to show
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages shown so far
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for MemoryNotifier {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
