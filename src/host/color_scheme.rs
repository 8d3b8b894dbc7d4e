use tokio::sync::watch;
use tracing::debug;

/// Source of the system color-scheme preference
pub trait ColorScheme: Send + Sync {
    /// Whether the system currently prefers a dark appearance
    fn prefers_dark(&self) -> bool;

    /// Receiver that is notified whenever the preference flips
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Color scheme whose value is pushed in by the host
pub struct SystemColorScheme {
    sender: watch::Sender<bool>,
}

impl SystemColorScheme {
    pub fn new(prefers_dark: bool) -> Self {
        let (sender, _) = watch::channel(prefers_dark);
        Self { sender }
    }

    /// Report a new system preference; unchanged values are not re-broadcast
    pub fn set_prefers_dark(&self, prefers_dark: bool) {
        let changed = self.sender.send_if_modified(|current| {
            if *current == prefers_dark {
                false
            } else {
                *current = prefers_dark;
                true
            }
        });
        if changed {
            debug!(prefers_dark, "System color scheme changed");
        }
    }
}

impl ColorScheme for SystemColorScheme {
    fn prefers_dark(&self) -> bool {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}
