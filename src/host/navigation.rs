use std::sync::{PoisonError, RwLock};

use tracing::{debug, info};

/// Navigation surface of the host
pub trait Navigator: Send + Sync {
    /// In-app route change; in-memory state survives
    fn push(&self, path: &str);

    /// Full reload to `path`; all in-memory state is discarded
    fn hard_redirect(&self, path: &str);
}

#[derive(Debug, Default)]
struct LocationState {
    current: String,
    pending_reload: Option<String>,
    reloads: u64,
}

/// Location of the running console
///
/// A hard redirect is recorded as a pending reload; the shell picks it up
/// and rebuilds itself from persisted state.
#[derive(Debug)]
pub struct Location {
    state: RwLock<LocationState>,
}

impl Location {
    pub fn new(initial: &str) -> Self {
        Self {
            state: RwLock::new(LocationState {
                current: initial.to_string(),
                ..LocationState::default()
            }),
        }
    }

    /// Current path
    pub fn current(&self) -> String {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    /// Target of a hard redirect that has not been processed yet
    pub fn pending_reload(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .pending_reload
            .clone()
    }

    /// Take the pending reload target, marking it processed
    pub fn take_pending_reload(&self) -> Option<String> {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .pending_reload
            .take()
    }

    /// Number of hard redirects requested since start
    pub fn reload_count(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .reloads
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for Location {
    fn push(&self, path: &str) {
        debug!(path, "Navigating");
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .current = path.to_string();
    }

    fn hard_redirect(&self, path: &str) {
        info!(path, "Hard redirect requested");
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.current = path.to_string();
        state.pending_reload = Some(path.to_string());
        state.reloads += 1;
    }
}
