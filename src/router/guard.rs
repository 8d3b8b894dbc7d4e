use std::sync::Arc;

use tracing::debug;

use super::routes::{resolve, Route};
use super::{LANDING_PATH, LOGIN_PATH};

/// Outcome of a navigation check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Proceed to the requested route unchanged
    Allow,
    /// Go to this path instead
    Redirect(&'static str),
}

/// Read access to whether a session is active
///
/// Implementations must answer from memory; the guard never waits.
pub trait SessionStatus: Send + Sync {
    fn is_logged_in(&self) -> bool;
}

impl SessionStatus for bool {
    fn is_logged_in(&self) -> bool {
        *self
    }
}

/// Decide whether navigation to `target` may proceed
pub fn decide(target: &Route, session: &dyn SessionStatus) -> NavigationDecision {
    let logged_in = session.is_logged_in();
    if target.requires_auth && !logged_in {
        NavigationDecision::Redirect(LOGIN_PATH)
    } else if target.is_login() && logged_in {
        NavigationDecision::Redirect(LANDING_PATH)
    } else {
        NavigationDecision::Allow
    }
}

/// Guard evaluated before every navigation
pub struct RouteGuard {
    session: Arc<dyn SessionStatus>,
}

impl RouteGuard {
    pub fn new(session: Arc<dyn SessionStatus>) -> Self {
        Self { session }
    }

    /// Resolve `path` and check it against the current session
    pub fn before_each(&self, path: &str) -> (Route, NavigationDecision) {
        let route = resolve(path);
        let decision = decide(&route, self.session.as_ref());
        debug!(path = %route.path, ?decision, "Route guard evaluated");
        (route, decision)
    }
}
