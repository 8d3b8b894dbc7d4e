//! Static route table and the navigation guard.

pub mod guard;
pub mod routes;

pub use guard::{decide, NavigationDecision, RouteGuard, SessionStatus};
pub use routes::{normalize_path, resolve, Route, RouteEntry, ROUTES};

/// Public login page; unauthenticated navigation lands here
pub const LOGIN_PATH: &str = "/login";
/// Default page after login
pub const LANDING_PATH: &str = "/dashboard";
