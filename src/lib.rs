//! Client shell of the gateway admin console.
//!
//! Every backend call goes through [`http::ApiClient`], which attaches the
//! persisted bearer token and turns a 401 into a hard redirect to the login
//! page. [`session::SessionStore`] owns the token and the current profile,
//! [`theme::ThemeStore`] keeps the light/dark/auto preference in sync between
//! local storage and the server, and [`router::RouteGuard`] gates navigation
//! on the session. [`shell::ConsoleShell`] wires them together.

// Export modules
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod http;
pub mod router;
pub mod session;
pub mod shell;
pub mod theme;

pub use config::ConsoleConfig;
pub use error::{ApiError, ApiResult, ErrorCategory, SessionError, StorageError};
pub use http::{ApiClient, RequestOptions};
pub use router::{NavigationDecision, Route, RouteGuard};
pub use session::{SessionPhase, SessionStore, UserProfile};
pub use shell::{ConsoleShell, HostServices, NavigationError, NavigationOutcome};
pub use theme::{Appearance, ThemePreference, ThemeStore};

/// Crate version reported by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
