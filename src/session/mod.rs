pub mod account;
pub mod profile;
pub mod store;

pub use profile::{LoginRequest, SessionEvent, SessionPhase, SessionSnapshot, TokenResponse, UserProfile};
pub use store::SessionStore;

/// Credential exchange endpoint
pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
/// Current user endpoint
pub const ME_ENDPOINT: &str = "/api/auth/me";
