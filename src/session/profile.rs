use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile of the authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Server-side user id
    pub id: i64,

    /// Login name
    pub username: String,

    /// Key used for the gateway's OpenAI-compatible endpoints
    #[serde(default)]
    pub api_key: String,

    /// Whether the user may manage providers, models and settings
    #[serde(default)]
    pub is_admin: bool,
}

/// Body of the credential exchange
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Answer of a successful credential exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer credential
    #[serde(default)]
    pub access_token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Lifecycle phase of the console session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No token
    LoggedOut,

    /// Credential exchange in flight
    LoggingIn,

    /// Token present, profile not confirmed yet
    LoggedInUnverified,

    /// Token present and profile fetched
    LoggedIn,
}

/// Point-in-time view of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub is_logged_in: bool,
    pub user: Option<UserProfile>,
    /// When the current phase was entered
    pub since: DateTime<Utc>,
}

/// Events published by the session store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Phase changed
    PhaseChanged {
        from: SessionPhase,
        to: SessionPhase,
    },

    /// The cached profile was replaced
    ProfileUpdated { username: String },
}
