//! Account operations for the signed-in user.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SessionError;
use crate::router::SessionStatus;
use crate::session::store::SessionStore;

pub const CHANGE_PASSWORD_ENDPOINT: &str = "/api/auth/change-password";
pub const CHANGE_USERNAME_ENDPOINT: &str = "/api/auth/change-username";
pub const REGENERATE_API_KEY_ENDPOINT: &str = "/api/auth/regenerate-api-key";

#[derive(Serialize)]
struct ChangePasswordRequest<'a> {
    old_password: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct ChangeUsernameRequest<'a> {
    new_username: &'a str,
}

/// Generic `{message}` acknowledgement
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
struct ApiKeyResponse {
    api_key: String,
}

impl SessionStore {
    fn require_session(&self) -> Result<(), SessionError> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(SessionError::NotLoggedIn)
        }
    }

    /// Change the current user's password
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<Acknowledgement, SessionError> {
        self.require_session()?;
        let request = ChangePasswordRequest {
            old_password,
            new_password,
        };
        let ack = self.client.post_json(CHANGE_PASSWORD_ENDPOINT, &request).await?;
        info!("Password changed");
        Ok(ack)
    }

    /// Rename the current user, then reload the profile
    pub async fn change_username(&self, new_username: &str) -> Result<Acknowledgement, SessionError> {
        self.require_session()?;
        let request = ChangeUsernameRequest { new_username };
        let ack = self.client.post_json(CHANGE_USERNAME_ENDPOINT, &request).await?;
        info!(new_username, "Username changed");
        self.fetch_user().await;
        Ok(ack)
    }

    /// Issue a new gateway API key and cache it on the profile
    pub async fn regenerate_api_key(&self) -> Result<String, SessionError> {
        self.require_session()?;
        let response: ApiKeyResponse = self
            .client
            .post_json(REGENERATE_API_KEY_ENDPOINT, &serde_json::json!({}))
            .await?;
        let api_key = response.api_key;
        self.update_user(|user| user.api_key = api_key.clone());
        info!("API key regenerated");
        Ok(api_key)
    }
}
