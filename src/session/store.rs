use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard, Weak};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::events::{EventStream, Subscriber, EVENT_BUFFER_SIZE, EVENT_STREAM_CAPACITY};
use crate::host::{LocalStorage, TOKEN_KEY};
use crate::http::{ApiClient, UnauthorizedObserver};
use crate::router::SessionStatus;
use crate::session::profile::{
    LoginRequest, SessionEvent, SessionPhase, SessionSnapshot, TokenResponse, UserProfile,
};
use crate::session::{LOGIN_ENDPOINT, ME_ENDPOINT};

#[derive(Debug)]
struct SessionState {
    token: String,
    user: Option<UserProfile>,
    phase: SessionPhase,
    since: DateTime<Utc>,
}

/// Owner of the access token and the current user's profile
///
/// The token is read from persisted storage when the store is created.
/// `is_logged_in` is true exactly when a non-empty token is held; the
/// profile is only trustworthy in the `LoggedIn` phase. A 401 on any
/// request made with the held token logs the store out immediately.
pub struct SessionStore {
    pub(crate) client: Arc<ApiClient>,
    storage: Arc<dyn LocalStorage>,
    state: RwLock<SessionState>,
    events: EventStream<SessionEvent>,
}

impl SessionStore {
    /// Create a store from the persisted token and subscribe it to rejections
    pub fn new(client: Arc<ApiClient>, storage: Arc<dyn LocalStorage>) -> Arc<Self> {
        let token = storage.get_item(TOKEN_KEY).unwrap_or_default();
        let phase = if token.is_empty() {
            SessionPhase::LoggedOut
        } else {
            SessionPhase::LoggedInUnverified
        };
        debug!(?phase, "Session store created");

        let store = Arc::new(Self {
            client,
            storage,
            state: RwLock::new(SessionState {
                token,
                user: None,
                phase,
                since: Utc::now(),
            }),
            events: EventStream::new(EVENT_STREAM_CAPACITY, EVENT_BUFFER_SIZE),
        });
        let observer: Weak<dyn UnauthorizedObserver> = Arc::<Self>::downgrade(&store);
        store.client.observe_unauthorized(observer);
        store
    }

    /// Verify a restored token in the background
    ///
    /// The store is usable right away with the unverified session and
    /// corrects itself once the profile fetch resolves.
    pub fn bootstrap(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.token().is_empty() {
            return None;
        }
        info!("Restored session token, verifying in background");
        let store = Arc::clone(self);
        Some(tokio::spawn(async move {
            store.fetch_user().await;
        }))
    }

    /// Exchange credentials for a token, then load the profile
    ///
    /// Resolves only after the profile fetch has finished; a failed fetch
    /// leaves the session logged out and is not reported as an error here.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionPhase, SessionError> {
        // A new exchange always starts from a clean session
        if self.is_logged_in() {
            info!("Dropping current session before logging in again");
            self.logout();
        }
        self.set_phase(SessionPhase::LoggingIn);
        info!(username, "Logging in");

        let request = LoginRequest { username, password };
        let response: TokenResponse = match self.client.post_json(LOGIN_ENDPOINT, &request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(username, error = %e, "Login rejected");
                self.resync_from_storage();
                return Err(SessionError::Credential(e));
            }
        };

        if response.access_token.is_empty() {
            warn!(username, "Login response carried no token");
            self.resync_from_storage();
            return Err(SessionError::MissingToken);
        }

        // Persist before the profile fetch so the client sends the new token
        if let Err(e) = self.storage.set_item(TOKEN_KEY, &response.access_token) {
            warn!(error = %e, "Failed to persist token");
            self.logout();
            return Err(e.into());
        }
        {
            let mut state = self.write_state();
            state.token = response.access_token;
            state.user = None;
        }
        self.set_phase(SessionPhase::LoggedInUnverified);

        self.fetch_user().await;
        Ok(self.phase())
    }

    /// Load the current user's profile
    ///
    /// Does nothing without a token. Any failure is treated as an invalid
    /// session and logs out; the fetch is never retried.
    pub async fn fetch_user(&self) {
        let token = self.token();
        if token.is_empty() {
            return;
        }

        match self.client.get_json::<UserProfile>(ME_ENDPOINT).await {
            Ok(profile) => {
                let username = profile.username.clone();
                {
                    let mut state = self.write_state();
                    if state.token != token {
                        // The session changed while the fetch was in flight
                        debug!("Discarding profile for a replaced session");
                        return;
                    }
                    state.user = Some(profile);
                }
                self.set_phase(SessionPhase::LoggedIn);
                self.events.publish(SessionEvent::ProfileUpdated { username: username.clone() });
                info!(username = %username, "Session verified");
            }
            Err(e) => {
                warn!(error = %e, "Profile fetch failed, logging out");
                if self.token() == token {
                    self.logout();
                }
            }
        }
    }

    /// Clear token and profile from memory and storage; idempotent
    pub fn logout(&self) {
        {
            let mut state = self.write_state();
            state.token.clear();
            state.user = None;
        }
        if let Err(e) = self.storage.remove_item(TOKEN_KEY) {
            warn!(error = %e, "Failed to remove persisted token");
        }
        self.set_phase(SessionPhase::LoggedOut);
    }

    /// Current token; empty when logged out
    pub fn token(&self) -> String {
        self.read_state(|s| s.token.clone())
    }

    /// Cached profile of the current user
    pub fn user(&self) -> Option<UserProfile> {
        self.read_state(|s| s.user.clone())
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.read_state(|s| s.phase)
    }

    /// Consistent view of the whole session
    pub fn snapshot(&self) -> SessionSnapshot {
        self.read_state(|s| SessionSnapshot {
            phase: s.phase,
            is_logged_in: !s.token.is_empty(),
            user: s.user.clone(),
            since: s.since,
        })
    }

    /// Observe session changes
    pub fn subscribe(&self) -> Subscriber<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn update_user(&self, update: impl FnOnce(&mut UserProfile)) {
        let username = {
            let mut state = self.write_state();
            match state.user.as_mut() {
                Some(user) => {
                    update(user);
                    user.username.clone()
                }
                None => return,
            }
        };
        self.events.publish(SessionEvent::ProfileUpdated { username });
    }

    /// Re-read the token after a failed exchange
    ///
    /// A rejected login may have cleared the persisted token through the
    /// client's 401 handling.
    fn resync_from_storage(&self) {
        let persisted = self.storage.get_item(TOKEN_KEY).unwrap_or_default();
        let phase = {
            let mut state = self.write_state();
            if persisted != state.token {
                state.token = persisted;
                state.user = None;
            }
            match (&state.user, state.token.is_empty()) {
                (_, true) => SessionPhase::LoggedOut,
                (Some(_), false) => SessionPhase::LoggedIn,
                (None, false) => SessionPhase::LoggedInUnverified,
            }
        };
        self.set_phase(phase);
    }

    fn set_phase(&self, to: SessionPhase) {
        let from = {
            let mut state = self.write_state();
            let from = state.phase;
            if from == to {
                return;
            }
            state.phase = to;
            state.since = Utc::now();
            from
        };
        debug!(?from, ?to, "Session phase changed");
        self.events.publish(SessionEvent::PhaseChanged { from, to });
    }

    fn read_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStatus for SessionStore {
    fn is_logged_in(&self) -> bool {
        self.read_state(|s| !s.token.is_empty())
    }
}

impl UnauthorizedObserver for SessionStore {
    fn on_unauthorized(&self, rejected_token: Option<&str>) {
        let current = self.token();
        if current.is_empty() || rejected_token != Some(current.as_str()) {
            debug!("Rejected credential is not the current one");
            return;
        }
        warn!("Credential rejected by the server, logging out");
        self.logout();
    }
}
