use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ErrorCategory;
use crate::events::{EventStream, Subscriber, EVENT_BUFFER_SIZE, EVENT_STREAM_CAPACITY};
use crate::host::{ColorScheme, Document, LocalStorage, DARK_CLASS, THEME_KEY};
use crate::http::{ApiClient, RequestOptions};
use crate::theme::preference::{Appearance, ThemePreference};
use crate::theme::THEME_ENDPOINT;

/// Body of the theme setting endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ThemeSetting {
    theme: String,
}

/// Events published by the theme store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeEvent {
    /// A preference was applied to the document and persisted locally
    Applied {
        preference: ThemePreference,
        appearance: Appearance,
    },

    /// The system scheme flipped while following it
    SystemFollowed { appearance: Appearance },
}

/// Owner of the display theme preference
///
/// Every change is applied to the document and persisted locally before
/// anything asynchronous happens. The server copy is best-effort only.
pub struct ThemeStore {
    client: Arc<ApiClient>,
    storage: Arc<dyn LocalStorage>,
    document: Arc<dyn Document>,
    color_scheme: Arc<dyn ColorScheme>,
    theme: Arc<RwLock<ThemePreference>>,
    events: EventStream<ThemeEvent>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ThemeStore {
    /// Create the store from the persisted preference and apply it
    pub fn new(
        client: Arc<ApiClient>,
        storage: Arc<dyn LocalStorage>,
        document: Arc<dyn Document>,
        color_scheme: Arc<dyn ColorScheme>,
    ) -> Self {
        let initial = match storage.get_item(THEME_KEY) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring persisted theme");
                ThemePreference::default()
            }),
            None => ThemePreference::default(),
        };

        let store = Self {
            client,
            storage,
            document,
            color_scheme,
            theme: Arc::new(RwLock::new(initial)),
            events: EventStream::new(EVENT_STREAM_CAPACITY, EVENT_BUFFER_SIZE),
            listener: Mutex::new(None),
        };
        store.apply_theme(initial);
        store
    }

    /// Current preference
    pub fn theme(&self) -> ThemePreference {
        *self.theme.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appearance currently shown on the document
    pub fn appearance(&self) -> Appearance {
        if self.document.has_class(DARK_CLASS) {
            Appearance::Dark
        } else {
            Appearance::Light
        }
    }

    /// Project a preference onto the document and persist it locally
    ///
    /// `auto` is resolved against the system scheme at call time; the raw
    /// preference, not the resolved appearance, is what gets persisted.
    pub fn apply_theme(&self, value: ThemePreference) {
        let appearance = value.resolve(self.color_scheme.prefers_dark());
        self.document.set_class(DARK_CLASS, appearance.is_dark());

        if let Err(e) = self.storage.set_item(THEME_KEY, value.as_str()) {
            warn!(error = %e, "Failed to persist theme locally");
        }

        debug!(preference = %value, ?appearance, "Theme applied");
        self.events.publish(ThemeEvent::Applied {
            preference: value,
            appearance,
        });
    }

    /// Store and project a preference under the preference lock
    fn set_value(&self, value: ThemePreference) {
        let mut theme = self.theme.write().unwrap_or_else(PoisonError::into_inner);
        *theme = value;
        self.apply_theme(value);
    }

    /// Project the stored preference again
    fn reapply(&self) {
        let theme = self.theme.read().unwrap_or_else(PoisonError::into_inner);
        self.apply_theme(*theme);
    }

    /// Adopt the server's preference, keeping the local one on any failure
    pub async fn load_theme(&self) {
        let result = self
            .client
            .get_json_with::<ThemeSetting>(THEME_ENDPOINT, RequestOptions::QUIET)
            .await;

        match result.map(|setting| setting.theme.parse::<ThemePreference>()) {
            Ok(Ok(theme)) => {
                info!(theme = %theme, "Loaded theme from server");
                self.set_value(theme);
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Server sent an unknown theme, keeping local value");
                self.reapply();
            }
            Err(e) => {
                debug!(error = %e, "Theme load failed, keeping local value");
                self.reapply();
            }
        }
    }

    /// Change the preference locally, then save it to the server
    ///
    /// The local change is never rolled back if the save fails.
    pub async fn set_theme(&self, value: ThemePreference) {
        self.set_value(value);

        let body = ThemeSetting {
            theme: value.to_string(),
        };
        if let Err(e) = self
            .client
            .put_json_with(THEME_ENDPOINT, &body, RequestOptions::QUIET)
            .await
        {
            warn!(
                error = %e,
                category = %ErrorCategory::PersistenceBestEffort,
                "Failed to save theme setting"
            );
        }
    }

    /// Advance to the next preference in `light → dark → auto`
    pub async fn toggle_theme(&self) -> ThemePreference {
        let next = self.theme().next();
        self.set_theme(next).await;
        next
    }

    /// Follow system scheme flips while the preference is `auto`
    ///
    /// Registered at most once per store; returns false if already running.
    /// Only the document is touched, the stored preference stays as is.
    /// Must be called from within a tokio runtime.
    pub fn spawn_system_listener(&self) -> bool {
        let mut listener = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if listener.is_some() {
            return false;
        }

        let mut changes = self.color_scheme.subscribe();
        let theme = Arc::clone(&self.theme);
        let document = Arc::clone(&self.document);
        let events = self.events.clone();

        *listener = Some(tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let prefers_dark = *changes.borrow_and_update();
                let followed = {
                    // Preference lock stays held across the document write
                    let current = theme.read().unwrap_or_else(PoisonError::into_inner);
                    if *current == ThemePreference::Auto {
                        let appearance = current.resolve(prefers_dark);
                        document.set_class(DARK_CLASS, appearance.is_dark());
                        Some(appearance)
                    } else {
                        None
                    }
                };

                if let Some(appearance) = followed {
                    debug!(?appearance, "Following system color scheme");
                    events.publish(ThemeEvent::SystemFollowed { appearance });
                }
            }
        }));
        true
    }

    /// Observe theme changes
    pub fn subscribe(&self) -> Subscriber<ThemeEvent> {
        self.events.subscribe()
    }
}

impl Drop for ThemeStore {
    fn drop(&mut self) {
        if let Some(handle) = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
