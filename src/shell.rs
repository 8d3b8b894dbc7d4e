use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ConsoleConfig;
use crate::host::{
    ColorScheme, Document, DocumentRoot, JsonFileStorage, LocalStorage, Location, LogNotifier,
    Navigator, Notifier, SystemColorScheme,
};
use crate::http::{ApiClient, HttpTransport, ReqwestTransport};
use crate::router::{NavigationDecision, Route, RouteGuard, SessionStatus};
use crate::session::SessionStore;
use crate::theme::ThemeStore;

/// Upper bound on guard and route redirects followed by one navigation
pub const MAX_REDIRECTS: usize = 8;

/// Host environment the shell runs in
#[derive(Clone)]
pub struct HostServices {
    pub storage: Arc<dyn LocalStorage>,
    pub document: Arc<dyn Document>,
    pub color_scheme: Arc<dyn ColorScheme>,
    pub location: Arc<Location>,
    pub notifier: Arc<dyn Notifier>,
}

/// Result of a completed navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// Path that was requested
    pub requested: String,
    /// Route finally shown
    pub route: Route,
    /// Intermediate redirect targets, in order
    pub redirects: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("navigation to {path} exceeded {MAX_REDIRECTS} redirects")]
    TooManyRedirects { path: String },
}

/// Composition root of the console
///
/// Builds the client before the session store so the first request the
/// store issues already sees the persisted token. A hard redirect is
/// handled by rebuilding both stores from persisted state.
pub struct ConsoleShell {
    host: HostServices,
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    theme: Arc<ThemeStore>,
    guard: RouteGuard,
    tasks: Vec<JoinHandle<()>>,
}

impl ConsoleShell {
    /// Wire the shell over an existing transport and host
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str, host: HostServices) -> Self {
        let navigator: Arc<dyn Navigator> = host.location.clone();
        let client = Arc::new(ApiClient::new(
            transport,
            base_url,
            Arc::clone(&host.storage),
            Arc::clone(&host.notifier),
            navigator,
        ));
        let (session, theme, guard) = Self::build_stores(&client, &host);

        Self {
            host,
            client,
            session,
            theme,
            guard,
            tasks: Vec::new(),
        }
    }

    /// Build the shell for a configuration with file storage and reqwest
    pub fn from_config(config: &ConsoleConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout()).context("Failed to build HTTP client")?;
        let host = HostServices {
            storage: Arc::new(JsonFileStorage::open(&config.storage_path)),
            document: Arc::new(DocumentRoot::new()),
            color_scheme: Arc::new(SystemColorScheme::new(config.prefers_dark)),
            location: Arc::new(Location::default()),
            notifier: Arc::new(LogNotifier),
        };
        Ok(Self::new(Arc::new(transport), &config.origin, host))
    }

    fn build_stores(
        client: &Arc<ApiClient>,
        host: &HostServices,
    ) -> (Arc<SessionStore>, Arc<ThemeStore>, RouteGuard) {
        let session = SessionStore::new(Arc::clone(client), Arc::clone(&host.storage));
        let theme = Arc::new(ThemeStore::new(
            Arc::clone(client),
            Arc::clone(&host.storage),
            Arc::clone(&host.document),
            Arc::clone(&host.color_scheme),
        ));
        let status: Arc<dyn SessionStatus> = session.clone();
        (session, theme, RouteGuard::new(status))
    }

    /// Start background work and pull the server-side theme
    pub async fn start(&mut self) {
        if let Some(handle) = self.session.bootstrap() {
            self.tasks.push(handle);
        }
        self.theme.spawn_system_listener();

        // The theme endpoint needs a session
        if self.session.is_logged_in() {
            self.theme.load_theme().await;
        }
        info!(
            phase = ?self.session.phase(),
            theme = %self.theme.theme(),
            "Console shell started"
        );
    }

    /// Navigate through the route guard, following redirects
    pub fn navigate(&self, path: &str) -> Result<NavigationOutcome, NavigationError> {
        let mut target = path.to_string();
        let mut redirects = Vec::new();

        while redirects.len() <= MAX_REDIRECTS {
            let (route, decision) = self.guard.before_each(&target);
            let next = match decision {
                NavigationDecision::Redirect(to) => to,
                NavigationDecision::Allow => match route.redirect {
                    Some(to) => to,
                    None => {
                        self.host.location.push(&route.path);
                        return Ok(NavigationOutcome {
                            requested: path.to_string(),
                            route,
                            redirects,
                        });
                    }
                },
            };
            debug!(from = %route.path, to = next, "Redirecting");
            redirects.push(next.to_string());
            target = next.to_string();
        }

        warn!(path, "Redirect loop detected");
        Err(NavigationError::TooManyRedirects {
            path: path.to_string(),
        })
    }

    /// Process a pending hard redirect
    ///
    /// Aborts work tied to the previous session, rebuilds the stores from
    /// persisted state, starts them again and lands on the redirect target.
    pub async fn reload_if_requested(&mut self) -> Option<NavigationOutcome> {
        let target = self.host.location.take_pending_reload()?;
        info!(target = %target, "Reloading console");

        for task in self.tasks.drain(..) {
            task.abort();
        }
        let (session, theme, guard) = Self::build_stores(&self.client, &self.host);
        self.session = session;
        self.theme = theme;
        self.guard = guard;

        self.start().await;
        match self.navigate(&target) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "Navigation after reload failed");
                None
            }
        }
    }

    /// Wait for background session work to finish
    pub async fn settle(&mut self) {
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Background task failed");
                }
            }
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn theme(&self) -> &Arc<ThemeStore> {
        &self.theme
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn location(&self) -> &Arc<Location> {
        &self.host.location
    }

    pub fn host(&self) -> &HostServices {
        &self.host
    }
}

impl Drop for ConsoleShell {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
