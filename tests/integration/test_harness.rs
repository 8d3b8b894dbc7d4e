//! Shared fixtures for the integration tests
//! Builds a console shell wired to a mockito server over the reqwest transport

use std::sync::Arc;
use std::time::Duration;

use mockito::ServerGuard;

use console_shell_lib::host::{
    DocumentRoot, Location, MemoryNotifier, MemoryStorage, SystemColorScheme,
};
use console_shell_lib::http::ReqwestTransport;
use console_shell_lib::{ConsoleShell, HostServices};

pub const PROFILE_JSON: &str =
    r#"{"id": 1, "username": "admin", "api_key": "sk-gateway-1", "is_admin": true}"#;

/// Handles to the in-memory host behind a test shell
pub struct TestConsole {
    pub server: ServerGuard,
    pub storage: Arc<MemoryStorage>,
    pub document: Arc<DocumentRoot>,
    pub color_scheme: Arc<SystemColorScheme>,
    pub location: Arc<Location>,
    pub notifier: Arc<MemoryNotifier>,
    pub shell: ConsoleShell,
}

impl TestConsole {
    /// Start a mock server and build a shell over the given persisted keys
    pub async fn new(items: &[(&str, &str)]) -> Self {
        let server = mockito::Server::new_async().await;
        let storage = Arc::new(MemoryStorage::with_items(items.iter().copied()));
        let document = Arc::new(DocumentRoot::new());
        let color_scheme = Arc::new(SystemColorScheme::new(false));
        let location = Arc::new(Location::default());
        let notifier = Arc::new(MemoryNotifier::new());

        let host = HostServices {
            storage: storage.clone(),
            document: document.clone(),
            color_scheme: color_scheme.clone(),
            location: location.clone(),
            notifier: notifier.clone(),
        };
        let transport = ReqwestTransport::new(Duration::from_secs(5))
            .expect("reqwest client should build");
        let shell = ConsoleShell::new(Arc::new(transport), &server.url(), host);

        Self {
            server,
            storage,
            document,
            color_scheme,
            location,
            notifier,
            shell,
        }
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifier.messages()
    }
}

/// Wait until `check` passes or the timeout expires
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..50 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
