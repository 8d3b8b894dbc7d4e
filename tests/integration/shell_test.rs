//! Navigation and hard reload handling of the console shell

use std::sync::Arc;

use console_shell_lib::host::{LocalStorage, Navigator, TOKEN_KEY};
use console_shell_lib::http::HttpMethod;
use console_shell_lib::router::{SessionStatus, LANDING_PATH, LOGIN_PATH};
use console_shell_lib::SessionPhase;

use super::test_harness::{TestConsole, PROFILE_JSON};

#[tokio::test]
async fn test_protected_routes_redirect_to_login_without_session() {
    let console = TestConsole::new(&[]).await;

    for path in ["/", "/dashboard", "/settings", "/logs?page=2"] {
        let outcome = console.shell.navigate(path).unwrap();
        assert_eq!(outcome.route.path, LOGIN_PATH, "path {path}");
    }

    let outcome = console.shell.navigate("/login").unwrap();
    assert!(outcome.redirects.is_empty());
    assert_eq!(console.location.current(), LOGIN_PATH);
}

#[tokio::test]
async fn test_login_page_redirects_to_dashboard_with_session() {
    let console = TestConsole::new(&[(TOKEN_KEY, "tok")]).await;

    let outcome = console.shell.navigate("/login").unwrap();
    assert_eq!(outcome.route.path, LANDING_PATH);
    assert_eq!(outcome.redirects, vec![LANDING_PATH.to_string()]);
    assert_eq!(console.location.current(), LANDING_PATH);
}

#[tokio::test]
async fn test_unauthorized_reload_rebuilds_logged_out_shell() {
    let mut console = TestConsole::new(&[(TOKEN_KEY, "tok")]).await;
    console
        .server
        .mock("GET", "/api/auth/me")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PROFILE_JSON)
        .create_async()
        .await;
    console
        .server
        .mock("GET", "/api/settings/theme")
        .with_status(200)
        .with_body(r#"{"theme": "light"}"#)
        .create_async()
        .await;
    console
        .server
        .mock("GET", "/api/logs")
        .with_status(401)
        .with_body(r#"{"detail": "Session revoked"}"#)
        .create_async()
        .await;

    console.shell.start().await;
    console.shell.settle().await;
    assert_eq!(console.shell.session().phase(), SessionPhase::LoggedIn);
    console.shell.navigate("/logs").unwrap();

    let _ = console
        .shell
        .client()
        .request(HttpMethod::GET, "/api/logs", None)
        .await;
    assert_eq!(console.location.pending_reload().as_deref(), Some(LOGIN_PATH));

    // Protected pages close as soon as the 401 arrives
    assert!(!console.shell.session().is_logged_in());
    let outcome = console.shell.navigate("/dashboard").unwrap();
    assert_eq!(outcome.route.path, LOGIN_PATH);

    let outcome = console.shell.reload_if_requested().await.unwrap();
    assert_eq!(outcome.route.path, LOGIN_PATH);
    assert_eq!(console.location.current(), LOGIN_PATH);
    assert_eq!(console.location.pending_reload(), None);

    let session = console.shell.session();
    assert!(!session.is_logged_in());
    assert_eq!(session.phase(), SessionPhase::LoggedOut);
    assert!(session.user().is_none());
    assert_eq!(console.storage.get_item(TOKEN_KEY), None);

    // Nothing left to process
    assert!(console.shell.reload_if_requested().await.is_none());
}

#[tokio::test]
async fn test_stale_store_handles_are_replaced_on_reload() {
    let mut console = TestConsole::new(&[(TOKEN_KEY, "tok")]).await;
    let before = console.shell.session().clone();

    console.storage.remove_item(TOKEN_KEY).unwrap();
    console.location.hard_redirect(LOGIN_PATH);
    console.shell.reload_if_requested().await.unwrap();

    assert!(!Arc::ptr_eq(&before, console.shell.session()));
    assert!(!console.shell.session().is_logged_in());
}
