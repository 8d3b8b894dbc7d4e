//! Login, profile verification and logout against a real HTTP server

use mockito::Matcher;
use serde_json::json;

use console_shell_lib::host::{LocalStorage, TOKEN_KEY};
use console_shell_lib::router::SessionStatus;
use console_shell_lib::{SessionError, SessionPhase};

use super::test_harness::{eventually, TestConsole, PROFILE_JSON};

#[tokio::test]
async fn test_login_persists_token_and_loads_profile() {
    let mut console = TestConsole::new(&[]).await;
    let login = console
        .server
        .mock("POST", "/api/auth/login")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({"username": "admin", "password": "secret"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "fresh-token", "token_type": "bearer"}"#)
        .expect(1)
        .create_async()
        .await;
    let me = console
        .server
        .mock("GET", "/api/auth/me")
        .match_header("authorization", "Bearer fresh-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PROFILE_JSON)
        .expect(1)
        .create_async()
        .await;

    let session = console.shell.session().clone();
    let phase = session.login("admin", "secret").await.unwrap();

    login.assert_async().await;
    me.assert_async().await;
    assert_eq!(phase, SessionPhase::LoggedIn);
    assert!(session.is_logged_in());
    assert_eq!(session.user().unwrap().username, "admin");
    assert_eq!(console.storage.get_item(TOKEN_KEY).as_deref(), Some("fresh-token"));
}

#[tokio::test]
async fn test_rejected_login_is_a_credential_error() {
    let mut console = TestConsole::new(&[]).await;
    console
        .server
        .mock("POST", "/api/auth/login")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Incorrect username or password"}"#)
        .create_async()
        .await;

    let session = console.shell.session().clone();
    let err = session.login("admin", "wrong").await.unwrap_err();

    assert!(matches!(err, SessionError::Credential(_)));
    assert_eq!(err.to_string(), "login rejected: Incorrect username or password");
    assert_eq!(session.phase(), SessionPhase::LoggedOut);
    assert!(!session.is_logged_in());
    assert_eq!(
        console.notifications(),
        vec!["Incorrect username or password".to_string()]
    );
}

#[tokio::test]
async fn test_restored_token_is_verified_in_background() {
    let mut console = TestConsole::new(&[(TOKEN_KEY, "kept")]).await;
    console
        .server
        .mock("GET", "/api/auth/me")
        .match_header("authorization", "Bearer kept")
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

    // Usable before the profile arrives
    assert!(console.shell.session().is_logged_in());

    console.shell.start().await;
    console.shell.settle().await;

    let session = console.shell.session();
    assert_eq!(session.phase(), SessionPhase::LoggedIn);
    assert_eq!(session.user().unwrap().api_key, "sk-gateway-1");
}

#[tokio::test]
async fn test_expired_token_at_startup_logs_out() {
    let mut console = TestConsole::new(&[(TOKEN_KEY, "expired")]).await;
    console
        .server
        .mock("GET", "/api/auth/me")
        .with_status(401)
        .with_body(r#"{"detail": "Token expired"}"#)
        .create_async()
        .await;
    console
        .server
        .mock("GET", "/api/settings/theme")
        .with_status(401)
        .create_async()
        .await;

    console.shell.start().await;
    console.shell.settle().await;

    let session = console.shell.session().clone();
    assert!(eventually(|| !session.is_logged_in()).await);
    assert_eq!(console.storage.get_item(TOKEN_KEY), None);
    assert!(console.location.pending_reload().is_some());
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let console = TestConsole::new(&[(TOKEN_KEY, "tok")]).await;
    let session = console.shell.session();

    session.logout();
    session.logout();

    assert_eq!(session.phase(), SessionPhase::LoggedOut);
    assert!(session.user().is_none());
    assert_eq!(console.storage.get_item(TOKEN_KEY), None);
}
