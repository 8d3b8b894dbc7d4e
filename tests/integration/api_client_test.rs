//! Request interception against a real HTTP server

use mockito::Matcher;
use serde_json::{json, Value};

use console_shell_lib::host::{LocalStorage, TOKEN_KEY};
use console_shell_lib::http::HttpMethod;
use console_shell_lib::router::LOGIN_PATH;

use super::test_harness::TestConsole;

#[tokio::test]
async fn test_bearer_token_reaches_server() {
    let mut console = TestConsole::new(&[(TOKEN_KEY, "tok-42")]).await;
    let mock = console
        .server
        .mock("GET", "/api/providers")
        .match_header("authorization", "Bearer tok-42")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"name": "openai"}]"#)
        .expect(1)
        .create_async()
        .await;

    let providers: Value = console.shell.client().get_json("/api/providers").await.unwrap();

    assert_eq!(providers, json!([{"name": "openai"}]));
    mock.assert_async().await;
    assert!(console.notifications().is_empty());
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let mut console = TestConsole::new(&[]).await;
    let mock = console
        .server
        .mock("GET", "/api/about")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    console
        .shell
        .client()
        .request(HttpMethod::GET, "/api/about", None)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_response_clears_token_and_reloads_to_login() {
    let mut console = TestConsole::new(&[(TOKEN_KEY, "stale")]).await;
    console
        .server
        .mock("GET", "/api/logs")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Could not validate credentials"}"#)
        .create_async()
        .await;

    let err = console
        .shell
        .client()
        .request(HttpMethod::GET, "/api/logs", None)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(401));
    assert_eq!(console.storage.get_item(TOKEN_KEY), None);
    assert_eq!(console.location.reload_count(), 1);
    assert_eq!(console.location.pending_reload().as_deref(), Some(LOGIN_PATH));
    assert_eq!(
        console.notifications(),
        vec!["Could not validate credentials".to_string()]
    );
}

#[tokio::test]
async fn test_server_error_without_detail_uses_status_message() {
    let mut console = TestConsole::new(&[(TOKEN_KEY, "tok")]).await;
    console
        .server
        .mock("POST", "/api/models")
        .match_body(Matcher::Json(json!({"name": "gpt"})))
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let err = console
        .shell
        .client()
        .request(HttpMethod::POST, "/api/models", Some(json!({"name": "gpt"})))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(503));
    assert_eq!(
        console.notifications(),
        vec!["Request failed with status code 503".to_string()]
    );
    assert_eq!(console.storage.get_item(TOKEN_KEY).as_deref(), Some("tok"));
    assert_eq!(console.location.reload_count(), 0);
}
