//! Theme preference sync between local storage, the document and the server

use mockito::Matcher;
use serde_json::json;

use console_shell_lib::host::{Document, LocalStorage, DARK_CLASS, THEME_KEY, TOKEN_KEY};
use console_shell_lib::ThemePreference;

use super::test_harness::{eventually, TestConsole, PROFILE_JSON};

async fn mock_profile(console: &mut TestConsole) {
    console
        .server
        .mock("GET", "/api/auth/me")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PROFILE_JSON)
        .create_async()
        .await;
}

#[tokio::test]
async fn test_server_theme_is_adopted_on_start() {
    let mut console = TestConsole::new(&[(TOKEN_KEY, "tok"), (THEME_KEY, "light")]).await;
    mock_profile(&mut console).await;
    let theme = console
        .server
        .mock("GET", "/api/settings/theme")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"theme": "dark"}"#)
        .expect(1)
        .create_async()
        .await;

    console.shell.start().await;

    theme.assert_async().await;
    assert_eq!(console.shell.theme().theme(), ThemePreference::Dark);
    assert!(console.document.has_class(DARK_CLASS));
    assert_eq!(console.storage.get_item(THEME_KEY).as_deref(), Some("dark"));
}

#[tokio::test]
async fn test_theme_not_loaded_without_session() {
    let mut console = TestConsole::new(&[(THEME_KEY, "dark")]).await;
    let theme = console
        .server
        .mock("GET", "/api/settings/theme")
        .expect(0)
        .create_async()
        .await;

    console.shell.start().await;

    theme.assert_async().await;
    assert_eq!(console.shell.theme().theme(), ThemePreference::Dark);
    assert!(console.document.has_class(DARK_CLASS));
}

#[tokio::test]
async fn test_unknown_server_theme_keeps_local_value() {
    let mut console = TestConsole::new(&[(TOKEN_KEY, "tok"), (THEME_KEY, "auto")]).await;
    mock_profile(&mut console).await;
    console
        .server
        .mock("GET", "/api/settings/theme")
        .with_status(200)
        .with_body(r#"{"theme": "sepia"}"#)
        .create_async()
        .await;

    console.shell.start().await;

    assert_eq!(console.shell.theme().theme(), ThemePreference::Auto);
    assert_eq!(console.storage.get_item(THEME_KEY).as_deref(), Some("auto"));
    assert!(console.notifications().is_empty());
}

#[tokio::test]
async fn test_failed_save_keeps_local_change_silently() {
    let mut console = TestConsole::new(&[(TOKEN_KEY, "tok")]).await;
    let save = console
        .server
        .mock("PUT", "/api/settings/theme")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"theme": "dark"})))
        .with_status(500)
        .with_body("boom")
        .expect(1)
        .create_async()
        .await;

    let theme = console.shell.theme().clone();
    theme.set_theme(ThemePreference::Dark).await;

    save.assert_async().await;
    assert_eq!(theme.theme(), ThemePreference::Dark);
    assert!(console.document.has_class(DARK_CLASS));
    assert_eq!(console.storage.get_item(THEME_KEY).as_deref(), Some("dark"));
    assert!(console.notifications().is_empty());
    assert_eq!(console.storage.get_item(TOKEN_KEY).as_deref(), Some("tok"));
}

#[tokio::test]
async fn test_toggle_cycles_and_saves_each_step() {
    let mut console = TestConsole::new(&[(TOKEN_KEY, "tok")]).await;
    let save = console
        .server
        .mock("PUT", "/api/settings/theme")
        .with_status(200)
        .with_body("{}")
        .expect(3)
        .create_async()
        .await;

    let theme = console.shell.theme().clone();
    assert_eq!(theme.toggle_theme().await, ThemePreference::Dark);
    assert_eq!(theme.toggle_theme().await, ThemePreference::Auto);
    assert_eq!(theme.toggle_theme().await, ThemePreference::Light);

    save.assert_async().await;
    assert!(!console.document.has_class(DARK_CLASS));
}

#[tokio::test]
async fn test_auto_follows_system_scheme_without_touching_storage() {
    let mut console = TestConsole::new(&[(THEME_KEY, "auto")]).await;
    console.shell.start().await;
    assert!(!console.document.has_class(DARK_CLASS));

    console.color_scheme.set_prefers_dark(true);

    let document = console.document.clone();
    assert!(eventually(|| document.has_class(DARK_CLASS)).await);
    assert_eq!(console.storage.get_item(THEME_KEY).as_deref(), Some("auto"));
    assert_eq!(console.shell.theme().theme(), ThemePreference::Auto);
}
