pub mod preference;
pub mod store;

pub use preference::{Appearance, ParseThemeError, ThemePreference};
pub use store::{ThemeEvent, ThemeStore};

/// Server-side theme setting endpoint
pub const THEME_ENDPOINT: &str = "/api/settings/theme";
