//! Seams between the console core and its host environment.
//!
//! The stores never touch the outside world directly: persisted keys, the
//! document root, the system color scheme, navigation and user notifications
//! all go through the traits defined here.

pub mod color_scheme;
pub mod document;
pub mod navigation;
pub mod notify;
pub mod storage;

pub use color_scheme::{ColorScheme, SystemColorScheme};
pub use document::{Document, DocumentRoot, DARK_CLASS};
pub use navigation::{Location, Navigator};
pub use notify::{LogNotifier, MemoryNotifier, Notifier};
pub use storage::{JsonFileStorage, LocalStorage, MemoryStorage, THEME_KEY, TOKEN_KEY};
