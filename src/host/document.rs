use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

/// Class toggled on the document root for the dark appearance
pub const DARK_CLASS: &str = "dark";

/// The root element the appearance is projected onto
pub trait Document: Send + Sync {
    /// Add or remove a class on the root element
    fn set_class(&self, name: &str, enabled: bool);

    /// Whether the root element currently carries a class
    fn has_class(&self, name: &str) -> bool;
}

/// In-process document root keeping its class list
#[derive(Debug, Default)]
pub struct DocumentRoot {
    classes: RwLock<BTreeSet<String>>,
}

impl DocumentRoot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Document for DocumentRoot {
    fn set_class(&self, name: &str, enabled: bool) {
        let mut classes = self.classes.write().unwrap_or_else(PoisonError::into_inner);
        if enabled {
            classes.insert(name.to_string());
        } else {
            classes.remove(name);
        }
    }

    fn has_class(&self, name: &str) -> bool {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }
}
