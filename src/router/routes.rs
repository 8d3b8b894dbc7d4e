use super::{LANDING_PATH, LOGIN_PATH};

/// Declarative route table entry
#[derive(Debug)]
pub struct RouteEntry {
    /// Absolute for top-level entries, relative to the parent for children
    pub path: &'static str,
    /// View name, if the entry renders one
    pub name: Option<&'static str>,
    /// Whether an authenticated session is needed; inherited by children
    pub requires_auth: bool,
    /// Target of a pure redirect entry
    pub redirect: Option<&'static str>,
    pub children: &'static [RouteEntry],
}

const fn view(path: &'static str, name: &'static str) -> RouteEntry {
    RouteEntry {
        path,
        name: Some(name),
        requires_auth: false,
        redirect: None,
        children: &[],
    }
}

/// The console's route tree
pub static ROUTES: &[RouteEntry] = &[
    view(LOGIN_PATH, "Login"),
    RouteEntry {
        path: "/",
        name: None,
        requires_auth: true,
        redirect: None,
        children: &[
            RouteEntry {
                path: "",
                name: None,
                requires_auth: false,
                redirect: Some(LANDING_PATH),
                children: &[],
            },
            view("dashboard", "Dashboard"),
            view("providers", "Providers"),
            view("models", "Models"),
            view("logs", "Logs"),
            view("settings", "Settings"),
            view("about", "About"),
        ],
    },
];

/// A navigation target after matching against the route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Normalized path
    pub path: String,
    /// View name of the matched entry
    pub name: Option<&'static str>,
    /// Effective auth requirement including inherited flags
    pub requires_auth: bool,
    /// Redirect declared by the matched entry
    pub redirect: Option<&'static str>,
    /// Whether any entry matched
    pub matched: bool,
}

impl Route {
    /// Target that can be checked without consulting the table
    pub fn new(path: &str, requires_auth: bool) -> Self {
        Self {
            path: normalize_path(path),
            name: None,
            requires_auth,
            redirect: None,
            matched: true,
        }
    }

    pub fn is_login(&self) -> bool {
        self.path == LOGIN_PATH
    }
}

/// Strip query, fragment and trailing slashes; always starts with `/`
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_matches('/');
    format!("/{}", trimmed)
}

fn join(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        normalize_path(child)
    } else {
        normalize_path(&format!("{}/{}", parent.trim_end_matches('/'), child))
    }
}

fn find(
    entries: &'static [RouteEntry],
    parent: &str,
    inherited_auth: bool,
    target: &str,
) -> Option<Route> {
    for entry in entries {
        let full = join(parent, entry.path);
        let requires_auth = inherited_auth || entry.requires_auth;

        // Children first so "/" with an empty child resolves to the child
        if let Some(route) = find(entry.children, &full, requires_auth, target) {
            return Some(route);
        }
        if full == target && (entry.name.is_some() || entry.redirect.is_some()) {
            return Some(Route {
                path: full,
                name: entry.name,
                requires_auth,
                redirect: entry.redirect,
                matched: true,
            });
        }
    }
    None
}

/// Match a path against the route table
///
/// Paths that match no entry resolve to an unmatched, public route.
pub fn resolve(path: &str) -> Route {
    let target = normalize_path(path);
    find(ROUTES, "", false, &target).unwrap_or(Route {
        path: target,
        name: None,
        requires_auth: false,
        redirect: None,
        matched: false,
    })
}
