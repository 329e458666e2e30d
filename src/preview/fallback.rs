//! Canned markup for projects without an HTML file.
//!
//! Cosmetic only: when the generator ignores the file-marker contract the
//! preview pane still shows something resembling the request. The choice is
//! a keyword sniff over the project text and carries no fidelity guarantee.
//! Nothing outside [`crate::preview`] depends on it.

const LOGIN: &str = include_str!("../embed/preview/fallback/login.html");
const FORM: &str = include_str!("../embed/preview/fallback/form.html");
const LIST: &str = include_str!("../embed/preview/fallback/list.html");
const DASHBOARD: &str = include_str!("../embed/preview/fallback/dashboard.html");
const COUNTER: &str = include_str!("../embed/preview/fallback/counter.html");

/// Which canned template was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    Login,
    Form,
    List,
    Dashboard,
    Counter,
}

/// Keyword families in priority order; first family with a hit wins.
const KEYWORDS: &[(FallbackKind, &[&str])] = &[
    (FallbackKind::Login, &["login", "sign in"]),
    (FallbackKind::Form, &["form", "input"]),
    (FallbackKind::List, &["list", "items"]),
    (FallbackKind::Dashboard, &["dashboard", "analytics"]),
];

impl FallbackKind {
    /// Pick a template for `source` (the full project text).
    pub fn sniff(source: &str) -> Self {
        let source = source.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| source.contains(w)))
            .map_or(Self::Counter, |(kind, _)| *kind)
    }

    pub const fn markup(self) -> &'static str {
        match self {
            Self::Login => LOGIN,
            Self::Form => FORM,
            Self::List => LIST,
            Self::Dashboard => DASHBOARD,
            Self::Counter => COUNTER,
        }
    }
}

/// Canned markup matching `source`.
pub fn fallback_markup(source: &str) -> &'static str {
    FallbackKind::sniff(source).markup()
}
