//! File classification by extension.
//!
//! Presentation only: picks the editor mode, icon and listing order. Nothing
//! else in the pipeline branches on it.

use std::path::Path;

/// Language family of a project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Markup,
    Script,
    Stylesheet,
    Data,
    Prose,
    Plain,
}

impl Language {
    /// Classify a file name by its extension (case-insensitive).
    pub fn classify(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("html" | "htm") => Self::Markup,
            Some("js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx") => Self::Script,
            Some("css") => Self::Stylesheet,
            Some("json") => Self::Data,
            Some("md" | "markdown" | "txt") => Self::Prose,
            _ => Self::Plain,
        }
    }

    /// Listing precedence: markup, script, stylesheet, data/prose, the rest.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Markup => 0,
            Self::Script => 1,
            Self::Stylesheet => 2,
            Self::Data | Self::Prose => 3,
            Self::Plain => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Markup => "markup",
            Self::Script => "script",
            Self::Stylesheet => "stylesheet",
            Self::Data => "data",
            Self::Prose => "prose",
            Self::Plain => "plain",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Markup => "🌐",
            Self::Script => "📜",
            Self::Stylesheet => "🎨",
            Self::Data => "🧾",
            Self::Prose => "📝",
            Self::Plain => "📄",
        }
    }
}

/// Editor highlighting mode for a file name.
///
/// Unknown extensions map to `typescript`, matching the default file name.
pub fn editor_mode(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("js" | "jsx" | "mjs" | "cjs") => "javascript",
        Some("ts" | "tsx") => "typescript",
        Some("css") => "css",
        Some("html" | "htm") => "html",
        Some("json") => "json",
        Some("md" | "markdown") => "markdown",
        Some("txt") => "plaintext",
        _ => "typescript",
    }
}
