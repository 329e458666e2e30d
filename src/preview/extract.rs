//! Entry-point lookup for markup, script and style files.
//!
//! Each kind prefers its conventional name (`index.html`, `script.js`,
//! `styles.css`, case-insensitive) and falls back to the first file with the
//! matching extension, in store order.

use crate::project::{FileRecord, ProjectStore};
use regex::Regex;
use std::sync::LazyLock;

/// Interior of the first `<body ...>...</body>` region.
static BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body>").expect("valid regex"));

/// Values of `class="..."` / `class='...'` attributes.
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"class=["']([^"']*?)["']"#).expect("valid regex"));

/// Conventional name first, then the first file ending in `ext`.
fn find_entry<'a>(store: &'a ProjectStore, entry: &str, ext: &str) -> Option<&'a FileRecord> {
    store
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(entry))
        .or_else(|| {
            store
                .iter()
                .find(|f| f.name.to_ascii_lowercase().ends_with(ext))
        })
}

/// Interior of the `<body>` element, or the whole text when there is none.
pub fn body_interior(html: &str) -> &str {
    BODY_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map_or(html, |m| m.as_str().trim())
}

/// Markup to show in the preview, or `None` when the project has no HTML file.
pub fn extract_markup(store: &ProjectStore) -> Option<&str> {
    find_entry(store, "index.html", ".html").map(|file| body_interior(&file.content))
}

/// Script content, empty when the project has no `.js` file.
pub fn extract_script(store: &ProjectStore) -> &str {
    find_entry(store, "script.js", ".js").map_or("", |f| f.content.as_str())
}

/// Style content, empty when the project has no `.css` file.
pub fn extract_style(store: &ProjectStore) -> &str {
    find_entry(store, "styles.css", ".css").map_or("", |f| f.content.as_str())
}

/// Every class name used in `markup`, space-joined, in order of appearance.
pub fn collect_classes(markup: &str) -> String {
    CLASS_RE
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(files: &[(&str, &str)]) -> ProjectStore {
        let mut store = ProjectStore::default();
        for (name, content) in files {
            store.insert(*name, *content);
        }
        store
    }

    #[test]
    fn test_entry_point_wins_over_first_html() {
        let s = store(&[
            ("other.html", "<html><body>X</body></html>"),
            ("index.html", "<html><body>Y</body></html>"),
        ]);
        assert_eq!(extract_markup(&s), Some("Y"));
    }

    #[test]
    fn test_entry_point_case_insensitive() {
        let s = store(&[("a.html", "A"), ("INDEX.HTML", "B")]);
        assert_eq!(extract_markup(&s), Some("B"));
    }

    #[test]
    fn test_first_html_when_no_entry_point() {
        let s = store(&[("a.js", "x"), ("pages/about.html", "About"), ("b.html", "B")]);
        assert_eq!(extract_markup(&s), Some("About"));
    }

    #[test]
    fn test_body_only() {
        let s = store(&[("index.html", "<html><head>Z</head><body>Hello</body></html>")]);
        assert_eq!(extract_markup(&s), Some("Hello"));
    }

    #[test]
    fn test_body_with_attributes_and_newlines() {
        let html = "<HTML>\n<BODY class=\"bg-gray-100\">\n  <main>hi</main>\n</BODY>\n</HTML>";
        assert_eq!(body_interior(html), "<main>hi</main>");
    }

    #[test]
    fn test_no_body_uses_whole_file() {
        let s = store(&[("index.html", "<div>fragment</div>")]);
        assert_eq!(extract_markup(&s), Some("<div>fragment</div>"));
    }

    #[test]
    fn test_no_markup() {
        let s = store(&[("app.js", "x")]);
        assert_eq!(extract_markup(&s), None);
    }

    #[test]
    fn test_script_and_style_priority() {
        let s = store(&[
            ("util.js", "util"),
            ("script.js", "main"),
            ("theme.css", "theme"),
            ("styles.css", "styles"),
        ]);
        assert_eq!(extract_script(&s), "main");
        assert_eq!(extract_style(&s), "styles");
    }

    #[test]
    fn test_script_and_style_fallbacks() {
        let s = store(&[("js/app.js", "app"), ("css/site.css", "site"), ("data.json", "{}")]);
        assert_eq!(extract_script(&s), "app");
        assert_eq!(extract_style(&s), "site");

        let empty = store(&[("index.html", "x")]);
        assert_eq!(extract_script(&empty), "");
        assert_eq!(extract_style(&empty), "");
    }

    #[test]
    fn test_json_is_not_a_script() {
        let s = store(&[("package.json", "{}")]);
        assert_eq!(extract_script(&s), "");
    }

    #[test]
    fn test_collect_classes() {
        let markup = r#"<div class="p-4 m-2"><span class='text-sm'></span><p class=""></p></div>"#;
        assert_eq!(collect_classes(markup), "p-4 m-2 text-sm");
    }
}
