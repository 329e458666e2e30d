//! Live preview synthesis.
//!
//! Turns the current [`ProjectStore`] into one self-contained HTML document
//! meant to run inside a sandboxed iframe:
//!
//! 1. [`extract`] picks the markup (body interior of the entry HTML file),
//!    script and style files.
//! 2. [`fallback`] substitutes canned markup when there is no HTML file.
//! 3. [`document`] wraps everything with the console bridge shim.
//! 4. [`host`] renders the page that frames the sandbox and shows the console.
//!
//! The document is recomputed from scratch on every project change, device
//! switch or refresh; sandbox state does not survive a recompute.

pub mod device;
pub mod document;
pub mod extract;
pub mod fallback;
pub mod host;

pub use device::DeviceProfile;
pub use document::assemble_document;
pub use fallback::FallbackKind;
pub use host::{HostMode, render_host};

use crate::{config::PreviewConfig, project::ProjectStore, utils::minify::minify_html};
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// `sandbox` attribute for the preview iframe.
///
/// Scripts, forms and modal dialogs only: no same-origin access, no
/// top-level navigation.
pub const SANDBOX: &str = "allow-scripts allow-forms allow-modals";

/// Where the preview markup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupSource {
    Project,
    Fallback(FallbackKind),
}

/// A synthesized preview document.
#[derive(Debug, Clone)]
pub struct PreviewDocument {
    pub html: String,
    pub source: MarkupSource,
}

/// Synthesize the preview document for `store`.
///
/// `text` is the raw project text `store` was parsed from; the fallback
/// template is picked from it, so discarded preamble still counts.
pub fn synthesize(store: &ProjectStore, text: &str, config: &PreviewConfig) -> PreviewDocument {
    let (markup, source) = match extract::extract_markup(store) {
        Some(markup) => (markup, MarkupSource::Project),
        None => {
            let kind = FallbackKind::sniff(text);
            (kind.markup(), MarkupSource::Fallback(kind))
        }
    };

    let html = assemble_document(
        markup,
        extract::extract_script(store),
        extract::extract_style(store),
        &config.tailwind_cdn,
    );

    let html = if config.minify {
        String::from_utf8_lossy(&minify_html(html.as_bytes())).into_owned()
    } else {
        html
    };

    PreviewDocument { html, source }
}

/// Write `document.html` and a static host page into `dir`.
pub fn write_preview(
    store: &ProjectStore,
    text: &str,
    config: &PreviewConfig,
    title: &str,
    dir: &Path,
) -> Result<PreviewDocument> {
    let doc = synthesize(store, text, config);
    let host = render_host(title, config.device, HostMode::Static);

    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    fs::write(dir.join(host::STATIC_PREVIEW_SRC), &doc.html)?;
    fs::write(dir.join("index.html"), host)?;

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PreviewConfig {
        PreviewConfig::default()
    }

    #[test]
    fn test_synthesize_from_project() {
        let text = "// FILE: index.html\n<html><head><title>T</title></head><body><h1>Hi</h1></body></html>\n\n\
                    // FILE: script.js\nconsole.log('x');\n\n// FILE: styles.css\nh1 { color: red; }";
        let doc = synthesize(&ProjectStore::parse(text), text, &config());

        assert_eq!(doc.source, MarkupSource::Project);
        assert!(doc.html.contains("<h1>Hi</h1>"));
        assert!(!doc.html.contains("<title>T</title>"));
        assert!(doc.html.contains("console.log('x');"));
        assert!(doc.html.contains("h1 { color: red; }"));
    }

    #[test]
    fn test_synthesize_fallback_prefers_login() {
        let text = "a login page with an analytics dashboard";
        let doc = synthesize(&ProjectStore::parse(text), text, &config());

        assert_eq!(doc.source, MarkupSource::Fallback(FallbackKind::Login));
        assert!(doc.html.contains("Forgot password?"));
        assert!(!doc.html.contains("Total Users"));
    }

    #[test]
    fn test_fallback_sniffs_discarded_preamble() {
        let text = "Here is your login page:\n\n// FILE: app.js\nconsole.log(1);";
        let store = ProjectStore::parse(text);
        assert!(!store.serialize().contains("login"));

        let doc = synthesize(&store, text, &config());
        assert_eq!(doc.source, MarkupSource::Fallback(FallbackKind::Login));
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let store = ProjectStore::parse("// FILE: index.html\n<p>x</p>");
        let a = synthesize(&store, "", &config());
        let b = synthesize(&store, "", &config());
        assert_eq!(a.html, b.html);
    }

    #[test]
    fn test_synthesize_custom_cdn() {
        let mut config = config();
        config.tailwind_cdn = "http://localhost/tw.js".into();
        let doc = synthesize(&ProjectStore::default(), "", &config);
        assert!(doc.html.contains(r#"src="http://localhost/tw.js""#));
    }

    #[test]
    fn test_synthesize_minified_keeps_content() {
        let mut config = config();
        config.minify = true;
        let store = ProjectStore::parse("// FILE: index.html\n<body>\n   <p>Hello   there</p>\n</body>");
        let plain = synthesize(&store, "", &PreviewConfig::default());
        let small = synthesize(&store, "", &config);

        assert!(small.html.len() < plain.html.len());
        assert!(small.html.contains("Hello"));
    }

    #[test]
    fn test_write_preview() {
        let dir = tempfile::tempdir().unwrap();
        let text = "// FILE: index.html\n<body><p>Hi</p></body>";

        let doc = write_preview(&ProjectStore::parse(text), text, &config(), "demo", dir.path()).unwrap();

        let written = fs::read_to_string(dir.path().join("document.html")).unwrap();
        assert_eq!(written, doc.html);
        let host = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(host.contains(r#"src="document.html""#));
    }
}
