//! Preview document skeleton and console bridge shim.
//!
//! # Layout
//!
//! ```text
//! <head>
//!   <script> console shim </script>      ← runs before anything else
//!   <script src=tailwind-cdn>
//!   <style> baseline utilities + project style </style>
//! <body>
//!   <div class="preview-container"> markup </div>
//!   <div class="tailwind-classes ..."> ← every class used in markup
//!   <script> DOMContentLoaded → project script </script>
//! ```
//!
//! # Bridge Message
//!
//! Every `console.{log,info,warn,error}` call inside the sandbox also posts
//! `{ type: "console", logType, content }` to `window.parent` with target
//! origin `"*"`. `content` is the space-joined arguments, objects via
//! `JSON.stringify`.

use super::extract::collect_classes;
use crate::utils::template::fill;
use regex::Regex;
use std::{borrow::Cow, sync::LazyLock};

const DOCUMENT_TEMPLATE: &str = include_str!("../embed/preview/document.html");

/// Console interception shim.
pub const CONSOLE_SHIM: &str = include_str!("../embed/preview/console-shim.js");

static SCRIPT_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</script").expect("valid regex"));

static STYLE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</style").expect("valid regex"));

/// Keep inlined text from terminating its own `<script>`/`<style>` element.
fn escape_closing<'a>(text: &'a str, re: &Regex, replacement: &'static str) -> Cow<'a, str> {
    re.replace_all(text, replacement)
}

/// Wrap project markup, script and style into one runnable document.
pub fn assemble_document(markup: &str, script: &str, style: &str, tailwind_cdn: &str) -> String {
    let classes = collect_classes(markup);
    let script = escape_closing(script, &SCRIPT_CLOSE_RE, r"<\/script");
    let style = escape_closing(style, &STYLE_CLOSE_RE, r"<\/style");

    fill(
        DOCUMENT_TEMPLATE,
        &[
            ("shim", CONSOLE_SHIM),
            ("tailwind_cdn", tailwind_cdn),
            ("style", &*style),
            ("markup", markup),
            ("classes", classes.as_str()),
            ("script", &*script),
        ],
    )
}
