//! HTML minification for synthesized preview documents.

// ============================================================================
// Internal Implementation
// ============================================================================

/// Minify HTML using the `minify_html` crate.
///
/// Inline scripts are not minified; console bridge error positions refer
/// to the script as generated.
pub fn minify_html(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = false;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    minify_html::minify(html, &cfg)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_html_basic() {
        let html = b"<html>\n  <head>\n  </head>\n  <body>\n    <p>Hello</p>\n  </body>\n</html>";
        let result = minify_html(html);
        let result_str = String::from_utf8_lossy(&result);

        assert!(!result_str.contains("\n  "));
        assert!(result_str.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_minify_html_preserves_content() {
        let result = minify_html(b"<p>Hello World</p>");
        assert!(String::from_utf8_lossy(&result).contains("Hello World"));
    }

    #[test]
    fn test_minify_html_keeps_script_text() {
        let html = b"<script>\n  const a = 1;\n  console.log(a);\n</script>";
        let result = minify_html(html);
        assert!(String::from_utf8_lossy(&result).contains("console.log(a);"));
    }
}
