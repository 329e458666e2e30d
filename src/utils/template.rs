//! Placeholder substitution for embedded HTML templates.
//!
//! Templates use `{name}` placeholders. Substitution is single-pass: text
//! inserted for one placeholder is never scanned again, so generated content
//! that happens to contain `{script}` stays literal. Braces that do not form a
//! known placeholder (CSS blocks, JS objects) are left alone.

/// Replace every `{key}` in `template` with its value from `vars`.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_basic() {
        assert_eq!(fill("<p>{a}</p>", &[("a", "x")]), "<p>x</p>");
    }

    #[test]
    fn test_fill_repeated_and_missing() {
        assert_eq!(fill("{a}-{a}-{b}", &[("a", "1")]), "1-1-{b}");
    }

    #[test]
    fn test_fill_leaves_css_braces() {
        let css = "body { margin: 0; }\n{style}";
        assert_eq!(fill(css, &[("style", ".x{}")]), "body { margin: 0; }\n.x{}");
    }

    #[test]
    fn test_fill_is_single_pass() {
        let out = fill("{markup}|{script}", &[("markup", "{script}"), ("script", "run()")]);
        assert_eq!(out, "{script}|run()");
    }

    #[test]
    fn test_fill_unclosed_brace() {
        assert_eq!(fill("a { b", &[("b", "x")]), "a { b");
    }
}
