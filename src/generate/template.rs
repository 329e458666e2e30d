//! Offline generator producing a canned four-file project.

use super::{Generator, Result};
use crate::{config::defaults, project::ProjectStore, utils::template::fill};
use async_trait::async_trait;

const INDEX_HTML: &str = include_str!("../embed/templates/index.html");
const SCRIPT_JS: &str = include_str!("../embed/templates/script.js");
const STYLES_CSS: &str = include_str!("../embed/templates/styles.css");
const README_MD: &str = include_str!("../embed/templates/README.md");

const DEFAULT_PROJECT_NAME: &str = "WebApp";

pub struct TemplateGenerator {
    tailwind_cdn: String,
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateGenerator {
    pub fn new() -> Self {
        Self {
            tailwind_cdn: defaults::preview::tailwind_cdn(),
        }
    }

    fn render(&self, prompt: &str) -> String {
        let name = project_name(prompt);
        let summary = summary(prompt);
        let vars = [
            ("project_name", name.as_str()),
            ("summary", summary.as_str()),
            ("tailwind_cdn", self.tailwind_cdn.as_str()),
        ];

        let mut store = ProjectStore::default();
        store.insert("index.html", fill(INDEX_HTML, &vars));
        store.insert("script.js", fill(SCRIPT_JS, &vars));
        store.insert("styles.css", fill(STYLES_CSS, &vars));
        store.insert("README.md", fill(README_MD, &vars));
        store.serialize()
    }
}

/// First alphabetic word of `prompt`, capitalized.
fn project_name(prompt: &str) -> String {
    prompt
        .split(|c: char| !c.is_alphabetic())
        .find(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        })
        .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string())
}

/// One-line description safe to drop into HTML, Markdown and a JS template literal.
fn summary(prompt: &str) -> String {
    let cleaned: String = prompt
        .chars()
        .filter(|c| !matches!(c, '`' | '$' | '<' | '>' | '\\' | '{' | '}'))
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.is_empty() {
        "A vanilla JavaScript application with Tailwind CSS.".to_string()
    } else {
        format!("A vanilla JavaScript application for: {cleaned}")
    }
}

#[async_trait]
impl Generator for TemplateGenerator {
    fn name(&self) -> &str {
        "template"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(self.render(prompt))
    }

    async fn modify(&self, _existing: &str, prompt: &str) -> Result<String> {
        Ok(self.render(prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_name() {
        assert_eq!(project_name("todo list with filters"), "Todo");
        assert_eq!(project_name("  42 ways to weather"), "Ways");
        assert_eq!(project_name("123 !!"), "WebApp");
        assert_eq!(project_name(""), "WebApp");
    }

    #[test]
    fn test_summary_strips_template_breakers() {
        let s = summary("a `quiz` app\nwith ${score}");
        assert_eq!(s, "A vanilla JavaScript application for: a quiz app with score");
    }

    #[tokio::test]
    async fn test_generate_emits_four_files() {
        let text = TemplateGenerator::new().generate("weather dashboard").await.unwrap();
        let store = ProjectStore::parse(&text);

        let names: Vec<_> = store.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["index.html", "script.js", "styles.css", "README.md"]);

        let index = store.find("index.html").unwrap();
        assert!(index.content.contains("<title>Weather</title>"));
        assert!(index.content.contains("https://cdn.tailwindcss.com"));
        assert!(store.find("script.js").unwrap().content.contains("`Count: ${count}`"));
        assert!(store.find("styles.css").unwrap().content.contains("from { opacity: 0; }"));
    }

    #[tokio::test]
    async fn test_modify_regenerates_from_prompt() {
        let generator = TemplateGenerator::new();
        let text = generator.modify("// FILE: old.js\nx", "gallery page").await.unwrap();
        let store = ProjectStore::parse(&text);

        assert!(store.find("old.js").is_none());
        assert!(store.find("README.md").unwrap().content.starts_with("# Gallery"));
    }
}
