//! `[llm]` section configuration.
//!
//! Settings for the chat-completion service that generates projects. The API
//! key itself never lives in the config file; `api_key_env` names the
//! environment variables to read it from.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[llm]` section in webforge.toml.
///
/// # Example
/// ```toml
/// [llm]
/// base_url = "https://api.openai.com/v1"
/// model = "gpt-4o-mini"
/// temperature = 0.7
/// max_tokens = 4000
/// api_key_env = ["OPENAI_API_KEY"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// OpenAI-compatible API base, without the `/chat/completions` suffix.
    #[serde(default = "defaults::llm::base_url")]
    #[educe(Default = defaults::llm::base_url())]
    pub base_url: String,

    #[serde(default = "defaults::llm::model")]
    #[educe(Default = defaults::llm::model())]
    pub model: String,

    /// Sampling temperature, `0.0..=2.0`.
    #[serde(default = "defaults::llm::temperature")]
    #[educe(Default = defaults::llm::temperature())]
    pub temperature: f32,

    #[serde(default = "defaults::llm::max_tokens")]
    #[educe(Default = defaults::llm::max_tokens())]
    pub max_tokens: u32,

    /// Environment variables checked in order for the API key.
    #[serde(default = "defaults::llm::api_key_env")]
    #[educe(Default = defaults::llm::api_key_env())]
    pub api_key_env: Vec<String>,

    /// Request timeout in seconds.
    #[serde(default = "defaults::llm::timeout_secs")]
    #[educe(Default = defaults::llm::timeout_secs())]
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// First non-empty API key among `api_key_env`.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|key| key.trim().to_owned())
            .find(|key| !key.is_empty())
    }

    /// Full chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::super::WebConfig;

    #[test]
    fn test_llm_config_defaults() {
        let config: WebConfig = toml::from_str("").unwrap();

        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.llm.max_tokens, 4000);
        assert_eq!(config.llm.api_key_env, vec!["WEBFORGE_API_KEY", "OPENAI_API_KEY"]);
        assert_eq!(config.llm.timeout_secs, 120);
    }

    #[test]
    fn test_llm_config_override() {
        let config = r#"
            [llm]
            base_url = "http://localhost:11434/v1/"
            model = "llama3"
            temperature = 0.2
            max_tokens = 8000
            api_key_env = []
        "#;
        let config: WebConfig = toml::from_str(config).unwrap();

        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.llm.max_tokens, 8000);
        assert!(config.llm.api_key_env.is_empty());
        assert_eq!(config.llm.api_key(), None);
        assert_eq!(
            config.llm.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_api_key_missing_variable() {
        let config: WebConfig = toml::from_str(
            r#"
            [llm]
            api_key_env = ["WEBFORGE_TEST_SURELY_UNSET_VARIABLE"]
        "#,
        )
        .unwrap();
        assert_eq!(config.llm.api_key(), None);
    }
}
