//! Project text generation.
//!
//! A [`Generator`] turns a prompt (and, for modifications, the current
//! project text) into marker-delimited project text. Two implementations:
//!
//! - [`OpenAiGenerator`]: any OpenAI-compatible chat-completion service
//! - [`TemplateGenerator`]: offline canned project, used without an API key

mod openai;
mod template;

pub use openai::OpenAiGenerator;
pub use template::TemplateGenerator;

use crate::config::LlmConfig;
use async_trait::async_trait;
use thiserror::Error;

/// Generation failures, surfaced to the user and recorded in the error log.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no API key found in {0}")]
    MissingApiKey(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("empty response from the generator")]
    EmptyResponse,
}

impl GenerateError {
    /// Short stable label, stored alongside the message in the error log.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingApiKey(_) => "missing_api_key",
            Self::Network(_) => "network",
            Self::Authentication(_) => "authentication",
            Self::RateLimited => "rate_limited",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Parse(_) => "parse",
            Self::EmptyResponse => "empty_response",
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;

/// Text-generation collaborator.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Provider label for logs.
    fn name(&self) -> &str;

    /// Produce a new project for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Rewrite `existing` (full project text) according to `prompt`.
    async fn modify(&self, existing: &str, prompt: &str) -> Result<String>;
}

/// Pick the live generator when a key is available, the offline one otherwise.
pub fn from_config(config: &LlmConfig, offline: bool) -> Box<dyn Generator> {
    if offline {
        return Box::new(TemplateGenerator::new());
    }
    match OpenAiGenerator::from_config(config) {
        Ok(generator) => Box::new(generator),
        Err(err) => {
            crate::log!("generate"; "{err}, using the offline template generator");
            Box::new(TemplateGenerator::new())
        }
    }
}

/// Remove one surrounding markdown code fence, if present.
///
/// ```text
/// ```html            ← opening fence, optional info string
/// // FILE: index.html
/// ...
/// ```                ← closing fence
/// ```
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return text;
    };
    let Some(body_start) = after_open.find('\n') else {
        return text;
    };
    let body = &after_open[body_start + 1..];
    match body.trim_end().strip_suffix("```") {
        Some(inner) => inner.trim_end(),
        None => text,
    }
}
