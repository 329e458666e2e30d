//! OpenAI-compatible chat-completion generator.

use super::{GenerateError, Generator, Result, strip_code_fence};
use crate::config::LlmConfig;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const GENERATE_SYSTEM_PROMPT: &str = include_str!("../embed/prompts/generate.txt");
const MODIFY_SYSTEM_PROMPT: &str = include_str!("../embed/prompts/modify.txt");

pub struct OpenAiGenerator {
    url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiGenerator {
    /// Build from `[llm]`, reading the key from the configured variables.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| GenerateError::MissingApiKey(config.api_key_env.join(", ")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        Ok(Self {
            url: config.completions_url(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            api_key,
            client,
        })
    }

    fn payload(&self, system: &str, user: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.payload(system, user))
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, text));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerateError::Parse(e.to_string()))?;

        completion_content(&data)
    }
}

/// Map a non-success status to an error.
fn status_error(status: u16, body: String) -> GenerateError {
    match status {
        401 | 403 => GenerateError::Authentication(body),
        429 => GenerateError::RateLimited,
        _ => GenerateError::InvalidRequest(format!("HTTP {status}: {body}")),
    }
}

/// Extract `choices[0].message.content`, stripped of a markdown fence.
fn completion_content(data: &serde_json::Value) -> Result<String> {
    let content = data
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .ok_or(GenerateError::EmptyResponse)?;

    let content = strip_code_fence(content).trim();
    if content.is_empty() {
        return Err(GenerateError::EmptyResponse);
    }
    Ok(content.to_string())
}

#[async_trait]
impl Generator for OpenAiGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let user = format!("Create a complete website project for: {prompt}");
        self.complete(GENERATE_SYSTEM_PROMPT, &user).await
    }

    async fn modify(&self, existing: &str, prompt: &str) -> Result<String> {
        let user = format!(
            "Here is the existing vanilla JavaScript project code:\n\n{existing}\n\nModify this project to: {prompt}"
        );
        self.complete(MODIFY_SYSTEM_PROMPT, &user).await
    }
}
