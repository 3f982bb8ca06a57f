//! The single point of entry for Claude API calls.
//!
//! Form answers, range suggestions and cover letters all go through [`TextGenerator`];
//! nothing else talks to the Anthropic API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
pub mod usage;

#[cfg(test)]
pub mod fake;

use usage::{CallRecord, UsageLog};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for every completion.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2048;
const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Request/response text generation. Callers treat the returned string as untrusted.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Anthropic Messages API client with an optional usage log.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    usage_log: Option<UsageLog>,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            usage_log: None,
        }
    }

    pub fn with_usage_log(mut self, log: UsageLog) -> Self {
        self.usage_log = Some(log);
        self
    }

    async fn send(&self, body: &AnthropicRequest<'_>) -> Result<LlmResponse, Failure> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| Failure::Retry(e.into()))?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            return response.json().await.map_err(|e| Failure::Fatal(e.into()));
        }
        let error = LlmError::Api {
            status,
            message: parse_error_message(response.text().await.unwrap_or_default()),
        };
        if is_retryable(status) {
            Err(Failure::Retry(error))
        } else {
            Err(Failure::Fatal(error))
        }
    }

    /// One user turn under the shared answer system prompt. Rate limits, server
    /// errors and connection failures are retried with exponential backoff.
    async fn chat(&self, prompt: &str) -> Result<LlmResponse, LlmError> {
        let body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: prompts::ANSWER_SYSTEM,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt = 0;
        loop {
            match self.send(&body).await {
                Ok(response) => {
                    debug!(
                        "LLM call succeeded after {} retries: input_tokens={}, output_tokens={}",
                        attempt, response.usage.input_tokens, response.usage.output_tokens
                    );
                    return Ok(response);
                }
                Err(Failure::Fatal(e)) => return Err(e),
                Err(Failure::Retry(LlmError::Api { status: 429, .. })) if attempt + 1 >= MAX_ATTEMPTS => {
                    return Err(LlmError::RateLimited { retries: attempt });
                }
                Err(Failure::Retry(e)) if attempt + 1 >= MAX_ATTEMPTS => return Err(e),
                Err(Failure::Retry(e)) => {
                    let delay = backoff(attempt);
                    warn!("LLM call failed ({}), retrying in {}ms", e, delay.as_millis());
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

enum Failure {
    Retry(LlmError),
    Fatal(LlmError),
}

fn is_retryable(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// 1s, 2s, 4s, ...
fn backoff(attempt: u32) -> Duration {
    BASE_BACKOFF * 2u32.saturating_pow(attempt)
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.chat(prompt).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        let reply = strip_fences(text).to_string();

        if let Some(log) = &self.usage_log {
            log.append(&CallRecord::new(MODEL, prompt, &reply, &response.usage));
        }
        Ok(reply)
    }
}

fn parse_error_message(body: String) -> String {
    serde_json::from_str::<AnthropicError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Strips ```lang ... ``` or ``` ... ``` code fences from LLM output.
fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence line.
    let body = match stripped.find('\n') {
        Some(idx) if !stripped[..idx].trim().contains(' ') => &stripped[idx + 1..],
        _ => stripped,
    };
    body.trim_end()
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(body.trim())
}
