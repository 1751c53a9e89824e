//! AI Module for knowledge relation inference
//!
//! Uses Anthropic Claude API to decide whether two detected entities stand
//! in one of the knowledge graph's valid relations.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sylvascan::ai::AiClient;
//!
//! let client = AiClient::from_env()?;
//! let relation = client
//!     .infer_relation("pine sawyer beetle", "masson pine", &valid_relations)
//!     .await?;
//! // relation == Some("hosted by") when the model recognises the pair
//! ```

pub mod prompt;

use serde::Deserialize;
use std::env;

use crate::error::{AiError, AiResult};

pub use prompt::{build_messages, system_prompt, user_prompt};

/// Anthropic API client
#[derive(Clone)]
pub struct AiClient {
    api_key: String,
    model: String,
    max_tokens: u32,
}

/// Anthropic API response structure
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

/// Anthropic API error response
#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Default number of retries
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay between retries in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

impl AiClient {
    /// Create a new client with explicit API key
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 256,
        }
    }

    /// Create a client from environment variable ANTHROPIC_API_KEY
    pub fn from_env() -> AiResult<Self> {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        let api_key = env::var("ANTHROPIC_API_KEY").map_err(|_| AiError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    /// Set the model to use
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Model identifier used for requests
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Infer the relation between two entities (with retries).
    ///
    /// # Arguments
    /// * `head` - First entity (relation reads head-to-tail)
    /// * `tail` - Second entity
    /// * `valid_relations` - Relation labels the answer must come from
    ///
    /// # Returns
    /// `Some(relation)` when the model names a relation from the list,
    /// `None` when it answers "none" or something unusable.
    pub async fn infer_relation(
        &self,
        head: &str,
        tail: &str,
        valid_relations: &[String],
    ) -> AiResult<Option<String>> {
        let mut last_error = None;

        for attempt in 1..=DEFAULT_MAX_RETRIES {
            match self.call_api(head, tail, valid_relations).await {
                Ok(response) => return Ok(parse_relation_from_response(&response, valid_relations)),
                Err(e) => {
                    eprintln!("   ⚠️  Attempt {}/{} failed: {}", attempt, DEFAULT_MAX_RETRIES, e);
                    last_error = Some(e);

                    if attempt < DEFAULT_MAX_RETRIES {
                        eprintln!("   ↻ Retrying in {}ms...", RETRY_DELAY_MS);
                        tokio::time::sleep(tokio::time::Duration::from_millis(RETRY_DELAY_MS)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AiError::ApiError("Unknown error".to_string())))
    }

    /// Call Anthropic API for a single entity pair
    async fn call_api(&self, head: &str, tail: &str, valid_relations: &[String]) -> AiResult<String> {
        println!("   📡 Inferring relation: {} <-> {}", head, tail);

        let client = reqwest::Client::new();

        let messages = prompt::build_messages(head, tail, valid_relations);
        let system = prompt::system_prompt();

        let request_body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": 0,
            "system": system,
            "messages": messages
        });

        let response = client
            .post("https://api.anthropic.com/v1/messages")
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let status = response.status();

        let body = response
            .text()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            // Try to parse error
            if let Ok(error) = serde_json::from_str::<AnthropicError>(&body) {
                return Err(AiError::ApiError(error.error.message));
            }
            return Err(AiError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let response: AnthropicResponse =
            serde_json::from_str(&body).map_err(|e| AiError::InvalidResponse(e.to_string()))?;

        // Extract text from response
        let text = response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(AiError::InvalidResponse("Empty response".to_string()));
        }

        Ok(text)
    }
}

/// Parse a relation label out of a model response.
///
/// Accepts the bare label, tolerates quotes, backticks and trailing
/// punctuation, and treats "none" as no relation. An answer that names
/// more than one valid relation is discarded as ambiguous.
fn parse_relation_from_response(response: &str, valid_relations: &[String]) -> Option<String> {
    let normalized = normalize_answer(response);

    if normalized.is_empty() || normalized == "none" {
        return None;
    }

    // Exact match first
    for relation in valid_relations {
        if normalized == relation.to_lowercase() {
            return Some(relation.clone());
        }
    }

    // Fall back to a single unambiguous mention inside the first line
    let first_line = normalized.lines().next().unwrap_or("");
    let mentioned: Vec<&String> = valid_relations
        .iter()
        .filter(|r| first_line.contains(&r.to_lowercase()))
        .collect();

    match mentioned.as_slice() {
        [only] => Some((*only).clone()),
        _ => None,
    }
}

/// Strip markdown fences, quotes and trailing punctuation, lowercase.
fn normalize_answer(text: &str) -> String {
    let trimmed = text.trim().trim_matches('`');
    trimmed
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim_end_matches('.')
        .trim()
        .to_lowercase()
}
