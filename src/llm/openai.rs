//! OpenAI chat-completions explainer.
//!
//! Implements `PickExplainer` against the Chat Completions API. The API
//! key is held as a secret and only exposed when building the request.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::prompt::{self, ChatMessage};
use super::{ChatTurn, PickExplainer};
use crate::types::{PickResult, ValcoachError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_MAX_TOKENS: u32 = 700;
const DEFAULT_TEMPERATURE: f32 = 0.3;

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 1000;

/// Client settings; `None` fields fall back to the defaults above.
#[derive(Debug, Clone, Default)]
pub struct OpenAiOptions {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub api_url: Option<String>,
}

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChatMessage>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OpenAiClient {
    http: Client,
    api_key: SecretString,
    api_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    total_calls: AtomicU64,
}

impl OpenAiClient {
    pub fn new(api_key: SecretString, options: OpenAiOptions) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build OpenAI HTTP client")?;

        Ok(Self {
            http,
            api_key,
            api_url: options.api_url.unwrap_or_else(|| OPENAI_API_URL.to_string()),
            model: options.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            total_calls: AtomicU64::new(0),
        })
    }

    fn llm_error(&self, message: String) -> anyhow::Error {
        ValcoachError::Llm {
            model: self.model.clone(),
            message,
        }
        .into()
    }

    /// Send a message list, retrying rate limits and server errors with
    /// exponential backoff.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages,
        };

        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = BASE_BACKOFF_MS * 2u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            let resp = self
                .http
                .post(&self.api_url)
                .bearer_auth(self.api_key.expose_secret())
                .json(&request)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let body: ChatResponse = response
                            .json()
                            .await
                            .context("Failed to parse OpenAI response")?;
                        self.total_calls.fetch_add(1, Ordering::Relaxed);

                        let text = body
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|c| c.message)
                            .map(|m| m.content)
                            .unwrap_or_default();

                        if text.trim().is_empty() {
                            return Err(self.llm_error("empty completion".to_string()));
                        }
                        return Ok(text);
                    }

                    let error_text = response.text().await.unwrap_or_default();
                    if status.as_u16() == 429 || status.is_server_error() {
                        warn!(status = %status, attempt, model = %self.model, "Retryable OpenAI error");
                        last_error = Some(format!("HTTP {status}: {error_text}"));
                        continue;
                    }

                    return Err(self.llm_error(format!("HTTP {status}: {error_text}")));
                }
                Err(e) => {
                    warn!(error = %e, attempt, "OpenAI request failed");
                    last_error = Some(format!("Request error: {e}"));
                }
            }
        }

        Err(self.llm_error(format!(
            "failed after {MAX_RETRIES} retries: {}",
            last_error.unwrap_or_default()
        )))
    }

    /// Number of successful completions so far.
    pub fn total_calls(&self) -> u64 {
        self.total_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PickExplainer for OpenAiClient {
    async fn explain(&self, pick: &PickResult, region: Option<&str>) -> Result<String> {
        debug!(
            player = %pick.player_handle,
            stat = %pick.stat_type,
            model = %self.model,
            "Requesting pick explanation"
        );
        self.complete(&prompt::initial_messages(pick, region)).await
    }

    async fn follow_up(
        &self,
        pick: &PickResult,
        region: Option<&str>,
        history: &[ChatTurn],
    ) -> Result<String> {
        debug!(
            player = %pick.player_handle,
            turns = history.len(),
            "Requesting follow-up answer"
        );
        self.complete(&prompt::followup_messages(pick, region, history)).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
