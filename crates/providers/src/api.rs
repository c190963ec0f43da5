// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OpenAI-compatible provider protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hard ceiling for one chat completion activity.
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(3 * 60);

/// Ceiling for a heartbeat probe request.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from provider protocol calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Http(err.to_string())
        }
    }
}

/// One model as reported by `GET /models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u32>,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// One chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Completion result with usage accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
    pub tokens: u32,
}

/// The provider protocol surface.
///
/// The trait seam exists so the daemon's tests can run against a fake
/// without a live endpoint.
#[async_trait]
pub trait ProviderApi: Send + Sync {
    /// `GET {endpoint}/models`
    async fn list_models(&self, endpoint: &str) -> Result<Vec<ModelInfo>, ProviderError>;

    /// `POST {endpoint}/chat/completions`
    async fn chat(&self, endpoint: &str, request: &ChatRequest)
        -> Result<ChatResponse, ProviderError>;
}

// -- wire shapes --------------------------------------------------------

#[derive(Deserialize)]
struct ModelsReply {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
    #[serde(default)]
    context_length: Option<u32>,
    #[serde(default)]
    max_model_len: Option<u32>,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<UsageReply>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct UsageReply {
    #[serde(default)]
    total_tokens: u32,
}

/// Reqwest-backed implementation of the protocol.
pub struct HttpProviderApi {
    client: reqwest::Client,
}

impl HttpProviderApi {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for HttpProviderApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderApi for HttpProviderApi {
    async fn list_models(&self, endpoint: &str) -> Result<Vec<ModelInfo>, ProviderError> {
        let url = format!("{}/models", endpoint.trim_end_matches('/'));
        let response = self.client.get(&url).timeout(PROBE_TIMEOUT).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status: status.as_u16(), message });
        }
        let reply: ModelsReply =
            response.json().await.map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(reply
            .data
            .into_iter()
            .map(|m| ModelInfo {
                context_window: m.context_length.or(m.max_model_len),
                id: m.id,
            })
            .collect())
    }

    async fn chat(
        &self,
        endpoint: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/chat/completions", endpoint.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .timeout(CHAT_TIMEOUT)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status: status.as_u16(), message });
        }
        let reply: ChatReply =
            response.json().await.map_err(|e| ProviderError::Parse(e.to_string()))?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::Parse("no choices in completion".to_string()))?;
        Ok(ChatResponse {
            content,
            model: reply.model.unwrap_or_else(|| request.model.clone()),
            tokens: reply.usage.map(|u| u.total_tokens).unwrap_or(0),
        })
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
