// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake provider API for tests: programmable models, canned replies,
//! failure injection, call accounting.

use crate::api::{ChatRequest, ChatResponse, ModelInfo, ProviderApi, ProviderError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct FakeState {
    /// endpoint → models served there. Endpoints not present fail.
    models: HashMap<String, Vec<ModelInfo>>,
    /// Canned chat reply.
    reply: Option<String>,
    /// Chat failures to inject before succeeding.
    chat_failures: u32,
    list_calls: Vec<String>,
    chat_calls: Vec<ChatRequest>,
}

/// Shared-handle fake; clones observe the same state.
#[derive(Clone, Default)]
pub struct FakeProviderApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeProviderApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `models` at `endpoint` (exact match on the normalized URL).
    pub fn serve_models(&self, endpoint: &str, models: &[&str]) {
        let models = models
            .iter()
            .map(|id| ModelInfo { id: id.to_string(), context_window: None })
            .collect();
        self.state.lock().models.insert(endpoint.to_string(), models);
    }

    pub fn set_reply(&self, reply: &str) {
        self.state.lock().reply = Some(reply.to_string());
    }

    /// Make the next `n` chat calls fail with a transient error.
    pub fn fail_chats(&self, n: u32) {
        self.state.lock().chat_failures = n;
    }

    pub fn take_down(&self, endpoint: &str) {
        self.state.lock().models.remove(endpoint);
    }

    pub fn list_calls(&self) -> Vec<String> {
        self.state.lock().list_calls.clone()
    }

    pub fn chat_call_count(&self) -> usize {
        self.state.lock().chat_calls.len()
    }
}

#[async_trait]
impl ProviderApi for FakeProviderApi {
    async fn list_models(&self, endpoint: &str) -> Result<Vec<ModelInfo>, ProviderError> {
        let mut state = self.state.lock();
        state.list_calls.push(endpoint.to_string());
        match state.models.get(endpoint) {
            Some(models) => Ok(models.clone()),
            None => Err(ProviderError::Http(format!("connect refused: {endpoint}"))),
        }
    }

    async fn chat(
        &self,
        _endpoint: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, ProviderError> {
        let mut state = self.state.lock();
        state.chat_calls.push(request.clone());
        if state.chat_failures > 0 {
            state.chat_failures -= 1;
            return Err(ProviderError::Timeout);
        }
        let content = state.reply.clone().unwrap_or_else(|| "ok".to_string());
        Ok(ChatResponse { content, model: request.model.clone(), tokens: 42 })
    }
}
