//! Scripted chat client for tests and offline runs.
//!
//! Each call to [`ChatClient::invoke`] hands the zero-based call index to a
//! response function, so callers can fail on some attempts and succeed on
//! others. Calls and requests are recorded for post-hoc assertions.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::cache::ModelClientCache;
use super::provider::{ChatClient, ChatMessage, ChatResponse, ModelClientHandle};
use crate::error::PipelineError;

type ResponseFn = Box<dyn Fn(u32) -> Result<String, PipelineError> + Send + Sync>;

/// A chat client that answers from a script instead of a network call.
pub struct MockChatClient {
    response_fn: ResponseFn,
    calls: Arc<AtomicU32>,
    requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl MockChatClient {
    /// Answer call `n` with `response_fn(n)`.
    pub fn new(
        response_fn: impl Fn(u32) -> Result<String, PipelineError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            response_fn: Box::new(response_fn),
            calls: Arc::new(AtomicU32::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answer with `text`.
    pub fn fixed(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Answer with `responses` in order, cycling when exhausted.
    pub fn sequence(responses: Vec<String>) -> Self {
        Self::new(move |idx| {
            if responses.is_empty() {
                return Err(PipelineError::model("mock has no scripted responses"));
            }
            Ok(responses[idx as usize % responses.len()].clone())
        })
    }

    /// Always fail with a `ModelProcessing` error.
    pub fn failing(message: &str, status_code: Option<u16>) -> Self {
        let message = message.to_string();
        Self::new(move |_| {
            Err(PipelineError::ModelProcessing {
                message: message.clone(),
                status_code,
            })
        })
    }

    /// Shared call counter (clone before moving the client).
    pub fn call_count_handle(&self) -> Arc<AtomicU32> {
        self.calls.clone()
    }

    /// Shared log of every message list received.
    pub fn requests_handle(&self) -> Arc<Mutex<Vec<Vec<ChatMessage>>>> {
        self.requests.clone()
    }

    /// A client cache that hands out this client for every key.
    pub fn into_cache(self) -> ModelClientCache {
        let handle: ModelClientHandle = Arc::new(self);
        ModelClientCache::with_factory(
            move |_role: &str, _temperature: f32| -> Result<ModelClientHandle, PipelineError> {
                Ok(handle.clone())
            },
        )
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ChatResponse, PipelineError> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }
        let content = (self.response_fn)(idx)?;
        Ok(ChatResponse {
            content,
            model: "mock-v1".to_string(),
            tokens_used: None,
            latency_ms: 0,
        })
    }
}
