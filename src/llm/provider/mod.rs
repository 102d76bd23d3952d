//! Completion provider abstraction.
//!
//! The fix pipeline only needs "send a prompt, receive text fragments in
//! order", so the trait is a single streaming call. Fragments arrive on an
//! mpsc channel fed by a background task owned by the provider.

mod chat_completions;

pub use chat_completions::ChatCompletionsProvider;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// A streaming completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Events emitted while a completion streams
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Next text fragment, in delivery order
    TextDelta(String),
    /// Transport or provider failure mid-stream; no more deltas follow
    Error(String),
    /// Stream finished normally
    Done,
}

/// Streaming LLM backend
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Start a streaming completion. Errors here mean the request never
    /// started (connect failure, non-2xx status).
    async fn create_stream(&self, request: ChatRequest) -> Result<mpsc::Receiver<StreamEvent>>;
}
