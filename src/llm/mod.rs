// src/llm/mod.rs
// Streaming LLM client: provider trait, OpenAI-compatible backend, SSE decoding

pub mod provider;
pub mod sse;

pub use provider::{
    ChatCompletionsProvider, ChatMessage, ChatRequest, CompletionProvider, StreamEvent,
};
pub use sse::{SseDecoder, SseFrame};
