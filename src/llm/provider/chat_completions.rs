//! OpenAI-compatible Chat Completions backend.
//!
//! Works against any `/chat/completions` endpoint that streams SSE
//! (Hugging Face router, DeepSeek, vLLM, ...). Only `delta.content` is read;
//! reasoning and tool-call deltas are ignored.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{ChatMessage, ChatRequest, CompletionProvider, StreamEvent};
use crate::config::ModelConfig;
use crate::llm::sse::{SseDecoder, SseFrame};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatStreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionsProvider {
    client: HttpClient,
    endpoint: String,
    api_key: Option<String>,
}

impl ChatCompletionsProvider {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        if config.api_key.is_none() {
            warn!("No model API key configured; requests will be sent unauthenticated");
        }

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Forward content deltas from the SSE body to `tx` until the stream ends
    async fn process_sse_stream(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();

        loop {
            // Stop reading as soon as nobody is listening so the connection is released
            let next = tokio::select! {
                _ = tx.closed() => {
                    debug!("Stream receiver dropped, closing model connection");
                    return;
                }
                next = stream.next() => next,
            };
            let Some(chunk) = next else { break };
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                    return;
                }
            };

            for frame in decoder.push(&chunk) {
                if frame.is_done() {
                    let _ = tx.send(StreamEvent::Done).await;
                    return;
                }
                for event in events_from_frame(&frame) {
                    let stop = matches!(event, StreamEvent::Error(_));
                    if tx.send(event).await.is_err() {
                        // Receiver went away; nothing left to do
                        return;
                    }
                    if stop {
                        return;
                    }
                }
            }
        }

        if let Some(frame) = decoder.finish()
            && !frame.is_done()
        {
            for event in events_from_frame(&frame) {
                let _ = tx.send(event).await;
            }
        }
        let _ = tx.send(StreamEvent::Done).await;
    }
}

/// Translate one SSE frame into zero or more stream events
fn events_from_frame(frame: &SseFrame) -> Vec<StreamEvent> {
    let Some(chunk) = frame.try_parse::<ChatStreamChunk>() else {
        debug!("Skipping unparseable SSE frame: {}", frame.preview());
        return Vec::new();
    };

    if let Some(error) = chunk.error {
        return vec![StreamEvent::Error(error_text(&error))];
    }

    chunk
        .choices
        .into_iter()
        .filter_map(|choice| choice.delta?.content)
        .filter(|content| !content.is_empty())
        .map(StreamEvent::TextDelta)
        .collect()
}

fn error_text(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionsProvider {
    fn name(&self) -> &'static str {
        "chat-completions"
    }

    async fn create_stream(&self, request: ChatRequest) -> Result<mpsc::Receiver<StreamEvent>> {
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            stream: true,
        };

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        debug!("POST {} (model {})", self.endpoint, request.model);
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("(failed to read body: {})", e));
            anyhow::bail!("Model API error {}: {}", status, text);
        }

        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(Self::process_sse_stream(response, tx));
        Ok(rx)
    }
}
