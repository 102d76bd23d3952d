// src/fix/mod.rs
// Fix-request coordinator: prompt -> streamed transcript -> (code, explanation)

pub mod extract;
pub mod prompt;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ModelConfig;
use crate::llm::{ChatMessage, ChatRequest, CompletionProvider, StreamEvent};

pub use extract::{extract_code, extract_explanation};
pub use prompt::build_fix_prompt;

/// Response body of the fix pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixResult {
    pub fixed_code: String,
    pub short_explanation: String,
}

impl FixResult {
    pub fn from_transcript(transcript: &str) -> Self {
        Self {
            fixed_code: extract_code(transcript),
            short_explanation: extract_explanation(transcript),
        }
    }
}

#[derive(Debug, Error)]
pub enum FixError {
    /// Connect failure, non-2xx status, or an error reported mid-stream
    #[error("{0}")]
    ModelTransport(String),

    #[error("model did not finish within {}s", .0.as_secs())]
    ModelTimeout(Duration),
}

pub struct FixCoordinator {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    timeout: Duration,
}

impl FixCoordinator {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &ModelConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            timeout: config.timeout,
        }
    }

    /// Ask the model to fix `code`. No retries: any provider failure is
    /// returned as-is.
    pub async fn fix(&self, code: &str) -> Result<FixResult, FixError> {
        let start = Instant::now();
        info!(
            "Sending {} bytes to {} via {} (streaming)",
            code.len(),
            self.model,
            self.provider.name()
        );

        let transcript = tokio::time::timeout(self.timeout, self.collect_transcript(code))
            .await
            .map_err(|_| {
                warn!("Model stream exceeded {}s", self.timeout.as_secs());
                FixError::ModelTimeout(self.timeout)
            })??;

        info!(
            "Stream complete: {} chars in {}ms",
            transcript.len(),
            start.elapsed().as_millis()
        );
        debug!("Transcript:\n{}", transcript);

        Ok(FixResult::from_transcript(&transcript))
    }

    /// Concatenate every text delta in arrival order
    async fn collect_transcript(&self, code: &str) -> Result<String, FixError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(build_fix_prompt(code))],
        };

        let mut rx = self
            .provider
            .create_stream(request)
            .await
            .map_err(|e| FixError::ModelTransport(format!("{:#}", e)))?;

        let mut transcript = String::new();
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::TextDelta(text) => transcript.push_str(&text),
                StreamEvent::Error(message) => return Err(FixError::ModelTransport(message)),
                StreamEvent::Done => break,
            }
        }
        Ok(transcript)
    }
}
