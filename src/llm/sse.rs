//! Server-Sent Events decoding for streamed completions.
//!
//! Network chunks do not respect line boundaries, so the decoder buffers
//! partial lines until a newline arrives and yields one [`SseFrame`] per
//! complete `data:` line.

use serde::de::DeserializeOwned;

/// Incremental SSE decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no newline
    scanned: usize,
}

impl SseDecoder {
    /// Upper bound for a single unterminated line (1MB)
    const MAX_BUFFER_SIZE: usize = 1024 * 1024;

    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every frame it completes.
    ///
    /// Bytes are only decoded once a full line is buffered, so a UTF-8
    /// sequence split across chunks survives intact.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut line_start = 0;
        let mut search_from = self.scanned;
        while let Some(offset) = self.buffer[search_from..].iter().position(|&b| b == b'\n') {
            let line_end = search_from + offset;
            let line = String::from_utf8_lossy(&self.buffer[line_start..line_end]);
            if let Some(frame) = SseFrame::from_line(&line) {
                frames.push(frame);
            }
            line_start = line_end + 1;
            search_from = line_start;
        }
        self.buffer.drain(..line_start);

        if self.buffer.len() > Self::MAX_BUFFER_SIZE {
            tracing::warn!(
                "SSE buffer exceeded {}KB without a newline, truncating",
                Self::MAX_BUFFER_SIZE / 1024
            );
            let keep_from = self.buffer.len() - Self::MAX_BUFFER_SIZE / 2;
            self.buffer.drain(..keep_from);
        }
        self.scanned = self.buffer.len();
        frames
    }

    pub fn push_str(&mut self, s: &str) -> Vec<SseFrame> {
        self.push(s.as_bytes())
    }

    /// Flush a final line that arrived without a trailing newline
    pub fn finish(&mut self) -> Option<SseFrame> {
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        SseFrame::from_line(&String::from_utf8_lossy(&rest))
    }

    pub fn has_remaining(&self) -> bool {
        self.buffer.iter().any(|b| !b.is_ascii_whitespace())
    }
}

/// One `data:` payload
#[derive(Debug, Clone, PartialEq)]
pub struct SseFrame {
    pub data: String,
}

impl SseFrame {
    // Comments (": keep-alive") and event/id/retry fields carry no text
    fn from_line(line: &str) -> Option<Self> {
        line.trim().strip_prefix("data:").map(|data| Self {
            data: data.trim_start().to_string(),
        })
    }

    /// OpenAI-style end-of-stream sentinel
    pub fn is_done(&self) -> bool {
        self.data == "[DONE]"
    }

    pub fn try_parse<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_str(&self.data).ok()
    }

    /// First 200 bytes of the payload, for log lines
    pub fn preview(&self) -> &str {
        if self.data.len() <= 200 {
            return &self.data;
        }
        let mut end = 200;
        while !self.data.is_char_boundary(end) {
            end -= 1;
        }
        &self.data[..end]
    }
}
