//! Turning a free-form model transcript into `(code, explanation)`.
//!
//! Code extraction is an ordered ladder of pure strategies. The first one
//! that produces something wins and the rest are never consulted; when all
//! of them decline, the result is the empty string.

mod code;
mod explanation;

pub use explanation::{Explanation, summarize};

type CodeStrategy = fn(&str) -> Option<String>;

/// Highest priority first
const CODE_STRATEGIES: &[(&str, CodeStrategy)] = &[
    ("python-fence", code::python_fence),
    ("untagged-fence", code::untagged_fence),
    ("line-reconstruction", code::reconstruct_lines),
];

/// Best-guess corrected code, or `""` when the transcript has none
pub fn extract_code(transcript: &str) -> String {
    let text = transcript.trim();
    CODE_STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let found = strategy(text)?;
            tracing::debug!("Code extracted by {} strategy ({} bytes)", name, found.len());
            Some(found)
        })
        .unwrap_or_default()
}

/// Always three labeled lines: `Issue: ..\nCause: ..\nFix: ..`
pub fn extract_explanation(transcript: &str) -> String {
    summarize(transcript).to_string()
}
