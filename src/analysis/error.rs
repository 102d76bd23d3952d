// src/analysis/error.rs

use std::time::Duration;

use super::diagnostic::Diagnostic;

/// Why a single tool produced no usable diagnostics.
///
/// Never escapes the tool's slot in the report: every variant renders to one
/// synthetic diagnostic via [`ToolError::to_diagnostic`].
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{tool} timed out")]
    Timeout { tool: String, after: Duration },

    #[error("{tool} failed: {source}")]
    Crash {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} output parse error")]
    Malformed { tool: String, reason: String },

    #[error("{}", tool_level_message(tool, *code, stderr))]
    ToolLevel {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn tool_level_message(tool: &str, code: Option<i32>, stderr: &str) -> String {
    let stderr = stderr.trim();
    match code {
        Some(code) => {
            let detail = if stderr.is_empty() { "See logs" } else { stderr };
            format!("{} error ({}): {}", tool, code, detail)
        }
        None => format!("{}: {}", tool, stderr),
    }
}

impl ToolError {
    /// Context kept out of the user-facing message, for logs only
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Timeout { after, .. } => Some(format!("after {:?}", after)),
            Self::Malformed { reason, .. } => Some(reason.clone()),
            Self::Crash { .. } | Self::ToolLevel { .. } => None,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::synthetic(self.to_string())
    }
}

/// Orchestration-level failure, outside every per-tool guard
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("could not prepare source file: {0}")]
    Scratch(#[from] std::io::Error),
}
