// src/analysis/tools/bandit.rs
// Security scanner: verbose JSON, medium severity and above

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use super::AnalysisTool;
use crate::analysis::diagnostic::{Diagnostic, Severity};
use crate::analysis::error::ToolError;
use crate::analysis::process::run_tool_process;
use crate::config::ToolCommand;

const NAME: &str = "bandit";

#[derive(Debug, Deserialize)]
struct BanditReport {
    #[serde(default)]
    results: Vec<BanditIssue>,
}

#[derive(Debug, Deserialize)]
struct BanditIssue {
    #[serde(default)]
    line_number: Option<u32>,
    #[serde(default)]
    issue_text: Option<String>,
    #[serde(default)]
    issue_severity: Option<String>,
}

pub struct Bandit {
    command: ToolCommand,
}

impl Bandit {
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }

    fn args(file: &Path) -> Vec<String> {
        vec![
            "-vv".into(),
            "-f".into(),
            "json".into(),
            "-ll".into(),
            file.display().to_string(),
        ]
    }
}

#[async_trait]
impl AnalysisTool for Bandit {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, file: &Path) -> Result<Vec<Diagnostic>, ToolError> {
        let output = run_tool_process(
            NAME,
            &self.command.program,
            &Self::args(file),
            self.command.timeout,
        )
        .await?;

        interpret_bandit_run(output.exit_code, &output.stdout, &output.stderr)
    }
}

/// Exit 0 (clean) and 1 (findings) both mean the scan ran
fn interpret_bandit_run(
    exit_code: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> Result<Vec<Diagnostic>, ToolError> {
    match exit_code {
        Some(0) | Some(1) => parse_bandit_output(stdout),
        code => {
            warn!("bandit exited with {:?}", code);
            Err(ToolError::ToolLevel {
                tool: NAME.into(),
                code: Some(code.unwrap_or(-1)),
                stderr: stderr.to_string(),
            })
        }
    }
}

/// Normalize bandit `-f json` output
pub fn parse_bandit_output(stdout: &str) -> Result<Vec<Diagnostic>, ToolError> {
    let report: BanditReport = serde_json::from_str(stdout).map_err(|e| ToolError::Malformed {
        tool: NAME.into(),
        reason: e.to_string(),
    })?;

    Ok(report
        .results
        .into_iter()
        .map(|issue| {
            Diagnostic::new(
                issue.line_number.unwrap_or(0),
                issue.issue_text.unwrap_or_default(),
                Severity::from_label(issue.issue_severity.as_deref().unwrap_or("low")),
            )
        })
        .collect())
}
