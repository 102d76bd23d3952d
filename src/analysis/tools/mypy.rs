// src/analysis/tools/mypy.rs
// Type-checker: line-oriented text output

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::AnalysisTool;
use crate::analysis::diagnostic::{Diagnostic, Severity};
use crate::analysis::error::ToolError;
use crate::analysis::process::run_tool_process;
use crate::config::ToolCommand;

const NAME: &str = "mypy";

/// `<path>:<line>: <error|warning>: <message> [optional-code]`
static MYPY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?):(\d+):\s*(error|warning):\s*(.*?)(?:\s*\[.*\])?$")
        .expect("mypy line pattern is valid")
});

pub struct Mypy {
    command: ToolCommand,
    python_version: String,
}

impl Mypy {
    pub fn new(command: ToolCommand, python_version: String) -> Self {
        Self {
            command,
            python_version,
        }
    }

    fn args(&self, file: &Path) -> Vec<String> {
        vec![
            "--hide-error-context".into(),
            "--show-error-codes".into(),
            "--no-color-output".into(),
            "--no-error-summary".into(),
            "--ignore-missing-imports".into(),
            "--no-incremental".into(),
            "--python-version".into(),
            self.python_version.clone(),
            file.display().to_string(),
        ]
    }
}

#[async_trait]
impl AnalysisTool for Mypy {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, file: &Path) -> Result<Vec<Diagnostic>, ToolError> {
        let output = run_tool_process(
            NAME,
            &self.command.program,
            &self.args(file),
            self.command.timeout,
        )
        .await?;

        // stderr is parsed alongside stdout; the parser is line-based so the
        // relative order of the two streams does not matter.
        let mut combined = output.stdout;
        if !output.stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&output.stderr);
        }

        Ok(parse_mypy_output(&combined))
    }
}

/// Normalize mypy text output. Lines that are not diagnostics are dropped.
pub fn parse_mypy_output(output: &str) -> Vec<Diagnostic> {
    output
        .lines()
        .filter_map(|line| {
            let caps = MYPY_LINE.captures(line)?;
            let line_no = caps[2].parse::<u32>().ok()?;
            Some(Diagnostic::new(
                line_no,
                &caps[4],
                Severity::from_label(&caps[3]),
            ))
        })
        .collect()
}
