// src/analysis/tools/pylint.rs
// Lint-style tool: JSON reporter, errors and warnings only

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use super::AnalysisTool;
use crate::analysis::diagnostic::{Diagnostic, Severity};
use crate::analysis::error::ToolError;
use crate::analysis::process::run_tool_process;
use crate::config::ToolCommand;

const NAME: &str = "pylint";

/// One record of pylint's `-f json` output
#[derive(Debug, Deserialize)]
struct PylintMessage {
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

pub struct Pylint {
    command: ToolCommand,
}

impl Pylint {
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }

    fn args(file: &Path) -> Vec<String> {
        vec![
            file.display().to_string(),
            "-f".into(),
            "json".into(),
            "--disable=all".into(),
            "--enable=E,W".into(),
            "--unsafe-load-any-extension=y".into(),
            "--persistent=no".into(),
        ]
    }
}

#[async_trait]
impl AnalysisTool for Pylint {
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

        // Anything on stderr means pylint itself is unhappy; stdout is not trusted then
        if !output.stderr.trim().is_empty() {
            warn!("pylint wrote to stderr: {}", output.stderr.trim());
            return Err(ToolError::ToolLevel {
                tool: NAME.into(),
                code: None,
                stderr: output.stderr,
            });
        }

        parse_pylint_output(&output.stdout)
    }
}

/// Normalize pylint JSON reporter output
pub fn parse_pylint_output(stdout: &str) -> Result<Vec<Diagnostic>, ToolError> {
    let messages: Vec<PylintMessage> =
        serde_json::from_str(stdout).map_err(|e| ToolError::Malformed {
            tool: NAME.into(),
            reason: e.to_string(),
        })?;

    Ok(messages
        .into_iter()
        .map(|m| {
            Diagnostic::new(
                m.line.unwrap_or(0),
                m.message.unwrap_or_default(),
                Severity::from_label(m.kind.as_deref().unwrap_or("info")),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "type": "warning",
            "module": "snippet",
            "obj": "",
            "line": 1,
            "column": 0,
            "path": "/tmp/codefix-abc.py",
            "symbol": "unused-import",
            "message": "Unused import os",
            "message-id": "W0611"
        },
        {
            "type": "error",
            "module": "snippet",
            "obj": "f",
            "line": 4,
            "column": 11,
            "path": "/tmp/codefix-abc.py",
            "symbol": "undefined-variable",
            "message": "Undefined variable 'y'",
            "message-id": "E0602"
        }
    ]"#;

    #[test]
    fn test_parse_records() {
        let diags = parse_pylint_output(SAMPLE).unwrap();
        assert_eq!(
            diags,
            vec![
                Diagnostic::new(1, "Unused import os", Severity::Warning),
                Diagnostic::new(4, "Undefined variable 'y'", Severity::Error),
            ]
        );
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_pylint_output("[]").unwrap().is_empty());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let diags = parse_pylint_output(r#"[{"message": "something odd"}]"#).unwrap();
        assert_eq!(diags, vec![Diagnostic::new(0, "something odd", Severity::Info)]);
    }

    #[test]
    fn test_non_json_is_malformed() {
        let err = parse_pylint_output("************* Module snippet\n").unwrap_err();
        assert!(matches!(err, ToolError::Malformed { .. }));
        assert_eq!(err.to_diagnostic().message, "pylint output parse error");
    }

    #[test]
    fn test_args_request_json_errors_and_warnings() {
        let args = Pylint::args(Path::new("/tmp/x.py"));
        assert_eq!(args[0], "/tmp/x.py");
        assert!(args.contains(&"--disable=all".to_string()));
        assert!(args.contains(&"--enable=E,W".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "-f" && w[1] == "json"));
    }
}
