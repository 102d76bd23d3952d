// src/analysis/diagnostic.rs
// Uniform diagnostic record shared by every tool normalizer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Severity of a single finding.
///
/// Lint and type-check tools report `error`/`warning`; the security scanner
/// reports `low`/`medium`/`high`. Everything else collapses to `info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Low,
    Medium,
    High,
}

impl Severity {
    /// Map a raw tool label (any case) onto the uniform scale
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "error" | "fatal" => Self::Error,
            "warning" => Self::Warning,
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based source line, 0 for file-level or unknown
    pub line: u32,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(line: u32, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            line,
            message: message.into(),
            severity,
        }
    }

    /// File-level error standing in for a tool that could not produce results
    pub fn synthetic(message: impl Into<String>) -> Self {
        Self::new(0, message, Severity::Error)
    }
}

/// Per-tool diagnostics for one analysis request, keyed by tool name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisReport {
    results: BTreeMap<String, Vec<Diagnostic>>,
}

impl AnalysisReport {
    /// Report with an empty entry for each tool name
    pub fn for_tools<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            results: names
                .into_iter()
                .map(|name| (name.to_string(), Vec::new()))
                .collect(),
        }
    }

    pub fn insert(&mut self, tool: &str, diagnostics: Vec<Diagnostic>) {
        self.results.insert(tool.to_string(), diagnostics);
    }

    pub fn get(&self, tool: &str) -> Option<&[Diagnostic]> {
        self.results.get(tool).map(Vec::as_slice)
    }

    pub fn tools(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    pub fn total(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_severity_labels() {
        assert_eq!(Severity::from_label("HIGH"), Severity::High);
        assert_eq!(Severity::from_label("Medium"), Severity::Medium);
        assert_eq!(Severity::from_label("error"), Severity::Error);
        assert_eq!(Severity::from_label("fatal"), Severity::Error);
        assert_eq!(Severity::from_label("warning"), Severity::Warning);
        assert_eq!(Severity::from_label("convention"), Severity::Info);
        assert_eq!(Severity::from_label("UNDEFINED"), Severity::Info);
    }

    #[test]
    fn test_diagnostic_wire_format() {
        let diag = Diagnostic::new(7, "hardcoded password", Severity::High);
        assert_eq!(
            serde_json::to_value(&diag).unwrap(),
            json!({"line": 7, "message": "hardcoded password", "severity": "high"})
        );
    }

    #[test]
    fn test_report_has_entry_per_tool() {
        let mut report = AnalysisReport::for_tools(["pylint", "mypy", "bandit"]);
        report.insert("mypy", vec![Diagnostic::synthetic("mypy timed out")]);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["pylint"], json!([]));
        assert_eq!(value["bandit"], json!([]));
        assert_eq!(
            value["mypy"],
            json!([{"line": 0, "message": "mypy timed out", "severity": "error"}])
        );
        assert_eq!(report.total(), 1);
        assert_eq!(report.tools().count(), 3);
    }
}
