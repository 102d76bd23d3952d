// src/analysis/mod.rs
// Static analysis pipeline: scratch file, concurrent tool runners, one report

pub mod diagnostic;
pub mod error;
pub mod orchestrator;
pub mod process;
pub mod scratch;
pub mod tools;

pub use diagnostic::{AnalysisReport, Diagnostic, Severity};
pub use error::{AnalysisError, ToolError};
pub use orchestrator::AnalysisOrchestrator;
pub use scratch::ScratchFile;
pub use tools::{
    AnalysisTool, Bandit, Mypy, Pylint, default_toolset, parse_bandit_output, parse_mypy_output,
    parse_pylint_output,
};
