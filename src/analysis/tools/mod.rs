//! Tool runners: one adapter per external analysis tool.
//!
//! Each adapter owns its argument set, its process timeout and its output
//! normalizer. The orchestrator only sees the [`AnalysisTool`] trait.

mod bandit;
mod mypy;
mod pylint;

pub use bandit::{Bandit, parse_bandit_output};
pub use mypy::{Mypy, parse_mypy_output};
pub use pylint::{Pylint, parse_pylint_output};

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::diagnostic::Diagnostic;
use super::error::ToolError;
use crate::config::ToolsConfig;

/// An external analyzer that turns a source file into diagnostics
#[async_trait]
pub trait AnalysisTool: Send + Sync {
    /// Key used in the aggregated report
    fn name(&self) -> &'static str;

    /// Analyze `file`, returning zero or more diagnostics or the reason there are none
    async fn run(&self, file: &Path) -> Result<Vec<Diagnostic>, ToolError>;
}

/// The standard pylint + mypy + bandit set
pub fn default_toolset(config: &ToolsConfig) -> Vec<Arc<dyn AnalysisTool>> {
    vec![
        Arc::new(Pylint::new(config.pylint.clone())),
        Arc::new(Mypy::new(config.mypy.clone(), config.python_version.clone())),
        Arc::new(Bandit::new(config.bandit.clone())),
    ]
}
