// src/analysis/orchestrator.rs
// Runs every analysis tool against one snippet and collects a single report

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, info, warn};

use super::diagnostic::{AnalysisReport, Diagnostic};
use super::error::{AnalysisError, ToolError};
use super::scratch::ScratchFile;
use super::tools::{AnalysisTool, default_toolset};
use crate::config::ToolsConfig;

type ToolOutcome = Result<Result<Vec<Diagnostic>, ToolError>, tokio::time::error::Elapsed>;

pub struct AnalysisOrchestrator {
    tools: Vec<Arc<dyn AnalysisTool>>,
    wait_timeout: Duration,
    max_concurrent: usize,
    scratch_dir: Option<PathBuf>,
}

impl AnalysisOrchestrator {
    /// pylint + mypy + bandit, configured from `config`
    pub fn new(config: &ToolsConfig) -> Self {
        Self::with_tools(
            default_toolset(config),
            config.wait_timeout,
            config.max_concurrent,
        )
    }

    pub fn with_tools(
        tools: Vec<Arc<dyn AnalysisTool>>,
        wait_timeout: Duration,
        max_concurrent: usize,
    ) -> Self {
        Self {
            tools,
            wait_timeout,
            max_concurrent: max_concurrent.max(1),
            scratch_dir: None,
        }
    }

    /// Write scratch files under `dir` instead of the system temp dir
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Analyze one snippet. Only failing to materialize the snippet on disk is
    /// an error; every per-tool failure lands in that tool's report entry.
    pub async fn analyze(&self, code: &str) -> Result<AnalysisReport, AnalysisError> {
        let start = Instant::now();
        debug!("Static analysis input ({} bytes):\n{}", code.len(), code);

        let scratch = match &self.scratch_dir {
            Some(dir) => ScratchFile::create_in(dir, code)?,
            None => ScratchFile::create(code)?,
        };

        let report = self.run_tools(scratch.path()).await;
        scratch.release();

        info!(
            "Static analysis finished: {} diagnostics from {} tools in {}ms",
            report.total(),
            self.tools.len(),
            start.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Run all tools concurrently against an existing file
    pub async fn run_tools(&self, file: &Path) -> AnalysisReport {
        let mut report = AnalysisReport::for_tools(self.tool_names());
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));

        // Handles abort their task when dropped, so a cancelled request does
        // not leave tools running.
        let handles: Vec<(&'static str, AbortOnDropHandle<ToolOutcome>)> = self
            .tools
            .iter()
            .map(|tool| {
                let tool = Arc::clone(tool);
                let semaphore = Arc::clone(&semaphore);
                let file = file.to_path_buf();
                let wait = self.wait_timeout;
                let name = tool.name();
                let handle = tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    tokio::time::timeout(wait, tool.run(&file)).await
                });
                (name, AbortOnDropHandle::new(handle))
            })
            .collect();

        let outcomes = futures::future::join_all(
            handles
                .into_iter()
                .map(|(name, handle)| async move { (name, handle.await) }),
        )
        .await;

        for (name, outcome) in outcomes {
            report.insert(name, settle(name, outcome));
        }
        report
    }
}

/// Collapse one tool's task outcome into its report entry
fn settle(name: &str, outcome: Result<ToolOutcome, JoinError>) -> Vec<Diagnostic> {
    match outcome {
        Ok(Ok(Ok(diagnostics))) => {
            debug!("{} reported {} diagnostics", name, diagnostics.len());
            diagnostics
        }
        Ok(Ok(Err(tool_error))) => {
            match tool_error.detail() {
                Some(detail) => warn!("{} degraded: {} ({})", name, tool_error, detail),
                None => warn!("{} degraded: {}", name, tool_error),
            }
            vec![tool_error.to_diagnostic()]
        }
        Ok(Err(_elapsed)) => {
            warn!("{} did not finish within the wait timeout", name);
            vec![Diagnostic::synthetic(format!("{} timed out", name))]
        }
        Err(join_error) => {
            let fault = if join_error.is_panic() {
                panic_text(join_error.into_panic())
            } else {
                join_error.to_string()
            };
            warn!("{} faulted: {}", name, fault);
            vec![Diagnostic::synthetic(format!("{} failed: {}", name, fault))]
        }
    }
}

fn panic_text(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
