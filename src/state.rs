// src/state.rs
// Shared, immutable per-process state handed to every request

use anyhow::Result;
use std::sync::Arc;

use crate::{
    analysis::AnalysisOrchestrator,
    config::AppConfig,
    fix::FixCoordinator,
    llm::{ChatCompletionsProvider, CompletionProvider},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub fixer: Arc<FixCoordinator>,
    pub analyzer: Arc<AnalysisOrchestrator>,
}

impl AppState {
    /// Assemble state from explicit parts; tests use this with fakes
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn CompletionProvider>,
        analyzer: AnalysisOrchestrator,
    ) -> Self {
        let fixer = FixCoordinator::new(provider, &config.model);
        Self {
            config: Arc::new(config),
            fixer: Arc::new(fixer),
            analyzer: Arc::new(analyzer),
        }
    }
}

/// Production wiring: the configured model endpoint and the real tools
pub fn create_app_state(config: AppConfig) -> Result<AppState> {
    let provider: Arc<dyn CompletionProvider> =
        Arc::new(ChatCompletionsProvider::new(&config.model)?);
    let analyzer = AnalysisOrchestrator::new(&config.tools);
    Ok(AppState::new(config, provider, analyzer))
}
