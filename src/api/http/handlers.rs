// src/api/http/handlers.rs

use axum::{Json, extract::State};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::analysis::AnalysisReport;
use crate::api::error::ApiResult;
use crate::api::types::{CodeRequest, HealthResponse};
use crate::fix::FixResult;
use crate::state::AppState;

/// POST /api/fix-code
pub async fn fix_code_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CodeRequest>,
) -> ApiResult<Json<FixResult>> {
    let start = Instant::now();
    let result = state.fixer.fix(&req.code).await?;
    info!(
        "fix-code: {} bytes in, {} bytes of code out, {}ms",
        req.code.len(),
        result.fixed_code.len(),
        start.elapsed().as_millis()
    );
    Ok(Json(result))
}

/// POST /api/static-analysis
pub async fn static_analysis_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CodeRequest>,
) -> ApiResult<Json<AnalysisReport>> {
    let report = state.analyzer.analyze(&req.code).await?;
    Ok(Json(report))
}

/// GET /api/health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        model: state.config.model.model.clone(),
        tools: state
            .analyzer
            .tool_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}
