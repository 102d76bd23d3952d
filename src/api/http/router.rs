// src/api/http/router.rs
// HTTP router composition

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use super::handlers::{fix_code_handler, health_handler, static_analysis_handler};
use crate::state::AppState;

pub fn http_router(app_state: Arc<AppState>) -> Router {
    // Browser front ends call from any origin during development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let version_header = SetResponseHeaderLayer::if_not_present(
        header::HeaderName::from_static("x-api-version"),
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );

    Router::new()
        .route("/api/fix-code", post(fix_code_handler))
        .route("/api/static-analysis", post(static_analysis_handler))
        .route("/api/health", get(health_handler))
        .layer(version_header)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
