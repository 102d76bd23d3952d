// src/api/types.rs
use serde::{Deserialize, Serialize};

/// Body of both POST endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeRequest {
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
    pub tools: Vec<String>,
}
