// src/api/mod.rs
// HTTP surface: router, handlers, request/response types, error rendering

pub mod error;
pub mod http;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use http::http_router;
pub use types::*;
