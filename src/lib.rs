// src/lib.rs
// Python snippet service: LLM code fixing and aggregated static analysis

pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod fix;
pub mod llm;
pub mod state;
