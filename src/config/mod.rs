// src/config/mod.rs
// Service configuration, loaded once at startup from .env + environment

use anyhow::{Result, bail};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Default OpenAI-compatible inference router
pub const DEFAULT_MODEL_BASE_URL: &str = "https://router.huggingface.co/v1";
pub const DEFAULT_MODEL: &str = "deepseek-ai/DeepSeek-R1";

#[derive(Debug, Clone)]
pub struct AppConfig {
    // ── Server
    pub host: String,
    pub port: u16,
    pub log_level: String,

    // ── Model
    pub model: ModelConfig,

    // ── Static analysis
    pub tools: ToolsConfig,
}

/// Settings for the remote completion endpoint
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// How one external analysis tool is launched
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub program: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ToolsConfig {
    pub pylint: ToolCommand,
    pub mypy: ToolCommand,
    pub bandit: ToolCommand,
    /// Upper bound on how long the orchestrator waits for any single tool
    pub wait_timeout: Duration,
    pub max_concurrent: usize,
    /// Passed to mypy as --python-version
    pub python_version: String,
}

// Values may carry trailing comments (`KEY=15 # seconds`), so strip those before parsing.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => {
                    debug!("Config: {} = {} (from environment)", key, clean_val);
                    parsed
                }
                Err(_) => {
                    warn!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        None => default,
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            debug!(".env file not found, using environment variables and defaults");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = |key: &str, default: u64| Duration::from_secs(parse_or(&lookup, key, default));

        let api_key = non_empty(&lookup, "HF_API_TOKEN")
            .or_else(|| non_empty(&lookup, "CODEFIX_API_KEY"));

        Self {
            host: parse_or(&lookup, "CODEFIX_HOST", "0.0.0.0".to_string()),
            port: parse_or(&lookup, "CODEFIX_PORT", 8000),
            log_level: parse_or(&lookup, "CODEFIX_LOG_LEVEL", "info".to_string()),
            model: ModelConfig {
                base_url: parse_or(
                    &lookup,
                    "CODEFIX_MODEL_BASE_URL",
                    DEFAULT_MODEL_BASE_URL.to_string(),
                ),
                model: parse_or(&lookup, "CODEFIX_MODEL", DEFAULT_MODEL.to_string()),
                api_key,
                timeout: secs("CODEFIX_MODEL_TIMEOUT", 120),
            },
            tools: ToolsConfig {
                pylint: ToolCommand {
                    program: parse_or(&lookup, "CODEFIX_PYLINT_BIN", "pylint".to_string()),
                    timeout: secs("CODEFIX_PYLINT_TIMEOUT", 15),
                },
                mypy: ToolCommand {
                    program: parse_or(&lookup, "CODEFIX_MYPY_BIN", "mypy".to_string()),
                    timeout: secs("CODEFIX_MYPY_TIMEOUT", 10),
                },
                bandit: ToolCommand {
                    program: parse_or(&lookup, "CODEFIX_BANDIT_BIN", "bandit".to_string()),
                    timeout: secs("CODEFIX_BANDIT_TIMEOUT", 15),
                },
                wait_timeout: secs("CODEFIX_TOOL_WAIT_TIMEOUT", 20),
                max_concurrent: parse_or(&lookup, "CODEFIX_MAX_CONCURRENT_TOOLS", 3),
                python_version: parse_or(&lookup, "CODEFIX_PYTHON_VERSION", "3.9".to_string()),
            },
        }
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("CODEFIX_PORT must be non-zero");
        }
        if self.model.base_url.trim().is_empty() {
            bail!("Model base URL cannot be empty");
        }
        if self.model.timeout.is_zero() {
            bail!("CODEFIX_MODEL_TIMEOUT must be at least one second");
        }
        if self.tools.max_concurrent == 0 {
            bail!("CODEFIX_MAX_CONCURRENT_TOOLS must be at least 1");
        }
        if self.tools.wait_timeout.is_zero() {
            bail!("CODEFIX_TOOL_WAIT_TIMEOUT must be at least one second");
        }
        for (name, tool) in [
            ("pylint", &self.tools.pylint),
            ("mypy", &self.tools.mypy),
            ("bandit", &self.tools.bandit),
        ] {
            if tool.program.trim().is_empty() {
                bail!("{} program cannot be empty", name);
            }
            if tool.timeout.is_zero() {
                bail!("{} timeout must be at least one second", name);
            }
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
