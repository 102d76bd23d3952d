// src/cli.rs
// Command line: serve (default), or run one pipeline against a file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::api::http_router;
use crate::config::AppConfig;
use crate::state::create_app_state;

#[derive(Parser)]
#[command(name = "codefix")]
#[command(about = "AI code fixing and static analysis service for Python snippets")]
#[command(version)]
pub struct Cli {
    /// Log level (overrides CODEFIX_LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service (default)
    Serve {
        /// Address to bind (overrides CODEFIX_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides CODEFIX_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run pylint, mypy and bandit on a file and print the report
    Analyze {
        #[arg(index = 1)]
        file: PathBuf,
    },

    /// Ask the model to fix a file and print the result
    Fix {
        #[arg(index = 1)]
        file: PathBuf,
    },
}

impl Cli {
    /// Fold command line overrides into the environment-derived config
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(Commands::Serve { host, port }) = &self.command {
            if let Some(host) = host {
                config.host = host.clone();
            }
            if let Some(port) = port {
                config.port = *port;
            }
        }
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command {
        None | Some(Commands::Serve { .. }) => run_server(config).await,
        Some(Commands::Analyze { file }) => run_analyze(config, &file).await,
        Some(Commands::Fix { file }) => run_fix(config, &file).await,
    }
}

pub async fn run_server(config: AppConfig) -> Result<()> {
    let bind_address = config.bind_address();
    info!("Model: {} at {}", config.model.model, config.model.base_url);
    info!(
        "Tools: pylint={} mypy={} bandit={} (max {} concurrent)",
        config.tools.pylint.program,
        config.tools.mypy.program,
        config.tools.bandit.program,
        config.tools.max_concurrent
    );

    let state = Arc::new(create_app_state(config)?);
    let app = http_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn run_analyze(config: AppConfig, file: &Path) -> Result<()> {
    let code = read_source(file).await?;
    let state = create_app_state(config)?;
    let report = state.analyzer.analyze(&code).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_fix(config: AppConfig, file: &Path) -> Result<()> {
    let code = read_source(file).await?;
    let state = create_app_state(config)?;
    let result = state.fixer.fix(&code).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn read_source(file: &Path) -> Result<String> {
    tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
