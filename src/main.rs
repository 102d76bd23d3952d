// src/main.rs

use anyhow::Result;
use clap::Parser;
use std::str::FromStr;
use tracing::{Level, warn};
use tracing_subscriber::FmtSubscriber;

use codefix::cli::{self, Cli};
use codefix::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    cli.apply_overrides(&mut config);

    // Logs go to stderr so `analyze`/`fix` output on stdout stays clean JSON
    let level = Level::from_str(&config.log_level).ok();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level.unwrap_or(Level::INFO))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    if level.is_none() {
        warn!("Unknown log level '{}', using info", config.log_level);
    }

    config.validate()?;
    cli::run(cli, config).await
}
