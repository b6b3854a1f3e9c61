mod cli;
mod commands;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use razed::domain::config::{AppConfig, LoggingConfig};
use razed::events::TracingSink;
use razed::kernel::config::load_config;
use razed_logger::{Logger, parse_level};
use std::sync::Arc;

#[razed_runtime::main(compact)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg: AppConfig =
        load_config(cli.config.as_deref()).context("Critical: Configuration is malformed")?;
    let _log = init_logger(&cfg.logging)?;

    let service = razed::bootstrap(cfg, Arc::new(TracingSink))
        .await
        .context("Critical: Progression core failed to start")?;

    let result = commands::run(&service, cli.command).await;
    service.flush().await?;
    result
}

fn init_logger(cfg: &LoggingConfig) -> anyhow::Result<Logger> {
    let builder = Logger::builder()
        .name(env!("CARGO_BIN_NAME"))
        .level(parse_level(&cfg.level)?)
        .console(cfg.console);
    let builder = if cfg.json { builder.json() } else { builder };

    let logger = match &cfg.directory {
        Some(directory) => builder.path(directory).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}
