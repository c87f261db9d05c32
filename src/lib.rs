pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::OutputFormat;
use crate::core::RateRequest;
use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

/// Loads config, builds the provider registry, runs `request` and renders the result.
pub async fn execute_command(
    request: &RateRequest,
    format: OutputFormat,
    config_path: Option<&str>,
) -> Result<String> {
    info!(operation = ?request.operation, "xrates starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let registry = providers::build_registry(&config)?;
    let response = crate::core::request::execute(&registry, request).await?;
    cli::render(&response, format)
}

pub async fn run_command(
    request: &RateRequest,
    format: OutputFormat,
    config_path: Option<&str>,
) -> Result<()> {
    let output = execute_command(request, format, config_path).await?;
    println!("{output}");
    Ok(())
}
