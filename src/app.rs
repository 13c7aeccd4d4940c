//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - resolves the run configuration
//! - hands a live HTTP client and stdout to the pipeline

use std::time::Duration;

use clap::Parser;

use crate::cli::Cli;
use crate::data::PackageClient;
use crate::domain::{DEFAULT_CDN_PREFIX, DEFAULT_MANIFEST_URL, RunConfig};
use crate::error::AppError;

pub mod pipeline;

pub const ENV_MANIFEST_URL: &str = "GTEMP_MANIFEST_URL";
pub const ENV_CDN_PREFIX: &str = "GTEMP_CDN_PREFIX";
pub const ENV_TIMEOUT_SECS: &str = "GTEMP_TIMEOUT_SECS";

/// Entry point for the `gtemp` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = run_config_from_args(&cli, |key| std::env::var(key).ok())?;

    let client = PackageClient::new(config.timeout)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    pipeline::run(&config, &client, &mut out)?;
    Ok(())
}

/// Resolve settings: CLI flag, then environment, then built-in default.
///
/// `env` is the variable lookup; blank values count as unset.
pub fn run_config_from_args(
    cli: &Cli,
    env: impl Fn(&str) -> Option<String>,
) -> Result<RunConfig, AppError> {
    let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let manifest_url = cli
        .manifest_url
        .clone()
        .or_else(|| env(ENV_MANIFEST_URL))
        .unwrap_or_else(|| DEFAULT_MANIFEST_URL.to_string());

    let cdn_prefix = cli
        .cdn_prefix
        .clone()
        .or_else(|| env(ENV_CDN_PREFIX))
        .unwrap_or_else(|| DEFAULT_CDN_PREFIX.to_string());

    let timeout_secs = match cli.timeout_secs {
        Some(secs) => Some(secs),
        None => env(ENV_TIMEOUT_SECS)
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    AppError::new(2, format!("Invalid {ENV_TIMEOUT_SECS} '{raw}': {e}"))
                })
            })
            .transpose()?,
    };

    Ok(RunConfig {
        manifest_url,
        cdn_prefix,
        resource_name: cli.resource.clone(),
        date_column: cli.date_column.clone(),
        inspect_mode: cli.inspect,
        date_errors: cli.date_errors,
        timeout: timeout_secs.map(Duration::from_secs),
    })
}
