//! Command-line parsing for the data-package fetcher.
//!
//! Only flags live here; resolving them against the environment happens in
//! `app::run_config_from_args`.

use clap::Parser;

use crate::domain::{DEFAULT_DATE_COLUMN, DEFAULT_RESOURCE, DateErrors, InspectMode};

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "gtemp",
    version,
    about = "Inspect a data package and load its monthly global temperature table"
)]
pub struct Cli {
    /// Data-package manifest URL (env: GTEMP_MANIFEST_URL).
    #[arg(long, value_name = "URL")]
    pub manifest_url: Option<String>,

    /// Prefix prepended to the resource `path` when downloading (env: GTEMP_CDN_PREFIX).
    #[arg(long, value_name = "URL")]
    pub cdn_prefix: Option<String>,

    /// Name of the tabular resource to download.
    #[arg(short = 'r', long, default_value = DEFAULT_RESOURCE)]
    pub resource: String,

    /// Column converted to datetime after download.
    #[arg(long, default_value = DEFAULT_DATE_COLUMN)]
    pub date_column: String,

    /// How much of each descriptor to print.
    #[arg(long, value_enum, default_value_t = InspectMode::All)]
    pub inspect: InspectMode,

    /// What to do with values that are not dates.
    #[arg(long, value_enum, default_value_t = DateErrors::Raise)]
    pub date_errors: DateErrors,

    /// Per-request timeout in seconds; unset means no timeout (env: GTEMP_TIMEOUT_SECS).
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}
