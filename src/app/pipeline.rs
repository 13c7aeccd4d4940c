//! The single pass behind `gtemp`:
//! manifest fetch -> descriptor dump -> resource download -> date normalization.
//!
//! Output goes to any `Write` so the whole run can be driven from tests with a
//! fake `TextSource` and a byte buffer.

use std::io::Write;

use log::{info, warn};

use crate::data::{
    DataPackage, ResourceDescriptor, TextSource, download_url, fetch_table, load_package,
    select_resource,
};
use crate::domain::{RunConfig, Table};
use crate::error::AppError;
use crate::normalize::to_datetime;
use crate::report::{format_dtypes, format_resource, format_separator, format_table};

/// The downloaded and normalized resource.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub resource_name: String,
    pub url: String,
    pub table: Table,
    /// Values turned into `NaT` under `DateErrors::Coerce`.
    pub coerced_dates: usize,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub package: DataPackage,
    pub dataset: Dataset,
}

/// Execute the full run, writing the human-readable report to `out`.
///
/// Every resource is printed. Only the first tabular resource matching
/// `config.resource_name` is downloaded; if there is none, nothing is fetched
/// after the manifest and the run fails with exit code 3.
pub fn run(
    config: &RunConfig,
    source: &impl TextSource,
    out: &mut impl Write,
) -> Result<RunOutput, AppError> {
    let package = load_package(source, &config.manifest_url)?;
    let target = select_resource(&package.resources, &config.resource_name);
    if let Some(idx) = target {
        info!("selected resource #{idx} '{}'", config.resource_name);
    }

    let mut dataset = None;
    for (idx, resource) in package.resources.iter().enumerate() {
        emit(out, &format_resource(resource, config.inspect_mode))?;
        if target == Some(idx) {
            dataset = Some(fetch_and_normalize(config, source, resource, out)?);
        }
        emit(out, &format_separator())?;
    }

    let Some(dataset) = dataset else {
        warn!(
            "no tabular resource named '{}' in {} resource(s)",
            config.resource_name,
            package.resources.len()
        );
        return Err(AppError::new(
            3,
            format!(
                "Resource '{}' not found among tabular resources.",
                config.resource_name
            ),
        ));
    };

    Ok(RunOutput { package, dataset })
}

fn fetch_and_normalize(
    config: &RunConfig,
    source: &impl TextSource,
    resource: &ResourceDescriptor,
    out: &mut impl Write,
) -> Result<Dataset, AppError> {
    let url = download_url(&config.cdn_prefix, resource)?;
    info!("downloading '{}' from {url}", config.resource_name);

    let mut table = fetch_table(source, &url)?;
    emit(out, &format!("{}\n", format_table(&table)))?;
    emit(out, &format!("{}\n", format_dtypes(&table)))?;

    emit(out, "Converting to date type...\n")?;
    let coerced_dates = to_datetime(&mut table, &config.date_column, config.date_errors)?;
    emit(out, &format!("{}\n", format_table(&table)))?;
    emit(out, &format!("{}\n", format_dtypes(&table)))?;

    Ok(Dataset {
        resource_name: config.resource_name.clone(),
        url,
        table,
        coerced_dates,
    })
}

fn emit(out: &mut impl Write, text: &str) -> Result<(), AppError> {
    out.write_all(text.as_bytes())
        .map_err(|e| AppError::new(1, format!("Failed to write output: {e}")))
}
