//! Blocking HTTP access to the manifest and resource files.

use std::time::Duration;

use log::{debug, info};
use reqwest::StatusCode;
use reqwest::blocking::Client;

use crate::data::package::DataPackage;
use crate::domain::Table;
use crate::error::AppError;

/// Anything that can turn a URL into a text body.
///
/// The pipeline only talks to this trait, so tests can swap the network for
/// canned responses.
pub trait TextSource {
    fn get_text(&self, url: &str) -> Result<String, AppError>;
}

pub struct PackageClient {
    client: Client,
}

impl PackageClient {
    /// Build a client; `None` disables the request timeout entirely.
    pub fn new(timeout: Option<Duration>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl TextSource for PackageClient {
    fn get_text(&self, url: &str) -> Result<String, AppError> {
        info!("GET {url}");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::new(4, format!("Request to {url} failed: {e}")))?;

        let status = resp.status();
        check_status(url, status)?;

        let body = resp.text().map_err(|e| {
            AppError::new(4, format!("Failed to read response body from {url}: {e}"))
        })?;
        debug!("{url}: {status}, {} bytes", body.len());
        Ok(body)
    }
}

/// Any non-2xx answer is a network failure (exit code 4).
fn check_status(url: &str, status: StatusCode) -> Result<(), AppError> {
    if status.is_success() {
        return Ok(());
    }
    Err(AppError::new(
        4,
        format!("Request to {url} failed with status {status}."),
    ))
}

/// Fetch and parse a data-package manifest.
pub fn load_package(source: &impl TextSource, manifest_url: &str) -> Result<DataPackage, AppError> {
    let body = source.get_text(manifest_url)?;
    let package = DataPackage::from_json_str(&body)?;
    info!(
        "loaded package '{}' with {} resource(s)",
        package.name().unwrap_or("<unnamed>"),
        package.resources.len()
    );
    Ok(package)
}

/// Fetch a CSV resource and load it as a table.
pub fn fetch_table(source: &impl TextSource, url: &str) -> Result<Table, AppError> {
    let body = source.get_text(url)?;
    crate::io::ingest::read_csv_str(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_success_status_is_a_network_error() {
        let url = "https://cdn.example/raw/data/monthly.csv";
        assert!(check_status(url, StatusCode::OK).is_ok());

        let err = check_status(url, StatusCode::NOT_FOUND).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("404"));
        assert!(err.message().contains(url));

        let err = check_status(url, StatusCode::INTERNAL_SERVER_ERROR).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn client_builds_with_and_without_timeout() {
        assert!(PackageClient::new(None).is_ok());
        assert!(PackageClient::new(Some(Duration::from_secs(5))).is_ok());
    }
}
