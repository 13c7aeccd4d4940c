//! Picking the resource to download and composing its URL.

use crate::data::package::ResourceDescriptor;
use crate::error::AppError;

/// True when `resource` is tabular and named exactly `name`.
pub fn matches_resource(resource: &ResourceDescriptor, name: &str) -> bool {
    resource.is_tabular() && resource.name() == Some(name)
}

/// Index of the first tabular resource called `name`, if any.
pub fn select_resource(resources: &[ResourceDescriptor], name: &str) -> Option<usize> {
    resources.iter().position(|r| matches_resource(r, name))
}

/// `prefix + path`, verbatim. No escaping or URL validation happens here.
pub fn download_url(prefix: &str, resource: &ResourceDescriptor) -> Result<String, AppError> {
    let path = resource.path().ok_or_else(|| {
        AppError::new(
            3,
            format!(
                "Resource '{}' has no usable `path`.",
                resource.name().unwrap_or("<unnamed>")
            ),
        )
    })?;
    Ok(format!("{prefix}{path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn resources(value: Value) -> Vec<ResourceDescriptor> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn selects_tabular_monthly_only() {
        let list = resources(json!([
            {"name": "annual", "tabular": true, "path": "data/annual.csv"},
            {"name": "monthly", "tabular": false, "path": "data/other.csv"},
            {"name": "monthly", "tabular": true, "path": "data/monthly.csv"},
            {"name": "monthly", "tabular": true, "path": "data/later.csv"}
        ]));
        assert_eq!(select_resource(&list, "monthly"), Some(2));
        assert_eq!(select_resource(&list, "Monthly"), None);
        assert_eq!(select_resource(&list, "daily"), None);
    }

    #[test]
    fn url_is_prefix_plus_path() {
        let list = resources(json!([
            {"name": "monthly", "tabular": true, "path": "data/monthly.csv"}
        ]));
        let url = download_url("https://cdn.example/raw/", &list[0]).unwrap();
        assert_eq!(url, "https://cdn.example/raw/data/monthly.csv");
    }

    #[test]
    fn missing_path_is_a_data_error() {
        let list = resources(json!([{"name": "monthly", "tabular": true}]));
        let err = download_url("https://cdn.example/", &list[0]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("monthly"));
    }
}
