//! Human-readable resource descriptor dumps.

use serde_json::Value;

use crate::data::ResourceDescriptor;
use crate::domain::InspectMode;

/// Line printed after each resource block.
pub const SEPARATOR: &str = "---------------------------------------------";

const SUMMARY_KEYS: [&str; 2] = ["description", "name"];

/// `Resource` header followed by one `key : value` line per printed key.
pub fn format_resource(resource: &ResourceDescriptor, mode: InspectMode) -> String {
    let mut out = String::from("Resource\n");
    for (key, value) in resource.iter() {
        if mode == InspectMode::Summary && !SUMMARY_KEYS.contains(&key.as_str()) {
            continue;
        }
        out.push_str(&format!("{key} : {}\n", format_value(value)));
    }
    out
}

/// Strings print bare; everything else as compact JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Separator plus the trailing blank line.
pub fn format_separator() -> String {
    format!("{SEPARATOR}\n\n")
}
