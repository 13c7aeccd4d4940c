//! Data-package manifests (`datapackage.json`) and their resource descriptors.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::AppError;

const PROFILE_DATA_RESOURCE: &str = "data-resource";
const PROFILE_TABULAR: &str = "tabular-data-resource";
const DEFAULT_ENCODING: &str = "utf-8";
const DEFAULT_FIELD_TYPE: &str = "string";
const DEFAULT_FIELD_FORMAT: &str = "default";

/// Formats treated as tabular when a descriptor does not say so explicitly.
const TABULAR_FORMATS: [&str; 4] = ["csv", "tsv", "xls", "xlsx"];

/// One manifest entry: an ordered map of arbitrary metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceDescriptor(Map<String, Value>);

impl ResourceDescriptor {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Key/value pairs in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.get("description").and_then(Value::as_str)
    }

    pub fn profile(&self) -> Option<&str> {
        self.get("profile").and_then(Value::as_str)
    }

    pub fn format(&self) -> Option<&str> {
        self.get("format").and_then(Value::as_str)
    }

    /// Relative location of the data. Multi-part paths yield their first part.
    pub fn path(&self) -> Option<&str> {
        match self.get("path")? {
            Value::String(s) => Some(s),
            Value::Array(parts) => parts.first().and_then(Value::as_str),
            _ => None,
        }
    }

    /// Whether the resource holds rows and columns.
    ///
    /// An explicit boolean `tabular` key wins; otherwise the profile, then the
    /// declared format, then the path extension decide.
    pub fn is_tabular(&self) -> bool {
        if let Some(flag) = self.get("tabular").and_then(Value::as_bool) {
            return flag;
        }
        if self.profile() == Some(PROFILE_TABULAR) {
            return true;
        }
        if let Some(format) = self.format() {
            return is_tabular_format(format);
        }
        self.path()
            .and_then(path_extension)
            .is_some_and(is_tabular_format)
    }

    /// Fill in the defaults a data-package reader applies to every resource.
    ///
    /// Existing keys are never overwritten; new keys go after the manifest's own.
    pub fn expand(&mut self) {
        if !self.0.contains_key("profile") {
            self.0
                .insert("profile".to_string(), Value::String(PROFILE_DATA_RESOURCE.to_string()));
        }
        if !self.0.contains_key("encoding") {
            self.0
                .insert("encoding".to_string(), Value::String(DEFAULT_ENCODING.to_string()));
        }

        if self.profile() != Some(PROFILE_TABULAR) {
            return;
        }
        if let Some(schema) = self.0.get_mut("schema").and_then(Value::as_object_mut) {
            expand_schema(schema);
        }
        if let Some(dialect) = self.0.get_mut("dialect").and_then(Value::as_object_mut) {
            expand_dialect(dialect);
        }
    }
}

fn expand_schema(schema: &mut Map<String, Value>) {
    if let Some(fields) = schema.get_mut("fields").and_then(Value::as_array_mut) {
        for field in fields.iter_mut().filter_map(Value::as_object_mut) {
            field
                .entry("type")
                .or_insert_with(|| Value::String(DEFAULT_FIELD_TYPE.to_string()));
            field
                .entry("format")
                .or_insert_with(|| Value::String(DEFAULT_FIELD_FORMAT.to_string()));
        }
    }
    schema
        .entry("missingValues")
        .or_insert_with(|| json!([""]));
}

fn expand_dialect(dialect: &mut Map<String, Value>) {
    let defaults = [
        ("delimiter", json!(",")),
        ("doubleQuote", json!(true)),
        ("lineTerminator", json!("\r\n")),
        ("quoteChar", json!("\"")),
        ("skipInitialSpace", json!(true)),
        ("header", json!(true)),
        ("caseSensitive", json!(false)),
    ];
    for (key, value) in defaults {
        dialect.entry(key).or_insert(value);
    }
}

fn is_tabular_format(format: &str) -> bool {
    TABULAR_FORMATS.iter().any(|f| f.eq_ignore_ascii_case(format))
}

fn path_extension(path: &str) -> Option<&str> {
    let file = path.rsplit('/').next()?;
    let (_, ext) = file.rsplit_once('.')?;
    Some(ext)
}

/// A parsed manifest: package-level metadata plus its resources, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPackage {
    pub metadata: Map<String, Value>,
    pub resources: Vec<ResourceDescriptor>,
}

impl DataPackage {
    /// Parse and expand a manifest body.
    pub fn from_json_str(text: &str) -> Result<Self, AppError> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| AppError::new(4, format!("Failed to parse data package manifest: {e}")))?;

        let Value::Object(mut metadata) = root else {
            return Err(AppError::new(2, "Data package manifest must be a JSON object."));
        };

        let raw = match metadata.remove("resources") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(AppError::new(2, "Data package `resources` must be an array.")),
            None => return Err(AppError::new(2, "Data package manifest has no `resources`.")),
        };

        let mut resources = Vec::with_capacity(raw.len());
        for (idx, item) in raw.into_iter().enumerate() {
            let Value::Object(map) = item else {
                return Err(AppError::new(
                    2,
                    format!("Resource #{idx} in data package is not a JSON object."),
                ));
            };
            let mut resource = ResourceDescriptor::new(map);
            resource.expand();
            debug!(
                "resource #{idx} '{}': {} keys after expansion, tabular={}",
                resource.name().unwrap_or("<unnamed>"),
                resource.len(),
                resource.is_tabular()
            );
            resources.push(resource);
        }

        Ok(Self { metadata, resources })
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.get("name").and_then(Value::as_str)
    }
}
