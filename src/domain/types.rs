//! Shared domain types.
//!
//! These types are intentionally kept small and free of I/O so they can be:
//!
//! - built directly in tests
//! - filled by the CSV ingest and the date normalizer
//! - rendered by the report layer

use std::fmt;
use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Manifest used when neither `--manifest-url` nor `GTEMP_MANIFEST_URL` is set.
pub const DEFAULT_MANIFEST_URL: &str = "https://datahub.io/core/global-temp/datapackage.json";

/// Prefix that resource `path`s are appended to when downloading.
pub const DEFAULT_CDN_PREFIX: &str = "https://r2.datahub.io/clt98lqg6000el708ja5zbtz0/master/raw/";

pub const DEFAULT_RESOURCE: &str = "monthly";
pub const DEFAULT_DATE_COLUMN: &str = "Date";

/// How much of each resource descriptor is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InspectMode {
    /// Every key, in manifest order.
    All,
    /// Only `name` and `description`.
    Summary,
}

/// What the date normalizer does with a value it cannot parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DateErrors {
    /// Fail the whole conversion on the first bad value.
    Raise,
    /// Replace bad values with `NaT`.
    Coerce,
}

/// Fully resolved settings for one run (CLI > env > defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub manifest_url: String,
    pub cdn_prefix: String,
    pub resource_name: String,
    pub date_column: String,
    pub inspect_mode: InspectMode,
    pub date_errors: DateErrors,
    /// `None` means requests may block indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            cdn_prefix: DEFAULT_CDN_PREFIX.to_string(),
            resource_name: DEFAULT_RESOURCE.to_string(),
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            inspect_mode: InspectMode::All,
            date_errors: DateErrors::Raise,
            timeout: None,
        }
    }
}

/// Semantic type of a table column, named the way dataframe tools print them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Int64,
    Float64,
    Bool,
    Object,
    DateTime,
}

impl DType {
    pub fn as_str(self) -> &'static str {
        match self {
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Bool => "bool",
            DType::Object => "object",
            DType::DateTime => "datetime64[ns]",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column storage.
///
/// `Int64` and `Bool` columns never hold missing values; a column with gaps
/// is inferred as `Float64` (gaps are `NaN`) or `Object` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    Object(Vec<Option<String>>),
    DateTime(Vec<Option<NaiveDateTime>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Object(v) => v.len(),
            ColumnData::DateTime(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            ColumnData::Int64(_) => DType::Int64,
            ColumnData::Float64(_) => DType::Float64,
            ColumnData::Bool(_) => DType::Bool,
            ColumnData::Object(_) => DType::Object,
            ColumnData::DateTime(_) => DType::DateTime,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    /// Render one cell the way it appears in a printed table.
    pub fn display_cell(&self, row: usize) -> String {
        self.display_cell_with(row, self.is_date_only())
    }

    /// True for a datetime column whose values all fall on midnight.
    ///
    /// Such columns print without a time part. Renderers that print many
    /// cells should call this once and pass the result to
    /// [`Column::display_cell_with`].
    pub fn is_date_only(&self) -> bool {
        match &self.data {
            ColumnData::DateTime(v) => v
                .iter()
                .flatten()
                .all(|dt| dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0),
            _ => false,
        }
    }

    /// Like [`Column::display_cell`], with the column-wide date-only flag
    /// already computed.
    pub fn display_cell_with(&self, row: usize, date_only: bool) -> String {
        match &self.data {
            ColumnData::Int64(v) => v.get(row).map(|x| x.to_string()).unwrap_or_default(),
            ColumnData::Float64(v) => v.get(row).map(|x| format_float(*x)).unwrap_or_default(),
            ColumnData::Bool(v) => v
                .get(row)
                .map(|b| if *b { "True" } else { "False" }.to_string())
                .unwrap_or_default(),
            ColumnData::Object(v) => match v.get(row) {
                Some(Some(s)) => s.clone(),
                Some(None) => "NaN".to_string(),
                None => String::new(),
            },
            ColumnData::DateTime(v) => match v.get(row) {
                Some(Some(dt)) if date_only => dt.format("%Y-%m-%d").to_string(),
                Some(Some(dt)) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
                Some(None) => "NaT".to_string(),
                None => String::new(),
            },
        }
    }
}

/// Magnitudes outside `[SCIENTIFIC_BELOW, SCIENTIFIC_FROM)` print in
/// scientific notation so they do not round to `0.0` or grow unreadably long.
const SCIENTIFIC_BELOW: f64 = 1e-4;
const SCIENTIFIC_FROM: f64 = 1e16;

/// Up to six decimals, trailing zeros dropped, but always one decimal place.
///
/// Very small or very large magnitudes use `1.500000e-09` style instead.
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = x.abs();
    if magnitude != 0.0 && !(SCIENTIFIC_BELOW..SCIENTIFIC_FROM).contains(&magnitude) {
        return format_scientific(x);
    }
    let mut s = format!("{x:.6}");
    while s.ends_with('0') && !s.ends_with(".0") {
        s.pop();
    }
    if s == "-0.0" {
        s = "0.0".to_string();
    }
    s
}

/// Six-digit mantissa and a signed, at least two-digit exponent.
fn format_scientific(x: f64) -> String {
    let s = format!("{x:.6e}");
    let Some((mantissa, exp)) = s.split_once('e') else {
        return s;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return s;
    };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
}

/// In-memory tabular dataset: named columns of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Per-column type summary, in column order.
    pub fn dtypes(&self) -> Vec<(&str, DType)> {
        self.columns.iter().map(|c| (c.name.as_str(), c.dtype())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn float_cells_trim_trailing_zeros() {
        let col = Column::new("Mean", ColumnData::Float64(vec![0.7895, 1.0, f64::NAN, -0.25]));
        assert_eq!(col.display_cell(0), "0.7895");
        assert_eq!(col.display_cell(1), "1.0");
        assert_eq!(col.display_cell(2), "NaN");
        assert_eq!(col.display_cell(3), "-0.25");
    }

    #[test]
    fn tiny_and_huge_floats_use_scientific_notation() {
        assert_eq!(format_float(1e-7), "1.000000e-07");
        assert_eq!(format_float(1.5e-9), "1.500000e-09");
        assert_eq!(format_float(-2.5e-5), "-2.500000e-05");
        assert_eq!(format_float(1e-4), "0.0001");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(2e20), "2.000000e+20");
        assert_eq!(format_float(1e-300), "1.000000e-300");
    }

    #[test]
    fn date_only_flag_matches_per_cell_rendering() {
        let d = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let t = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap().and_hms_opt(6, 30, 0).unwrap();

        let midnight = Column::new("Date", ColumnData::DateTime(vec![Some(d), None]));
        assert!(midnight.is_date_only());
        let mixed = Column::new("Date", ColumnData::DateTime(vec![Some(d), Some(t)]));
        assert!(!mixed.is_date_only());
        assert!(!Column::new("Year", ColumnData::Int64(vec![1880])).is_date_only());

        assert_eq!(mixed.display_cell_with(1, false), "2016-01-01 06:30:00");
        assert_eq!(midnight.display_cell_with(0, true), midnight.display_cell(0));
        assert_eq!(mixed.display_cell_with(0, false), mixed.display_cell(0));
    }

    #[test]
    fn datetime_cells_drop_midnight_time() {
        let d = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let col = Column::new("Date", ColumnData::DateTime(vec![Some(d), None]));
        assert_eq!(col.display_cell(0), "2016-01-01");
        assert_eq!(col.display_cell(1), "NaT");

        let t = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap().and_hms_opt(6, 30, 0).unwrap();
        let col = Column::new("Date", ColumnData::DateTime(vec![Some(d), Some(t)]));
        assert_eq!(col.display_cell(0), "2016-01-01 00:00:00");
    }

    #[test]
    fn dtypes_follow_column_order() {
        let table = Table::new(vec![
            Column::new("Source", ColumnData::Object(vec![Some("GCAG".into())])),
            Column::new("Mean", ColumnData::Float64(vec![0.5])),
        ]);
        let dtypes = table.dtypes();
        assert_eq!(dtypes, vec![("Source", DType::Object), ("Mean", DType::Float64)]);
        assert_eq!(DType::DateTime.to_string(), "datetime64[ns]");
        assert_eq!(table.n_rows(), 1);
    }
}
