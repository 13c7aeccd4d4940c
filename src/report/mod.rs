//! Reporting utilities: descriptor dumps and formatted table output.
//!
//! Formatting lives in one place so data handling stays free of printing.

pub mod descriptor;
pub mod format;

pub use descriptor::{SEPARATOR, format_resource, format_separator, format_value};
pub use format::{format_dtypes, format_table};
