//! Column normalization applied after ingest.

pub mod dates;

pub use dates::{DateFormat, to_datetime};
