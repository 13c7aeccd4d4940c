//! Input helpers.
//!
//! - CSV ingest + type inference (`ingest`)

pub mod ingest;

pub use ingest::*;
