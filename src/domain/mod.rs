//! Domain types used throughout the run.
//!
//! This module defines:
//!
//! - run configuration (`RunConfig`, `InspectMode`, `DateErrors`)
//! - the in-memory table (`Table`, `Column`, `ColumnData`, `DType`)

pub mod types;

pub use types::*;
