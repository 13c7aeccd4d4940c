//! `global-temp` library crate.
//!
//! The binary (`gtemp`) is a thin wrapper around this library so that:
//!
//! - the fetch/inspect/normalize pass is testable without network access
//! - formatting stays separate from data handling

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod normalize;
pub mod report;
