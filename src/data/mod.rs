//! Remote data access.
//!
//! - manifest parsing + descriptor defaults (`package`)
//! - resource selection + URL composition (`select`)
//! - blocking HTTP (`client`)

pub mod client;
pub mod package;
pub mod select;

pub use client::{PackageClient, TextSource, fetch_table, load_package};
pub use package::{DataPackage, ResourceDescriptor};
pub use select::{download_url, matches_resource, select_resource};
