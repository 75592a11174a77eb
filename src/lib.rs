//! CEDEN Refresh Library
//!
//! Turns CEDEN water-quality warehouse exports into the files published on
//! the open-data portal.
//!
//! This library provides tools for:
//! - Repairing exported values the portal loader rejects
//! - Backfilling station datums from the station directory
//! - Assigning a data-quality category to each record from the QA code tables
//! - Partitioning each dataset into an all-years file and yearly buckets
//! - Building the deduplicated site directory and analyte subsets
//! - Recording every produced file in a manifest for the uploader

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod processor;
pub mod quality;
pub mod sites;
pub mod subset;
pub mod upload;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::CedenConfig;
pub use error::{CedenError, Result};
pub use models::{DatasetKind, QualityCategory, QualityVerdict, Record};
pub use processor::{DatasetProcessor, RefreshOutcome};
