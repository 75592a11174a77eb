//! Error handling for CEDEN refresh operations.
//!
//! Provides error types with context for configuration mismatches,
//! table extraction, record classification and output file failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CedenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Failed to parse configuration file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Code table for {kind} references unknown field '{field}'")]
    UnknownCodeField { kind: String, field: String },

    #[error("Invalid severity {severity} for code '{code}' in field '{field}' (expected 0-6)")]
    InvalidSeverity {
        field: String,
        code: String,
        severity: u8,
    },

    #[error("Extraction failed for table {table}: {reason}")]
    Extraction { table: String, reason: String },

    #[error("Cannot read a sample year from {field} value '{value}'")]
    SampleYear { field: String, value: String },

    #[error("Column '{column}' not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Failed to write manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl CedenError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an extraction error naming the source table
    pub fn extraction(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Extraction {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that only affect a single record and can be skipped
    pub fn is_record_level(&self) -> bool {
        matches!(self, Self::SampleYear { .. })
    }
}

pub type Result<T> = std::result::Result<T, CedenError>;
