//! Command-line argument definitions for the CEDEN refresh
//!
//! The CLI is defined with the clap derive API. `process` runs a full
//! refresh, `subset` re-runs a topic extract over an existing file and
//! `classify` reports the quality categories of an existing export.

use crate::error::{CedenError, Result};
use crate::models::DatasetKind;
use crate::subset::SubsetPreset;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the CEDEN refresh
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ceden-refresh",
    version,
    about = "Clean CEDEN water-quality exports, assign data-quality categories and split them into yearly portal files",
    long_about = "Reads CEDEN warehouse exports, repairs values the open-data portal cannot load, \
                  assigns each record a data-quality category from the QA code tables and writes \
                  all-years files, per-year buckets, a site directory and topic extracts."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run a full refresh over the configured datasets
    Process(ProcessArgs),
    /// Filter an existing output file down to a list of analytes
    Subset(SubsetArgs),
    /// Report data-quality categories for an existing export
    Classify(ClassifyArgs),
}

/// Arguments for the process command
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// TOML configuration file
    ///
    /// Defaults to `<config dir>/ceden-refresh/config.toml` when that file exists.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Directory holding the table exports
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input_path: Option<PathBuf>,

    /// Directory receiving the output files and manifest
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output_path: Option<PathBuf>,

    /// Field delimiter for exports and outputs
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Station export used for datum backfill when no stations dataset runs
    #[arg(long = "stations-file", value_name = "FILE")]
    pub stations_file: Option<PathBuf>,

    /// First year of the yearly buckets
    #[arg(long = "first-year", value_name = "YEAR")]
    pub first_year: Option<i32>,

    /// Last year of the yearly buckets (defaults to the run year)
    #[arg(long = "last-year", value_name = "YEAR", requires = "first_year")]
    pub last_year: Option<i32>,

    /// Minimum bucket size in bytes; smaller buckets are deleted
    #[arg(long = "min-bucket-bytes", value_name = "BYTES")]
    pub min_bucket_bytes: Option<u64>,

    /// Date stamped into output file names (YYYY-MM-DD, defaults to today)
    #[arg(long = "run-date", value_name = "DATE")]
    pub run_date: Option<chrono::NaiveDate>,

    /// Datasets to process, by output name or tag
    #[arg(
        short = 'd',
        long = "datasets",
        value_name = "LIST",
        help = "Comma-separated list of datasets to process",
        long_help = "Comma-separated subset of the configured datasets, given by output name \
                     (WaterChemistryData) or tag (water_chemistry). Configured order is kept."
    )]
    pub datasets: Option<DatasetList>,

    /// Show what would be processed without creating output files
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the subset command
#[derive(Debug, Clone, Parser)]
pub struct SubsetArgs {
    /// Output file to filter
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input_file: PathBuf,

    /// Built-in extract (safe-to-swim, pesticides)
    #[arg(long = "preset", value_name = "NAME", conflicts_with_all = ["field", "values"])]
    pub preset: Option<SubsetPresetArg>,

    /// Column compared against the allow-list
    #[arg(long = "field", value_name = "COLUMN", requires = "values")]
    pub field: Option<String>,

    /// Comma-separated allow-list (exact, case-sensitive)
    #[arg(long = "values", value_name = "LIST", value_delimiter = ',', requires = "field")]
    pub values: Vec<String>,

    /// Output file stem, defaults to the preset name
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub name: Option<String>,

    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output_path: Option<PathBuf>,

    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Arguments for the classify command
#[derive(Debug, Clone, Parser)]
pub struct ClassifyArgs {
    /// Export to classify
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input_file: PathBuf,

    /// Dataset kind the export belongs to, by output name or tag
    #[arg(short = 'k', long = "kind", value_name = "KIND")]
    pub kind: DatasetKindArg,

    #[arg(long = "delimiter", value_name = "CHAR", default_value_t = ',')]
    pub delimiter: char,

    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(long = "output-format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Output format options for machine-readable results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Csv,
}

/// Wrapper for parsing comma-separated dataset lists
#[derive(Debug, Clone)]
pub struct DatasetList {
    pub datasets: Vec<String>,
}

impl FromStr for DatasetList {
    type Err = CedenError;

    fn from_str(s: &str) -> Result<Self> {
        let datasets: Vec<String> = s
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if datasets.is_empty() {
            return Err(CedenError::configuration("Dataset list cannot be empty"));
        }

        Ok(DatasetList { datasets })
    }
}

/// Dataset kind given on the command line
#[derive(Debug, Clone, Copy)]
pub struct DatasetKindArg(pub DatasetKind);

impl FromStr for DatasetKindArg {
    type Err = CedenError;

    fn from_str(s: &str) -> Result<Self> {
        DatasetKind::from_name(s.trim()).map(DatasetKindArg).ok_or_else(|| {
            CedenError::configuration(format!(
                "Unknown dataset kind '{}'. Available: {}",
                s,
                DatasetKind::ALL
                    .iter()
                    .map(|kind| kind.tag())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }
}

/// Subset preset given on the command line
#[derive(Debug, Clone, Copy)]
pub struct SubsetPresetArg(pub SubsetPreset);

impl FromStr for SubsetPresetArg {
    type Err = CedenError;

    fn from_str(s: &str) -> Result<Self> {
        SubsetPreset::from_name(s).map(SubsetPresetArg).ok_or_else(|| {
            CedenError::configuration(format!(
                "Unknown subset preset '{}'. Available: safe-to-swim, pesticides",
                s
            ))
        })
    }
}

/// Map a `-v` count to a tracing level name
fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

impl ProcessArgs {
    /// Validate the process command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(input_path) = &self.input_path {
            if !input_path.is_dir() {
                return Err(CedenError::configuration(format!(
                    "Input path is not a directory: {}",
                    input_path.display()
                )));
            }
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(CedenError::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if let (Some(first), Some(last)) = (self.first_year, self.last_year) {
            if last < first {
                return Err(CedenError::configuration(format!(
                    "--last-year {} is before --first-year {}",
                    last, first
                )));
            }
        }

        Ok(())
    }

    pub fn get_datasets(&self) -> Option<Vec<String>> {
        self.datasets.as_ref().map(|list| list.datasets.clone())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            log_level(self.verbose)
        }
    }

    /// Progress output is shown for human reports outside quiet mode
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}

impl SubsetArgs {
    pub fn validate(&self) -> Result<()> {
        if !self.input_file.is_file() {
            return Err(CedenError::configuration(format!(
                "Input file does not exist: {}",
                self.input_file.display()
            )));
        }
        if self.preset.is_none() && self.field.is_none() {
            return Err(CedenError::configuration(
                "Either --preset or --field with --values is required",
            ));
        }
        if self.preset.is_none() && self.name.is_none() {
            return Err(CedenError::configuration(
                "--name is required when filtering on --field",
            ));
        }
        Ok(())
    }

    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose)
    }
}

impl ClassifyArgs {
    pub fn validate(&self) -> Result<()> {
        if !self.input_file.is_file() {
            return Err(CedenError::configuration(format!(
                "Input file does not exist: {}",
                self.input_file.display()
            )));
        }
        if !self.delimiter.is_ascii() {
            return Err(CedenError::configuration(
                "Delimiter must be a single ASCII character",
            ));
        }
        Ok(())
    }

    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose)
    }
}
