//! Configuration management and validation.
//!
//! Provides the refresh configuration: where table exports are read from
//! and written to, the dataset kinds to process, year bucketing, topic
//! subsets, upload targets and QA code overrides. Configuration is layered
//! from defaults, an optional TOML file, environment variables and finally
//! command-line flags.

use crate::constants::{DEFAULT_FIRST_YEAR, DEFAULT_MIN_BUCKET_BYTES, YEAR_BUCKET_PREFIX};
use crate::error::{CedenError, Result};
use crate::models::DatasetKind;
use crate::quality::MAX_SEVERITY;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the export directory
pub const ENV_INPUT_DIR: &str = "CEDEN_INPUT_DIR";

/// Environment variable overriding the output directory
pub const ENV_OUTPUT_DIR: &str = "CEDEN_OUTPUT_DIR";

/// Global configuration for a CEDEN refresh run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CedenConfig {
    /// Directory holding the table exports (`<table><extension>`)
    pub input_dir: PathBuf,

    /// Directory the refreshed files are written to
    pub output_dir: PathBuf,

    /// Field delimiter for both input exports and output files
    pub delimiter: char,

    /// File extension including the leading dot
    pub extension: String,

    /// Date stamped into every output file name, today when unset
    pub run_date: Option<NaiveDate>,

    /// How records are partitioned by sample year
    pub buckets: BucketScheme,

    /// Bucket files at or below this size are discarded after a pass
    pub min_bucket_bytes: u64,

    /// Dataset kinds to process, in order
    pub datasets: Vec<DatasetConfig>,

    /// Existing stations export used for datum backfill when the stations
    /// kind is not part of the run
    pub stations_file: Option<PathBuf>,

    /// Topic extracts produced after the main pass
    pub subsets: Vec<SubsetConfig>,

    /// Portal resources fed from the manifest
    pub uploads: Vec<UploadTarget>,

    /// Extra or replacement QA codes: field -> code -> severity
    pub code_table_overrides: BTreeMap<String, BTreeMap<String, u8>>,
}

/// One source table to refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub kind: DatasetKind,

    /// Output file stem, defaults to the kind's standard name
    #[serde(default)]
    pub name: Option<String>,

    /// Source table or view, defaults to the kind's standard table
    #[serde(default)]
    pub table: Option<String>,

    /// Replaces the kind's default numeric coercion list
    #[serde(default)]
    pub numeric_fields: Option<Vec<String>>,
}

impl DatasetConfig {
    pub fn new(kind: DatasetKind) -> Self {
        Self {
            kind,
            name: None,
            table: None,
            numeric_fields: None,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.default_name())
    }

    pub fn table(&self) -> &str {
        self.table.as_deref().unwrap_or(self.kind.default_table())
    }

    pub fn numeric_fields(&self) -> Vec<String> {
        match &self.numeric_fields {
            Some(fields) => fields.clone(),
            None => self
                .kind
                .default_numeric_fields()
                .iter()
                .map(|field| field.to_string())
                .collect(),
        }
    }
}

/// Year partitioning scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum BucketScheme {
    /// One bucket per year, labelled `year-YYYY`
    Yearly {
        first_year: i32,
        /// Defaults to the year of the run date
        #[serde(default)]
        last_year: Option<i32>,
    },
    /// Named, possibly open-ended, year ranges
    Periods { periods: Vec<Period> },
}

impl Default for BucketScheme {
    fn default() -> Self {
        BucketScheme::Yearly {
            first_year: DEFAULT_FIRST_YEAR,
            last_year: None,
        }
    }
}

/// Inclusive year range with a file label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub label: String,
    #[serde(default)]
    pub from: Option<i32>,
    #[serde(default)]
    pub to: Option<i32>,
}

impl Period {
    pub fn new(label: impl Into<String>, from: Option<i32>, to: Option<i32>) -> Self {
        Self {
            label: label.into(),
            from,
            to,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.from.is_none_or(|from| year >= from) && self.to.is_none_or(|to| year <= to)
    }
}

impl BucketScheme {
    /// Concrete buckets for a run in `current_year`
    pub fn resolve(&self, current_year: i32) -> Vec<Period> {
        match self {
            BucketScheme::Yearly {
                first_year,
                last_year,
            } => {
                let last = last_year.unwrap_or(current_year);
                (*first_year..=last)
                    .map(|year| {
                        Period::new(format!("{YEAR_BUCKET_PREFIX}{year}"), Some(year), Some(year))
                    })
                    .collect()
            }
            BucketScheme::Periods { periods } => periods.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            BucketScheme::Yearly {
                first_year,
                last_year: Some(last_year),
            } if last_year < first_year => Err(CedenError::configuration(format!(
                "Yearly buckets end ({}) before they start ({})",
                last_year, first_year
            ))),
            BucketScheme::Yearly { .. } => Ok(()),
            BucketScheme::Periods { periods } => {
                if periods.is_empty() {
                    return Err(CedenError::configuration(
                        "Period buckets need at least one period",
                    ));
                }
                let mut labels = HashSet::new();
                for period in periods {
                    if period.label.trim().is_empty() {
                        return Err(CedenError::configuration("Period label cannot be empty"));
                    }
                    if !labels.insert(period.label.as_str()) {
                        return Err(CedenError::configuration(format!(
                            "Duplicate period label '{}'",
                            period.label
                        )));
                    }
                    if let (Some(from), Some(to)) = (period.from, period.to) {
                        if to < from {
                            return Err(CedenError::configuration(format!(
                                "Period '{}' ends ({}) before it starts ({})",
                                period.label, to, from
                            )));
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

/// Topic extract over an output file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsetConfig {
    /// Output file stem
    pub name: String,
    /// Dataset name whose all-years file is filtered
    pub source: String,
    /// Column compared against the allow-list
    pub field: String,
    /// Exact, case-sensitive values to keep
    pub values: Vec<String>,
}

/// Portal resource fed by one manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTarget {
    pub resource_id: String,
    /// Manifest key, e.g. `WaterChemistryData_year-2019`
    pub file: String,
}

impl Default for CedenConfig {
    fn default() -> Self {
        let datasets = [
            DatasetKind::Stations,
            DatasetKind::WaterChemistry,
            DatasetKind::Toxicity,
            DatasetKind::Tissue,
            DatasetKind::Benthic,
            DatasetKind::Habitat,
        ]
        .into_iter()
        .map(DatasetConfig::new)
        .collect();

        Self {
            input_dir: PathBuf::from("exports"),
            output_dir: PathBuf::from("output"),
            delimiter: ',',
            extension: ".csv".to_string(),
            run_date: None,
            buckets: BucketScheme::default(),
            min_bucket_bytes: DEFAULT_MIN_BUCKET_BYTES,
            datasets,
            stations_file: None,
            subsets: Vec::new(),
            uploads: Vec::new(),
            code_table_overrides: BTreeMap::new(),
        }
    }
}

impl CedenConfig {
    /// Create configuration with explicit input and output directories
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Default config file location (`<config_dir>/ceden-refresh/config.toml`)
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ceden-refresh").join("config.toml"))
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text).map_err(|source| CedenError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults, then `config_file` if given, then the process environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply directory overrides from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_INPUT_DIR).filter(|v| !v.is_empty()) {
            debug!("{} overrides input directory: {}", ENV_INPUT_DIR, dir);
            self.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
            debug!("{} overrides output directory: {}", ENV_OUTPUT_DIR, dir);
            self.output_dir = PathBuf::from(dir);
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_run_date(mut self, run_date: NaiveDate) -> Self {
        self.run_date = Some(run_date);
        self
    }

    pub fn with_buckets(mut self, buckets: BucketScheme) -> Self {
        self.buckets = buckets;
        self
    }

    pub fn with_min_bucket_bytes(mut self, bytes: u64) -> Self {
        self.min_bucket_bytes = bytes;
        self
    }

    pub fn with_datasets(mut self, datasets: Vec<DatasetConfig>) -> Self {
        self.datasets = datasets;
        self
    }

    pub fn with_stations_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stations_file = Some(path.into());
        self
    }

    pub fn with_subset(mut self, subset: SubsetConfig) -> Self {
        self.subsets.push(subset);
        self
    }

    pub fn with_upload(mut self, resource_id: impl Into<String>, file: impl Into<String>) -> Self {
        self.uploads.push(UploadTarget {
            resource_id: resource_id.into(),
            file: file.into(),
        });
        self
    }

    pub fn with_code_override(mut self, field: &str, code: &str, severity: u8) -> Self {
        self.code_table_overrides
            .entry(field.to_string())
            .or_default()
            .insert(code.to_string(), severity);
        self
    }

    /// Keep only the named datasets, preserving configured order
    pub fn retain_datasets(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            if !self.datasets.iter().any(|d| matches_dataset(d, name)) {
                return Err(CedenError::configuration(format!(
                    "Dataset '{}' is not configured. Available: {}",
                    name,
                    self.datasets
                        .iter()
                        .map(|d| d.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
        }
        self.datasets
            .retain(|d| names.iter().any(|name| matches_dataset(d, name)));
        Ok(())
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetConfig> {
        self.datasets.iter().find(|d| d.name() == name)
    }

    /// Date label used in file names (`YYYY-MM-DD`)
    pub fn run_date_label(&self) -> String {
        self.effective_run_date().format("%Y-%m-%d").to_string()
    }

    pub fn effective_run_date(&self) -> NaiveDate {
        self.run_date.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Buckets for this run, open yearly ranges end at the run date's year
    pub fn resolved_buckets(&self) -> Vec<Period> {
        self.buckets.resolve(self.effective_run_date().year())
    }

    /// Delimiter as a single byte for the csv reader and writer
    pub fn delimiter_byte(&self) -> Result<u8> {
        if !self.delimiter.is_ascii() {
            return Err(CedenError::configuration(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }
        Ok(self.delimiter as u8)
    }

    pub fn output_path(&self, stem: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}{}", stem, self.run_date_label(), self.extension))
    }

    pub fn input_path(&self, table: &str) -> PathBuf {
        self.input_dir.join(format!("{}{}", table, self.extension))
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<()> {
        if self.datasets.is_empty() {
            return Err(CedenError::configuration(
                "At least one dataset must be configured",
            ));
        }

        if let Some(position) = self.datasets.iter().position(|d| d.kind.is_stations()) {
            if position != 0 {
                return Err(CedenError::configuration(
                    "The stations dataset must be processed first",
                ));
            }
        }

        let mut names = HashSet::new();
        for dataset in &self.datasets {
            if !names.insert(dataset.name()) {
                return Err(CedenError::configuration(format!(
                    "Duplicate dataset name '{}'",
                    dataset.name()
                )));
            }
        }

        self.delimiter_byte()?;
        if matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(CedenError::configuration(format!(
                "Delimiter {:?} cannot be a quote or line terminator",
                self.delimiter
            )));
        }

        if self.extension.is_empty() {
            return Err(CedenError::configuration("File extension cannot be empty"));
        }

        self.buckets.validate()?;

        for subset in &self.subsets {
            if subset.name.trim().is_empty() || subset.field.trim().is_empty() {
                return Err(CedenError::configuration(
                    "Subset name and field cannot be empty",
                ));
            }
            if subset.values.is_empty() {
                return Err(CedenError::configuration(format!(
                    "Subset '{}' has an empty allow-list",
                    subset.name
                )));
            }
        }

        for upload in &self.uploads {
            if upload.resource_id.trim().is_empty() || upload.file.trim().is_empty() {
                return Err(CedenError::configuration(
                    "Upload targets need a resource id and a file key",
                ));
            }
        }

        for (field, codes) in &self.code_table_overrides {
            for (code, severity) in codes {
                if *severity > MAX_SEVERITY {
                    return Err(CedenError::InvalidSeverity {
                        field: field.clone(),
                        code: code.clone(),
                        severity: *severity,
                    });
                }
            }
        }

        Ok(())
    }
}

fn matches_dataset(dataset: &DatasetConfig, name: &str) -> bool {
    dataset.name().eq_ignore_ascii_case(name) || dataset.kind.tag() == name
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = CedenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.datasets[0].kind, DatasetKind::Stations);
        assert_eq!(config.min_bucket_bytes, 2000);
    }

    #[test]
    fn test_output_naming() {
        let config = CedenConfig::new("in", "out")
            .with_run_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
            .with_extension(".txt");
        assert_eq!(
            config.output_path("WaterChemistryData_year-2019"),
            PathBuf::from("out/WaterChemistryData_year-2019_2024-03-05.txt")
        );
        assert_eq!(config.input_path("WQDMart_MV"), PathBuf::from("in/WQDMart_MV.txt"));
    }

    #[test]
    fn test_yearly_buckets_default_to_run_year() {
        let config = CedenConfig::default()
            .with_run_date(NaiveDate::from_ymd_opt(2003, 1, 1).unwrap());
        let labels: Vec<_> = config
            .resolved_buckets()
            .into_iter()
            .map(|p| p.label)
            .collect();
        assert_eq!(labels, vec!["year-2000", "year-2001", "year-2002", "year-2003"]);
    }

    #[test]
    fn test_open_ended_periods() {
        let prior = Period::new("prior_to_2000", None, Some(1999));
        let recent = Period::new("2010-present", Some(2010), None);
        assert!(prior.contains(1950));
        assert!(!prior.contains(2000));
        assert!(recent.contains(2030));
        assert!(!recent.contains(2009));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = CedenConfig::default();
        config.datasets.swap(0, 1);
        assert!(config.validate().is_err());

        let config = CedenConfig::default().with_datasets(Vec::new());
        assert!(config.validate().is_err());

        let config = CedenConfig::default().with_delimiter('"');
        assert!(config.validate().is_err());

        let config = CedenConfig::default().with_buckets(BucketScheme::Yearly {
            first_year: 2010,
            last_year: Some(2005),
        });
        assert!(config.validate().is_err());

        let config = CedenConfig::default().with_code_override("QACode", "XX", 8);
        assert!(matches!(
            config.validate(),
            Err(CedenError::InvalidSeverity { .. })
        ));
    }

    #[test]
    fn test_retain_datasets() {
        let mut config = CedenConfig::default();
        config
            .retain_datasets(&["stations".to_string(), "BenthicData".to_string()])
            .unwrap();
        let kinds: Vec<_> = config.datasets.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DatasetKind::Stations, DatasetKind::Benthic]);

        assert!(config.retain_datasets(&["Nope".to_string()]).is_err());
    }

    #[test]
    fn test_env_layer() {
        let mut config = CedenConfig::default();
        config.apply_env(|key| match key {
            ENV_OUTPUT_DIR => Some("/srv/portal".to_string()),
            _ => None,
        });
        assert_eq!(config.output_dir, PathBuf::from("/srv/portal"));
        assert_eq!(config.input_dir, PathBuf::from("exports"));
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
input_dir = "/data/exports"
delimiter = "\t"
extension = ".txt"
run_date = "2021-07-01"

[buckets]
scheme = "periods"
periods = [
  {{ label = "prior_to_2000", to = 1999 }},
  {{ label = "2000-2009", from = 2000, to = 2009 }},
  {{ label = "2010-present", from = 2010 }},
]

[[datasets]]
kind = "water_chemistry"
table = "WQDMart_MV"

[[uploads]]
resource_id = "dde19a95-504b-48d7-8f3e-8af3d484009f"
file = "WaterChemistryData_2010-present"

[code_table_overrides.QACode]
NEW = 2
"#
        )
        .unwrap();

        let config = CedenConfig::from_file(file.path()).unwrap();
        assert_eq!(config.delimiter, '\t');
        assert_eq!(config.run_date_label(), "2021-07-01");
        assert_eq!(config.datasets.len(), 1);
        assert_eq!(config.datasets[0].name(), "WaterChemistryData");
        assert_eq!(config.resolved_buckets().len(), 3);
        assert_eq!(config.code_table_overrides["QACode"]["NEW"], 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_toml_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "delimiter = [").unwrap();
        assert!(matches!(
            CedenConfig::from_file(file.path()),
            Err(CedenError::ConfigParse { .. })
        ));
    }
}
