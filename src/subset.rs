//! Topic extracts filtered by analyte
//!
//! Streams an already written output file once, keeps rows whose filter
//! column holds an allowed value and builds a site list for the kept rows.

use crate::config::{CedenConfig, SubsetConfig};
use crate::constants::analytes;
use crate::error::{CedenError, Result};
use crate::models::{Record, RecordHeader};
use crate::processor::source::{CsvExportSource, RecordStream};
use crate::processor::writer::delimited_writer;
use crate::sites::SiteAggregator;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Built-in extracts published on the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsetPreset {
    /// Pathogen indicators, filtered on `Analyte`
    SafeToSwim,
    /// Pesticides and degradates, filtered on `DW_AnalyteName`
    Pesticides,
}

impl SubsetPreset {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "safetoswim" => Some(SubsetPreset::SafeToSwim),
            "pesticides" => Some(SubsetPreset::Pesticides),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SubsetPreset::SafeToSwim => "SafeToSwim",
            SubsetPreset::Pesticides => "Pesticides",
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            SubsetPreset::SafeToSwim => "Analyte",
            SubsetPreset::Pesticides => "DW_AnalyteName",
        }
    }

    pub fn values(&self) -> &'static [&'static str] {
        match self {
            SubsetPreset::SafeToSwim => analytes::SAFE_TO_SWIM,
            SubsetPreset::Pesticides => analytes::PESTICIDES,
        }
    }

    /// Subset definition reading from the dataset named `source`
    pub fn to_config(&self, source: impl Into<String>) -> SubsetConfig {
        SubsetConfig {
            name: self.name().to_string(),
            source: source.into(),
            field: self.field().to_string(),
            values: self.values().iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Exact-match filter over one column
#[derive(Debug, Clone)]
pub struct AnalyteSubsetter {
    field: String,
    allowed: HashSet<String>,
}

impl AnalyteSubsetter {
    pub fn new<S: AsRef<str>>(field: impl Into<String>, allowed: &[S]) -> Self {
        Self {
            field: field.into(),
            allowed: allowed.iter().map(|v| v.as_ref().to_string()).collect(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn matches(&self, record: &Record) -> bool {
        record
            .get(&self.field)
            .is_some_and(|value| self.allowed.contains(value))
    }

    /// Keep matching rows and fold their sites into `sites`, first seen wins
    ///
    /// Rows are pulled lazily; read errors pass through untouched.
    pub fn subset<'a, I>(
        &'a self,
        rows: I,
        sites: &'a mut SiteAggregator,
    ) -> impl Iterator<Item = Result<Record>> + 'a
    where
        I: IntoIterator<Item = Result<Record>>,
        I::IntoIter: 'a,
    {
        rows.into_iter().filter_map(move |row| match row {
            Ok(record) if self.matches(&record) => {
                sites.observe(&record);
                Some(Ok(record))
            }
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
    }
}

/// Files written by one subset run
#[derive(Debug, Clone)]
pub struct SubsetOutcome {
    pub name: String,
    pub rows: usize,
    pub sites: usize,
    pub data_path: PathBuf,
    pub sites_path: PathBuf,
}

impl SubsetOutcome {
    pub fn sites_key(&self) -> String {
        sites_key(&self.name)
    }
}

/// Manifest key of a subset's site list
pub fn sites_key(name: &str) -> String {
    format!("Sites_for_{}", name)
}

/// Run `subset` over the delimited file at `input`
///
/// Writes `<name>_<date><ext>` and `Sites_for_<name>_<date><ext>` into the
/// configured output directory.
pub fn subset_file(input: &Path, subset: &SubsetConfig, config: &CedenConfig) -> Result<SubsetOutcome> {
    let delimiter = config.delimiter_byte()?;
    let mut stream = CsvExportSource::open_path(input, delimiter)?;
    let header = Arc::new(RecordHeader::new(stream.columns().to_vec()));

    if !header.contains(&subset.field) {
        return Err(CedenError::configuration(format!(
            "Subset '{}' filters on '{}', which {} does not have",
            subset.name,
            subset.field,
            input.display()
        )));
    }

    let subsetter = AnalyteSubsetter::new(subset.field.clone(), &subset.values);
    let data_path = config.output_path(&subset.name);
    let sites_path = config.output_path(&sites_key(&subset.name));

    let mut writer = delimited_writer(&data_path, delimiter)?;
    writer.write_record(header.names())?;

    let records = std::iter::from_fn(|| stream.next_row())
        .map(|row| row.map(|values| Record::new(Arc::clone(&header), values)));

    let mut sites = SiteAggregator::new();
    let mut rows = 0;
    for record in subsetter.subset(records, &mut sites) {
        writer.write_record(record?.values())?;
        rows += 1;
    }
    writer.flush()?;
    drop(writer);

    sites.write(&sites_path, delimiter)?;
    info!(
        "Subset {}: {} rows from {} sites",
        subset.name,
        rows,
        sites.len()
    );

    Ok(SubsetOutcome {
        name: subset.name.clone(),
        rows,
        sites: sites.len(),
        data_path,
        sites_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_preset_lookup() {
        assert_eq!(SubsetPreset::from_name("SafeToSwim"), Some(SubsetPreset::SafeToSwim));
        assert_eq!(SubsetPreset::from_name("safe-to-swim"), Some(SubsetPreset::SafeToSwim));
        assert_eq!(SubsetPreset::from_name("pesticides"), Some(SubsetPreset::Pesticides));
        assert_eq!(SubsetPreset::from_name("metals"), None);

        let config = SubsetPreset::Pesticides.to_config("WaterChemistryData");
        assert_eq!(config.field, "DW_AnalyteName");
        assert!(config.values.iter().any(|v| v == "Chlorpyrifos"));
    }

    #[test]
    fn test_subset_is_exact_and_case_sensitive() {
        let subsetter = AnalyteSubsetter::new("Analyte", analytes::SAFE_TO_SWIM);
        let rows = vec![
            Record::from_pairs(&[("StationCode", "A"), ("StationName", "a1"), ("Analyte", "E. coli")]),
            Record::from_pairs(&[("StationCode", "B"), ("StationName", "b"), ("Analyte", "e. coli")]),
            Record::from_pairs(&[("StationCode", "A"), ("StationName", "a2"), ("Analyte", "Enterococcus")]),
            Record::from_pairs(&[("StationCode", "C"), ("StationName", "c"), ("Analyte", "Oxygen")]),
        ];

        let mut sites = SiteAggregator::new();
        let kept: Vec<Record> = subsetter
            .subset(rows.into_iter().map(Ok), &mut sites)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].get("Analyte"), Some("Enterococcus"));
        assert_eq!(sites.len(), 1);
        assert_eq!(sites.export()[0].station_name, "a1");
    }

    #[test]
    fn test_subset_passes_read_errors_through() {
        let subsetter = AnalyteSubsetter::new("Analyte", &["E. coli"]);
        let rows = vec![
            Ok(Record::from_pairs(&[("StationCode", "A"), ("Analyte", "E. coli")])),
            Err(CedenError::extraction("WaterChemistry", "truncated row")),
        ];

        let mut sites = SiteAggregator::new();
        let results: Vec<Result<Record>> = subsetter.subset(rows, &mut sites).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(CedenError::Extraction { .. })));
        assert_eq!(sites.len(), 1);
    }

    #[test]
    fn test_subset_file_writes_data_and_sites() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("WaterChemistryData_2024-01-02.csv");
        fs::write(
            &input,
            "StationName,StationCode,Analyte,Result,Latitude,Longitude,Datum\n\
             Creek,S1,E. coli,10.0,37.1,-122.1,NAD83\n\
             Creek,S1,Oxygen,7.0,37.1,-122.1,NAD83\n\
             River,S2,Enterococcus,3.0,38.0,-121.0,NR\n",
        )
        .unwrap();

        let config = CedenConfig::new(dir.path(), dir.path())
            .with_run_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        let subset = SubsetPreset::SafeToSwim.to_config("WaterChemistryData");
        let outcome = subset_file(&input, &subset, &config).unwrap();

        assert_eq!(outcome.rows, 2);
        assert_eq!(outcome.sites, 2);
        assert_eq!(outcome.data_path, dir.path().join("SafeToSwim_2024-01-02.csv"));
        assert_eq!(outcome.sites_key(), "Sites_for_SafeToSwim");

        let data = fs::read_to_string(&outcome.data_path).unwrap();
        assert_eq!(data.lines().count(), 3);
        assert!(!data.contains("Oxygen"));

        let sites = fs::read_to_string(&outcome.sites_path).unwrap();
        assert_eq!(
            sites.lines().collect::<Vec<_>>(),
            vec![
                "StationName,SiteCode,Latitude,Longitude,Datum",
                "Creek,S1,37.1,-122.1,NAD83",
                "River,S2,38.0,-121.0,NR",
            ]
        );
    }

    #[test]
    fn test_missing_filter_field_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.csv");
        fs::write(&input, "StationCode,Analyte\nS1,E. coli\n").unwrap();

        let config = CedenConfig::new(dir.path(), dir.path());
        let subset = SubsetPreset::Pesticides.to_config("WaterChemistryData");
        assert!(matches!(
            subset_file(&input, &subset, &config),
            Err(CedenError::Configuration { .. })
        ));
    }
}
