//! Core data structures and types for the CEDEN refresh.
//!
//! Defines dataset kinds, the row-level `Record`, the quality categories
//! assigned by the classifier, site entries and processing statistics.

use crate::constants::numeric_fields;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Source tables known to the refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Stations,
    WaterChemistry,
    Toxicity,
    Tissue,
    Benthic,
    Habitat,
    CyanoToxin,
    IrWaterChemistry,
    IrToxicity,
    IrBenthic,
    IrStoret2010,
    IrStoret2012,
    IrNwis,
    IrField,
    IrTissue,
}

impl DatasetKind {
    pub const ALL: &'static [DatasetKind] = &[
        DatasetKind::Stations,
        DatasetKind::WaterChemistry,
        DatasetKind::Toxicity,
        DatasetKind::Tissue,
        DatasetKind::Benthic,
        DatasetKind::Habitat,
        DatasetKind::CyanoToxin,
        DatasetKind::IrWaterChemistry,
        DatasetKind::IrToxicity,
        DatasetKind::IrBenthic,
        DatasetKind::IrStoret2010,
        DatasetKind::IrStoret2012,
        DatasetKind::IrNwis,
        DatasetKind::IrField,
        DatasetKind::IrTissue,
    ];

    /// Output file stem used when the configuration does not name the dataset
    pub fn default_name(&self) -> &'static str {
        match self {
            DatasetKind::Stations => "WQX_Stations",
            DatasetKind::WaterChemistry => "WaterChemistryData",
            DatasetKind::Toxicity => "ToxicityData",
            DatasetKind::Tissue => "TissueData",
            DatasetKind::Benthic => "BenthicData",
            DatasetKind::Habitat => "HabitatData",
            DatasetKind::CyanoToxin => "CyanoToxinData",
            DatasetKind::IrWaterChemistry => "IR_WaterChemistryData",
            DatasetKind::IrToxicity => "IR_ToxicityData",
            DatasetKind::IrBenthic => "IR_BenthicData",
            DatasetKind::IrStoret2010 => "IR_STORET_2010",
            DatasetKind::IrStoret2012 => "IR_STORET_2012",
            DatasetKind::IrNwis => "IR_NWIS",
            DatasetKind::IrField => "IR_Field",
            DatasetKind::IrTissue => "IR_TissueData",
        }
    }

    /// Warehouse table or view the kind is extracted from
    pub fn default_table(&self) -> &'static str {
        match self {
            DatasetKind::Stations => "DM_WQX_Stations_MV",
            DatasetKind::WaterChemistry => "WQDMart_MV",
            DatasetKind::Toxicity => "ToxDmart_MV",
            DatasetKind::Tissue => "TissueDMart_MV",
            DatasetKind::Benthic => "BenthicDMart_MV",
            DatasetKind::Habitat => "HabitatDMart_MV",
            DatasetKind::CyanoToxin => "CyanoToxinData",
            DatasetKind::IrWaterChemistry => "IR2018_WQ",
            DatasetKind::IrToxicity => "IR2018_Toxicity",
            DatasetKind::IrBenthic => "IR2018_Benthic",
            DatasetKind::IrStoret2010 => "IR2018_Storet_2010_2012",
            DatasetKind::IrStoret2012 => "IR2018_Storet_2012_2017",
            DatasetKind::IrNwis => "IR2018_NWIS",
            DatasetKind::IrField => "IR2018_Field",
            DatasetKind::IrTissue => "IR2018_Tissue",
        }
    }

    /// Look a kind up by its output name (`WaterChemistryData`) or snake_case tag
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| {
            kind.default_name().eq_ignore_ascii_case(name) || kind.tag() == name
        })
    }

    /// snake_case tag used in configuration files
    pub fn tag(&self) -> &'static str {
        match self {
            DatasetKind::Stations => "stations",
            DatasetKind::WaterChemistry => "water_chemistry",
            DatasetKind::Toxicity => "toxicity",
            DatasetKind::Tissue => "tissue",
            DatasetKind::Benthic => "benthic",
            DatasetKind::Habitat => "habitat",
            DatasetKind::CyanoToxin => "cyano_toxin",
            DatasetKind::IrWaterChemistry => "ir_water_chemistry",
            DatasetKind::IrToxicity => "ir_toxicity",
            DatasetKind::IrBenthic => "ir_benthic",
            DatasetKind::IrStoret2010 => "ir_storet2010",
            DatasetKind::IrStoret2012 => "ir_storet2012",
            DatasetKind::IrNwis => "ir_nwis",
            DatasetKind::IrField => "ir_field",
            DatasetKind::IrTissue => "ir_tissue",
        }
    }

    /// The station directory is passed through without classification
    pub fn is_stations(&self) -> bool {
        matches!(self, DatasetKind::Stations)
    }

    /// Whether the datum is backfilled from the station directory
    pub fn requires_datum(&self) -> bool {
        !matches!(self, DatasetKind::Stations | DatasetKind::Benthic)
    }

    /// Integrated-report kinds whose sample dates are reported month-day-year
    pub fn is_legacy_report(&self) -> bool {
        matches!(self, DatasetKind::IrWaterChemistry | DatasetKind::IrTissue)
    }

    /// Columns coerced to floating point unless the configuration overrides them
    pub fn default_numeric_fields(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::WaterChemistry => numeric_fields::WATER_CHEMISTRY,
            DatasetKind::Benthic => numeric_fields::BENTHIC,
            DatasetKind::Toxicity => numeric_fields::TOXICITY,
            DatasetKind::Tissue => numeric_fields::TISSUE,
            DatasetKind::Habitat => numeric_fields::HABITAT,
            _ => &[],
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_name())
    }
}

/// Data quality categories written to the `DataQuality` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityCategory {
    MetaData,
    Passed,
    SomeReviewNeeded,
    SpatialAccuracyUnknown,
    ExtensiveReviewNeeded,
    UnknownDataQuality,
    RejectRecord,
    ErrorInData,
}

impl QualityCategory {
    /// Category for a maximum severity score; anything above 6 is an error
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => QualityCategory::MetaData,
            1 => QualityCategory::Passed,
            2 => QualityCategory::SomeReviewNeeded,
            3 => QualityCategory::SpatialAccuracyUnknown,
            4 => QualityCategory::ExtensiveReviewNeeded,
            5 => QualityCategory::UnknownDataQuality,
            6 => QualityCategory::RejectRecord,
            _ => QualityCategory::ErrorInData,
        }
    }

    pub fn score(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityCategory::MetaData => "MetaData",
            QualityCategory::Passed => "Passed",
            QualityCategory::SomeReviewNeeded => "Some review needed",
            QualityCategory::SpatialAccuracyUnknown => "Spatial accuracy unknown",
            QualityCategory::ExtensiveReviewNeeded => "Extensive review needed",
            QualityCategory::UnknownDataQuality => "Unknown data quality",
            QualityCategory::RejectRecord => "Reject record",
            QualityCategory::ErrorInData => "Error in data",
        }
    }
}

impl fmt::Display for QualityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification outcome for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityVerdict {
    pub category: QualityCategory,
    /// `field:value,value` fragments joined with `"; "`, empty for MetaData and Passed
    pub indicator: String,
}

impl QualityVerdict {
    pub fn label(&self) -> &'static str {
        self.category.label()
    }
}

/// Ordered column names shared by every record of one dataset pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl RecordHeader {
    pub fn new(names: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            // first occurrence wins for duplicated column names
            index.entry(name.clone()).or_insert(position);
        }
        Self { names, index }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Copy of this header with any missing `extra` columns appended in order
    pub fn extended<S: AsRef<str>>(&self, extra: &[S]) -> Self {
        let mut names = self.names.clone();
        for name in extra {
            let name = name.as_ref();
            if !self.contains(name) && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        Self::new(names)
    }
}

/// One source row: field name to raw string value
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    header: Arc<RecordHeader>,
    values: Vec<String>,
}

impl Record {
    /// Build a record, padding or truncating `values` to the header width
    pub fn new(header: Arc<RecordHeader>, mut values: Vec<String>) -> Self {
        values.resize(header.len(), String::new());
        Self { header, values }
    }

    /// Convenience constructor with a private header
    pub fn from_pairs<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> Self {
        let names = pairs.iter().map(|(k, _)| k.as_ref().to_string()).collect();
        let values = pairs.iter().map(|(_, v)| v.as_ref().to_string()).collect();
        Self::new(Arc::new(RecordHeader::new(names)), values)
    }

    pub fn header(&self) -> &Arc<RecordHeader> {
        &self.header
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.header
            .position(name)
            .map(|position| self.values[position].as_str())
    }

    /// Set an existing field; returns false when the header has no such column
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.header.position(name) {
            Some(position) => {
                self.values[position] = value.into();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.header.contains(name)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [String] {
        &mut self.values
    }
}

/// First-seen station metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteEntry {
    pub station_code: String,
    pub station_name: String,
    pub latitude: String,
    pub longitude: String,
    pub datum: String,
}

/// Statistics for one refresh run
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub datasets_processed: usize,
    pub records_processed: usize,
    pub records_by_quality: BTreeMap<QualityCategory, usize>,
    pub classification_errors: usize,
    /// Records left out of every year bucket because the sample year was unreadable
    pub undated_records: usize,
    pub coercion_fallbacks: usize,
    pub buckets_written: usize,
    pub buckets_discarded: usize,
    pub sites_collected: usize,
    pub processing_time: Duration,
}

impl ProcessingStats {
    pub fn record_verdict(&mut self, category: QualityCategory) {
        *self.records_by_quality.entry(category).or_insert(0) += 1;
    }

    /// Fold the statistics of one dataset pass into the run total
    pub fn merge(&mut self, other: &ProcessingStats) {
        self.datasets_processed += other.datasets_processed;
        self.records_processed += other.records_processed;
        for (category, count) in &other.records_by_quality {
            *self.records_by_quality.entry(*category).or_insert(0) += count;
        }
        self.classification_errors += other.classification_errors;
        self.undated_records += other.undated_records;
        self.coercion_fallbacks += other.coercion_fallbacks;
        self.buckets_written += other.buckets_written;
        self.buckets_discarded += other.buckets_discarded;
        self.sites_collected = self.sites_collected.max(other.sites_collected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_category_from_score() {
        assert_eq!(QualityCategory::from_score(0), QualityCategory::MetaData);
        assert_eq!(QualityCategory::from_score(6), QualityCategory::RejectRecord);
        assert_eq!(QualityCategory::from_score(7), QualityCategory::ErrorInData);
        assert_eq!(QualityCategory::from_score(7).label(), "Error in data");
        assert_eq!(QualityCategory::SomeReviewNeeded.score(), 2);
    }

    #[test]
    fn test_dataset_kind_lookup() {
        assert_eq!(
            DatasetKind::from_name("WaterChemistryData"),
            Some(DatasetKind::WaterChemistry)
        );
        assert_eq!(DatasetKind::from_name("ir_tissue"), Some(DatasetKind::IrTissue));
        assert_eq!(DatasetKind::from_name("SomethingElse"), None);
        assert!(DatasetKind::IrWaterChemistry.is_legacy_report());
        assert!(!DatasetKind::Benthic.requires_datum());
    }

    #[test]
    fn test_record_get_set_and_extend() {
        let mut record = Record::from_pairs(&[("StationCode", "204PS0001"), ("Result", "1.5")]);
        assert_eq!(record.get("Result"), Some("1.5"));
        assert!(record.set("Result", "2.0"));
        assert!(!record.set("Datum", "NAD83"));

        let wider = Arc::new(record.header().extended(&["DataQuality", "Datum"]));
        let record = Record::new(wider, record.values().to_vec());
        assert_eq!(record.get("Result"), Some("2.0"));
        assert_eq!(record.get("Datum"), Some(""));
        assert_eq!(record.values().len(), 4);
    }

    #[test]
    fn test_record_pads_short_rows() {
        let header = Arc::new(RecordHeader::new(vec!["A".into(), "B".into(), "C".into()]));
        let record = Record::new(header, vec!["1".into()]);
        assert_eq!(record.values(), &["1".to_string(), String::new(), String::new()]);
    }
}
