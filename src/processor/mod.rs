//! Main refresh engine.
//!
//! Orchestrates a refresh run: each configured dataset kind is extracted,
//! enriched, classified and partitioned in a single sequential pass, after
//! which the site directory, topic subsets and manifest are written.

pub mod enrichment;
pub mod source;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::enrichment::{DatumMap, RecordEnricher};
use self::source::{CsvExportSource, RecordStream, TableSource};
use self::writer::{OutputManifest, OutputSet, PassOutputs};

use crate::config::{CedenConfig, DatasetConfig};
use crate::constants::{ALL_SITES_STEM, PROGRESS_UPDATE_INTERVAL, columns};
use crate::error::{CedenError, Result};
use crate::models::{DatasetKind, ProcessingStats, QualityCategory, Record, RecordHeader};
use crate::quality::{CodeTable, QualityClassifier, YearPosition, adapt, parse_year};
use crate::sites::{SiteAggregator, load_datum_map};
use crate::subset::subset_file;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of a complete refresh run
#[derive(Debug)]
pub struct RefreshOutcome {
    pub stats: ProcessingStats,
    pub manifest: OutputManifest,
    pub manifest_path: PathBuf,
}

/// Result of one dataset pass
#[derive(Debug)]
pub struct DatasetOutcome {
    pub stats: ProcessingStats,
    pub outputs: PassOutputs,
}

/// Main processor for a CEDEN refresh
pub struct DatasetProcessor {
    config: CedenConfig,
    registry: CodeTable,
    source: Box<dyn TableSource>,
    show_progress: bool,
}

impl DatasetProcessor {
    /// Validate `config` and prepare the code table registry
    ///
    /// Table exports are read from the configured input directory unless a
    /// different source is supplied with [`DatasetProcessor::with_source`].
    pub fn new(config: CedenConfig) -> Result<Self> {
        config.validate()?;
        let registry = CodeTable::standard()?.with_overrides(&config.code_table_overrides)?;

        // adapt every kind up front so a registry mismatch fails before any file is written
        for dataset in &config.datasets {
            adapt(&registry, dataset.kind)?;
        }

        let source = CsvExportSource::new(
            config.input_dir.clone(),
            config.extension.clone(),
            config.delimiter_byte()?,
        );

        Ok(Self {
            config,
            registry,
            source: Box::new(source),
            show_progress: false,
        })
    }

    /// Extract tables from another source
    pub fn with_source(mut self, source: Box<dyn TableSource>) -> Self {
        self.source = source;
        self
    }

    /// Show a spinner per dataset pass
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &CedenConfig {
        &self.config
    }

    pub fn registry(&self) -> &CodeTable {
        &self.registry
    }

    /// Run every configured dataset kind, then sites, subsets and manifest
    pub fn process(&self) -> Result<RefreshOutcome> {
        let start_time = Instant::now();
        std::fs::create_dir_all(&self.config.output_dir)?;
        let delimiter = self.config.delimiter_byte()?;

        let mut datum_map = match &self.config.stations_file {
            Some(path) => load_datum_map(path, delimiter)?,
            None => DatumMap::new(),
        };

        let mut sites = SiteAggregator::new();
        let mut manifest = OutputManifest::new();
        let mut stats = ProcessingStats::default();

        for dataset in &self.config.datasets {
            let outcome = self.process_dataset(dataset, &datum_map, &mut sites)?;

            if dataset.kind.is_stations() {
                if let Some((_, path)) = outcome.outputs.files.first() {
                    datum_map = load_datum_map(path, delimiter)?;
                    info!("Station directory provides {} datums", datum_map.len());
                }
            }

            stats.merge(&outcome.stats);
            manifest.extend(outcome.outputs.files);
        }

        let sites_path = self.config.output_path(ALL_SITES_STEM);
        sites.write(&sites_path, delimiter)?;
        manifest.insert(ALL_SITES_STEM, sites_path);
        stats.sites_collected = sites.len();

        for subset in &self.config.subsets {
            let input = manifest.get(&subset.source).map(Path::to_path_buf).ok_or_else(|| {
                CedenError::configuration(format!(
                    "Subset '{}' reads dataset '{}', which was not produced in this run",
                    subset.name, subset.source
                ))
            })?;
            let outcome = subset_file(&input, subset, &self.config)?;
            manifest.insert(outcome.name.clone(), outcome.data_path.clone());
            manifest.insert(outcome.sites_key(), outcome.sites_path);
        }

        let manifest_path = manifest.write(&self.config.output_dir)?;
        stats.processing_time = start_time.elapsed();

        Ok(RefreshOutcome {
            stats,
            manifest,
            manifest_path,
        })
    }

    /// Stream one dataset kind from extraction to closed output files
    pub fn process_dataset(
        &self,
        dataset: &DatasetConfig,
        datum_map: &DatumMap,
        sites: &mut SiteAggregator,
    ) -> Result<DatasetOutcome> {
        let start_time = Instant::now();
        let kind = dataset.kind;
        let mut stream = self.source.open(dataset.table())?;

        let source_header = RecordHeader::new(stream.columns().to_vec());
        let source_width = source_header.len();
        let header = Arc::new(source_header.extended(&output_columns(kind)));

        let classifier = if kind.is_stations() {
            None
        } else {
            Some(QualityClassifier::new(&self.registry, kind)?)
        };
        let buckets = if kind.is_stations() {
            Vec::new()
        } else {
            self.config.resolved_buckets()
        };

        let mut outputs = OutputSet::create(
            dataset.name(),
            header.names(),
            &buckets,
            self.config.delimiter_byte()?,
            self.config.min_bucket_bytes,
            |key| self.config.output_path(key),
        )?;
        debug!("{} main output: {}", dataset.name(), outputs.main_path().display());

        let year_position = if kind.is_legacy_report() {
            YearPosition::Trailing
        } else {
            YearPosition::Leading
        };

        let enricher = RecordEnricher::new(kind, dataset.numeric_fields(), datum_map);
        let progress = self.spinner(dataset.name());
        let mut stats = ProcessingStats {
            datasets_processed: 1,
            ..Default::default()
        };

        while let Some(row) = stream.next_row() {
            let mut row = row?;
            row.truncate(source_width);
            let mut record = Record::new(Arc::clone(&header), row);

            stats.coercion_fallbacks += enricher.enrich(&mut record);

            let mut year = None;
            if let Some(classifier) = &classifier {
                let errors_before = stats.classification_errors;
                let category = annotate(classifier, &mut record, &mut stats)?;
                stats.record_verdict(category);
                sites.observe(&record);
                if let Some(date) = record.get(columns::SAMPLE_DATE) {
                    match parse_year(date, year_position) {
                        Ok(parsed) => year = Some(parsed),
                        Err(e) => {
                            // Already reported when the classifier hit the same date
                            if stats.classification_errors == errors_before {
                                warn!(
                                    "{} at station {}: no year bucket for sample date '{}': {}",
                                    kind,
                                    record.get(columns::STATION_CODE).unwrap_or("?"),
                                    date,
                                    e
                                );
                            }
                            stats.undated_records += 1;
                        }
                    }
                }
            }

            outputs.write(&record, year)?;
            stats.records_processed += 1;

            if stats.records_processed as u64 % PROGRESS_UPDATE_INTERVAL == 0 {
                progress.set_message(format!(
                    "{}: {} records",
                    dataset.name(),
                    stats.records_processed
                ));
            }
        }

        let outputs = outputs.finish()?;
        stats.buckets_written = outputs.buckets_written;
        stats.buckets_discarded = outputs.buckets_discarded;
        stats.processing_time = start_time.elapsed();

        progress.finish_and_clear();
        info!(
            "{}: {} records, {} buckets kept, {} discarded",
            dataset.name(),
            stats.records_processed,
            outputs.buckets_written,
            outputs.buckets_discarded
        );
        if self.show_progress {
            println!(
                "  {} {} {}",
                "Processed".bright_green(),
                dataset.name().bright_white().bold(),
                format!("({} records)", stats.records_processed).bright_cyan()
            );
        }

        Ok(DatasetOutcome { stats, outputs })
    }

    fn spinner(&self, name: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message(format!("Extracting {}", name));
        spinner
    }
}

/// Columns appended to the source header for a kind
fn output_columns(kind: DatasetKind) -> Vec<&'static str> {
    let mut extra = Vec::new();
    if !kind.is_stations() {
        extra.push(columns::DATA_QUALITY);
        extra.push(columns::DATA_QUALITY_INDICATOR);
    }
    if kind.requires_datum() {
        extra.push(columns::DATUM);
    }
    extra
}

/// Classify `record` and store the verdict on it
///
/// A sample date that cannot be read marks the record as an error in data
/// instead of failing the pass.
fn annotate(
    classifier: &QualityClassifier,
    record: &mut Record,
    stats: &mut ProcessingStats,
) -> Result<QualityCategory> {
    let (category, indicator) = match classifier.classify(record) {
        Ok(verdict) => (verdict.category, verdict.indicator),
        Err(e) if e.is_record_level() => {
            let date = record.get(columns::SAMPLE_DATE).unwrap_or_default();
            warn!(
                "{} at station {}: {}",
                classifier.kind(),
                record.get(columns::STATION_CODE).unwrap_or("?"),
                e
            );
            stats.classification_errors += 1;
            (
                QualityCategory::ErrorInData,
                format!("{}:{}", columns::SAMPLE_DATE, date),
            )
        }
        Err(e) => return Err(e),
    };

    record.set(columns::DATA_QUALITY, category.label());
    record.set(columns::DATA_QUALITY_INDICATOR, indicator);
    Ok(category)
}

/// Classify every row of an existing export without writing partitions
pub fn classify_file(
    path: &Path,
    kind: DatasetKind,
    registry: &CodeTable,
    delimiter: u8,
) -> Result<ProcessingStats> {
    let start_time = Instant::now();
    let classifier = QualityClassifier::new(registry, kind)?;
    let mut stream = CsvExportSource::open_path(path, delimiter)?;
    let header = Arc::new(RecordHeader::new(stream.columns().to_vec()));

    let mut stats = ProcessingStats {
        datasets_processed: 1,
        ..Default::default()
    };
    while let Some(row) = stream.next_row() {
        let record = Record::new(Arc::clone(&header), row?);
        match classifier.classify(&record) {
            Ok(verdict) => stats.record_verdict(verdict.category),
            Err(e) if e.is_record_level() => {
                debug!("{}", e);
                stats.classification_errors += 1;
                stats.record_verdict(QualityCategory::ErrorInData);
            }
            Err(e) => return Err(e),
        }
        stats.records_processed += 1;
    }

    stats.processing_time = start_time.elapsed();
    Ok(stats)
}
