//! Station site directory
//!
//! Collects first-seen station metadata across a run and writes the
//! deduplicated site list. Also loads the station to datum lookup used for
//! datum backfill from a stations export.

use crate::constants::columns;
use crate::error::{CedenError, Result};
use crate::models::{Record, SiteEntry};
use crate::processor::enrichment::DatumMap;
use crate::processor::source::{CsvExportSource, RecordStream};
use crate::processor::writer::delimited_writer;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use tracing::{debug, info};

/// First-write-wins station directory
#[derive(Debug, Clone, Default)]
pub struct SiteAggregator {
    index: HashMap<String, usize>,
    sites: Vec<SiteEntry>,
}

impl SiteAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the record's station unless it was already seen
    pub fn observe(&mut self, record: &Record) {
        let Some(code) = record.get(columns::STATION_CODE) else {
            return;
        };

        if let Entry::Vacant(e) = self.index.entry(code.to_string()) {
            let field = |name: &str| record.get(name).unwrap_or_default().to_string();
            e.insert(self.sites.len());
            self.sites.push(SiteEntry {
                station_code: code.to_string(),
                station_name: field(columns::STATION_NAME),
                latitude: field(columns::LATITUDE),
                longitude: field(columns::LONGITUDE),
                datum: field(columns::DATUM),
            });
        }
    }

    pub fn get(&self, station_code: &str) -> Option<&SiteEntry> {
        self.index.get(station_code).map(|i| &self.sites[*i])
    }

    /// Sites in insertion order
    pub fn export(&self) -> &[SiteEntry] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Write the directory with the `StationName, SiteCode, ...` header
    pub fn write(&self, path: &Path, delimiter: u8) -> Result<()> {
        let mut writer = delimited_writer(path, delimiter)?;
        writer.write_record(columns::SITE_HEADER)?;
        for site in &self.sites {
            writer.write_record([
                &site.station_name,
                &site.station_code,
                &site.latitude,
                &site.longitude,
                &site.datum,
            ])?;
        }
        writer.flush()?;
        info!("Wrote {} sites to {}", self.sites.len(), path.display());
        Ok(())
    }
}

/// Load station code -> datum from a stations export
pub fn load_datum_map(path: &Path, delimiter: u8) -> Result<DatumMap> {
    let mut stream = CsvExportSource::open_path(path, delimiter)?;
    let position = |column: &str| {
        stream
            .columns()
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| CedenError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            })
    };
    let code_at = position(columns::STATION_CODE)?;
    let datum_at = position(columns::DATUM)?;

    let mut map = DatumMap::new();
    while let Some(row) = stream.next_row() {
        let row = row?;
        let (Some(code), Some(datum)) = (row.get(code_at), row.get(datum_at)) else {
            continue;
        };
        map.entry(code.clone()).or_insert_with(|| datum.clone());
    }

    debug!("Loaded {} station datums from {}", map.len(), path.display());
    Ok(map)
}
