//! Table extraction sources
//!
//! A [`TableSource`] opens a named table and hands back a lazy, single-pass
//! [`RecordStream`] whose column list is fixed before the first row is read.

use crate::constants::{TARGET_COLUMN_PREFIX, TARGET_COLUMN_REPLACEMENT};
use crate::error::{CedenError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Lazy sequence of raw rows sharing one column list
pub trait RecordStream {
    /// Column names, already passed through [`fix_header`]
    fn columns(&self) -> &[String];

    /// Next raw row, `None` once the table is exhausted
    fn next_row(&mut self) -> Option<Result<Vec<String>>>;
}

/// Something that can extract a named table
pub trait TableSource {
    fn open(&self, table: &str) -> Result<Box<dyn RecordStream>>;
}

/// Rewrite extracted column names (`TargetLatitude` -> `Latitude`)
pub fn fix_header(name: &str) -> String {
    name.trim()
        .replace(TARGET_COLUMN_PREFIX, TARGET_COLUMN_REPLACEMENT)
}

/// Reads `<dir>/<table><extension>` delimited exports
#[derive(Debug, Clone)]
pub struct CsvExportSource {
    dir: PathBuf,
    extension: String,
    delimiter: u8,
}

impl CsvExportSource {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>, delimiter: u8) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            delimiter,
        }
    }

    pub fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}{}", table, self.extension))
    }

    /// Open an arbitrary delimited file rather than a named table
    pub fn open_path(path: &Path, delimiter: u8) -> Result<CsvRecordStream> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path)?;
        CsvRecordStream::new(reader)
    }
}

impl TableSource for CsvExportSource {
    fn open(&self, table: &str) -> Result<Box<dyn RecordStream>> {
        let path = self.path_for(table);
        if !path.is_file() {
            return Err(CedenError::extraction(
                table,
                format!("export not found at {}", path.display()),
            ));
        }

        info!("Extracting {} from {}", table, path.display());
        let stream = Self::open_path(&path, self.delimiter)
            .map_err(|e| CedenError::extraction(table, e.to_string()))?;
        debug!("{} exposes {} columns", table, stream.columns().len());
        Ok(Box::new(stream))
    }
}

/// Row stream over a csv reader
pub struct CsvRecordStream {
    reader: csv::Reader<File>,
    columns: Vec<String>,
    record: csv::StringRecord,
}

impl CsvRecordStream {
    fn new(mut reader: csv::Reader<File>) -> Result<Self> {
        let columns = reader.headers()?.iter().map(fix_header).collect();
        Ok(Self {
            reader,
            columns,
            record: csv::StringRecord::new(),
        })
    }
}

impl RecordStream for CsvRecordStream {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Option<Result<Vec<String>>> {
        match self.reader.read_record(&mut self.record) {
            Ok(true) => Some(Ok(self.record.iter().map(str::to_string).collect())),
            Ok(false) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// In-memory tables, keyed by table name
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, (Vec<String>, Vec<Vec<String>>)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table<S: AsRef<str>>(
        mut self,
        table: &str,
        columns: &[S],
        rows: Vec<Vec<String>>,
    ) -> Self {
        let columns = columns.iter().map(|c| fix_header(c.as_ref())).collect();
        self.tables.insert(table.to_string(), (columns, rows));
        self
    }
}

impl TableSource for MemorySource {
    fn open(&self, table: &str) -> Result<Box<dyn RecordStream>> {
        let (columns, rows) = self
            .tables
            .get(table)
            .cloned()
            .ok_or_else(|| CedenError::extraction(table, "no such table"))?;
        Ok(Box::new(MemoryStream {
            columns,
            rows: rows.into_iter(),
        }))
    }
}

struct MemoryStream {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Vec<String>>,
}

impl RecordStream for MemoryStream {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Option<Result<Vec<String>>> {
        self.rows.next().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fix_header() {
        assert_eq!(fix_header("TargetLatitude"), "Latitude");
        assert_eq!(fix_header("TargetLongitude"), "Longitude");
        assert_eq!(fix_header("StationCode"), "StationCode");
    }

    #[test]
    fn test_csv_export_source_reads_rows() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("IR2018_WQ.csv"),
            "StationCode,TargetLatitude,Result\n204PS0001,37.5,1.2\n204PS0002,37.6\n",
        )
        .unwrap();

        let source = CsvExportSource::new(dir.path(), ".csv", b',');
        let mut stream = source.open("IR2018_WQ").unwrap();
        assert_eq!(stream.columns(), &["StationCode", "Latitude", "Result"]);

        let first = stream.next_row().unwrap().unwrap();
        assert_eq!(first, vec!["204PS0001", "37.5", "1.2"]);
        let second = stream.next_row().unwrap().unwrap();
        assert_eq!(second.len(), 2);
        assert!(stream.next_row().is_none());
    }

    #[test]
    fn test_missing_export_is_extraction_error() {
        let dir = TempDir::new().unwrap();
        let source = CsvExportSource::new(dir.path(), ".csv", b',');
        match source.open("WQDMart_MV") {
            Err(CedenError::Extraction { table, .. }) => assert_eq!(table, "WQDMart_MV"),
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("expected an extraction error"),
        }
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with_table(
            "T",
            &["A", "TargetLongitude"],
            vec![vec!["1".into(), "2".into()]],
        );
        let mut stream = source.open("T").unwrap();
        assert_eq!(stream.columns(), &["A", "Longitude"]);
        assert_eq!(stream.next_row().unwrap().unwrap(), vec!["1", "2"]);
        assert!(stream.next_row().is_none());
        assert!(source.open("missing").is_err());
    }
}
