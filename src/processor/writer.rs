//! Delimited output writing for dataset passes
//!
//! An [`OutputSet`] owns the all-years file and one file per year bucket for
//! the duration of a dataset pass. Files are closed when the set is finished
//! or dropped; undersized buckets are removed on finish.

use crate::config::Period;
use crate::constants::MANIFEST_FILENAME;
use crate::error::Result;
use crate::models::Record;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// csv writer configured for portal output: bare `\n`, minimal quoting
pub fn delimited_writer(path: &Path, delimiter: u8) -> Result<csv::Writer<File>> {
    let writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_path(path)?;
    Ok(writer)
}

/// One open output file
struct OutputFile {
    key: String,
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl OutputFile {
    fn create<S: AsRef<str>>(key: String, path: PathBuf, header: &[S], delimiter: u8) -> Result<Self> {
        let mut writer = delimited_writer(&path, delimiter)?;
        writer.write_record(header.iter().map(|name| name.as_ref()))?;
        Ok(Self {
            key,
            path,
            writer,
            rows: 0,
        })
    }

    fn write(&mut self, values: &[String]) -> Result<()> {
        self.writer.write_record(values)?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and close, returning the final size on disk
    fn close(mut self) -> Result<(String, PathBuf, usize, u64)> {
        self.writer.flush()?;
        drop(self.writer);
        let size = fs::metadata(&self.path)?.len();
        Ok((self.key, self.path, self.rows, size))
    }
}

/// Files produced by a finished pass
#[derive(Debug, Default)]
pub struct PassOutputs {
    /// Kept files as (manifest key, path), all-years file first
    pub files: Vec<(String, PathBuf)>,
    pub buckets_written: usize,
    pub buckets_discarded: usize,
}

/// The all-years file plus its year buckets
pub struct OutputSet {
    main: OutputFile,
    buckets: Vec<(Period, OutputFile)>,
    min_bucket_bytes: u64,
}

impl OutputSet {
    /// Open every file of a pass and write the header to each
    ///
    /// `path_for` maps a manifest key to its output path.
    pub fn create<S, F>(
        name: &str,
        header: &[S],
        buckets: &[Period],
        delimiter: u8,
        min_bucket_bytes: u64,
        path_for: F,
    ) -> Result<Self>
    where
        S: AsRef<str>,
        F: Fn(&str) -> PathBuf,
    {
        let main = OutputFile::create(name.to_string(), path_for(name), header, delimiter)?;

        let mut files = Vec::with_capacity(buckets.len());
        for period in buckets {
            let key = format!("{}_{}", name, period.label);
            let path = path_for(&key);
            files.push((period.clone(), OutputFile::create(key, path, header, delimiter)?));
        }

        debug!("Opened {} with {} bucket files", name, files.len());
        Ok(Self {
            main,
            buckets: files,
            min_bucket_bytes,
        })
    }

    /// Write to the all-years file and to the first bucket containing `year`
    pub fn write(&mut self, record: &Record, year: Option<i32>) -> Result<()> {
        self.main.write(record.values())?;

        if let Some(year) = year {
            if let Some((_, bucket)) = self
                .buckets
                .iter_mut()
                .find(|(period, _)| period.contains(year))
            {
                bucket.write(record.values())?;
            }
        }
        Ok(())
    }

    pub fn main_path(&self) -> &Path {
        &self.main.path
    }

    /// Close all files and drop buckets that stayed empty or header-sized
    pub fn finish(self) -> Result<PassOutputs> {
        let mut outputs = PassOutputs::default();

        let (key, path, rows, size) = self.main.close()?;
        info!("Wrote {} rows ({} bytes) to {}", rows, size, path.display());
        outputs.files.push((key, path));

        for (_, bucket) in self.buckets {
            let (key, path, rows, size) = bucket.close()?;
            if rows == 0 || size <= self.min_bucket_bytes {
                fs::remove_file(&path)?;
                debug!("Discarded bucket {} ({} rows, {} bytes)", key, rows, size);
                outputs.buckets_discarded += 1;
            } else {
                debug!("Kept bucket {} ({} rows, {} bytes)", key, rows, size);
                outputs.buckets_written += 1;
                outputs.files.push((key, path));
            }
        }

        Ok(outputs)
    }
}

/// One produced file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub key: String,
    pub path: PathBuf,
}

/// Ordered record of every file a run produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputManifest {
    pub entries: Vec<ManifestEntry>,
}

impl OutputManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the entry for `key`
    pub fn insert(&mut self, key: impl Into<String>, path: impl Into<PathBuf>) {
        let key = key.into();
        let path = path.into();
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.path = path,
            None => self.entries.push(ManifestEntry { key, path }),
        }
    }

    pub fn extend(&mut self, files: impl IntoIterator<Item = (String, PathBuf)>) {
        for (key, path) in files {
            self.insert(key, path);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write `manifest.json` into `dir`
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MANIFEST_FILENAME);
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, self)?;
        debug!("Manifest with {} entries written to {}", self.len(), path.display());
        Ok(path)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}
