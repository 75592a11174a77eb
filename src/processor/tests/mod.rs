//! Processor tests

pub mod pipeline_tests;

use crate::config::{BucketScheme, CedenConfig, DatasetConfig};
use crate::models::DatasetKind;
use crate::processor::source::MemorySource;
use chrono::NaiveDate;
use std::path::Path;

pub const STATION_COLUMNS: &[&str] = &["StationCode", "StationName", "Latitude", "Longitude", "Datum"];

pub const CHEMISTRY_COLUMNS: &[&str] = &[
    "Program",
    "StationName",
    "StationCode",
    "SampleDate",
    "Analyte",
    "Result",
    "ResultQualCode",
    "QACode",
    "BatchVerification",
    "TargetLatitude",
    "TargetLongitude",
];

pub fn row(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn station_rows() -> Vec<Vec<String>> {
    vec![
        row(&["S1", "Creek", "37.1", "-122.1", "NAD83"]),
        row(&["S2", "River", "38.0", "121.5", "NAD27"]),
    ]
}

/// Rows covering a pass, a reject, a missing datum, a bad date and an out-of-range year
pub fn chemistry_rows() -> Vec<Vec<String>> {
    vec![
        row(&["SWAMP", "Creek", "S1", "2019-05-01 00:00:00", "E. coli", "10", "=", "None", "VLC", "37.1", "-122.1"]),
        row(&["SWAMP", "River", "S2", "2021-07-04 00:00:00", "Oxygen", "7.4", "=", "BT", "VLC", "38.0", "121.5"]),
        row(&["SWAMP", "Pond", "S3", "2019-08-01 00:00:00", "Enterococcus", "3", "=", "None", "VLC", "36.0", "-120.0"]),
        row(&["SWAMP", "Creek", "S1", "bad", "Oxygen", "6.1", "DNQ", "None", "VLC", "37.1", "-122.1"]),
        row(&["SWAMP", "River", "S2", "2030-01-01 00:00:00", "Oxygen", "n/a", "=", "None", "VLC", "38.0", "-121.5"]),
    ]
}

pub fn memory_source() -> MemorySource {
    MemorySource::new()
        .with_table(DatasetKind::Stations.default_table(), STATION_COLUMNS, station_rows())
        .with_table(DatasetKind::WaterChemistry.default_table(), CHEMISTRY_COLUMNS, chemistry_rows())
}

/// Stations then water chemistry, yearly buckets 2019..=2021, no size floor
pub fn test_config(output_dir: &Path) -> CedenConfig {
    CedenConfig::new(output_dir, output_dir)
        .with_run_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        .with_buckets(BucketScheme::Yearly {
            first_year: 2019,
            last_year: Some(2021),
        })
        .with_min_bucket_bytes(0)
        .with_datasets(vec![
            DatasetConfig::new(DatasetKind::Stations),
            DatasetConfig::new(DatasetKind::WaterChemistry),
        ])
}

/// Header and rows of a written file
pub fn read_output(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader.headers().unwrap().iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}

pub fn column(header: &[String], name: &str) -> usize {
    header.iter().position(|h| h == name).unwrap()
}
