//! End-to-end dataset pass tests over in-memory tables

use super::*;
use crate::error::CedenError;
use crate::models::QualityCategory;
use crate::processor::{DatasetProcessor, classify_file};
use crate::quality::CodeTable;
use crate::subset::SubsetPreset;
use std::fs;
use tempfile::TempDir;

fn processor(config: CedenConfig) -> DatasetProcessor {
    DatasetProcessor::new(config)
        .unwrap()
        .with_source(Box::new(memory_source()))
}

#[test]
fn test_refresh_writes_expected_files() {
    let dir = TempDir::new().unwrap();
    let outcome = processor(test_config(dir.path())).process().unwrap();

    let keys: Vec<&str> = outcome.manifest.entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "WQX_Stations",
            "WaterChemistryData",
            "WaterChemistryData_year-2019",
            "WaterChemistryData_year-2021",
            "All_CEDEN_Sites",
        ]
    );
    assert_eq!(
        outcome.manifest.get("WaterChemistryData").unwrap(),
        dir.path().join("WaterChemistryData_2024-01-02.csv")
    );
    assert!(!dir.path().join("WaterChemistryData_year-2020_2024-01-02.csv").exists());
    assert!(outcome.manifest_path.is_file());

    assert_eq!(outcome.stats.datasets_processed, 2);
    assert_eq!(outcome.stats.records_processed, 7);
    assert_eq!(outcome.stats.buckets_written, 2);
    assert_eq!(outcome.stats.buckets_discarded, 1);
    assert_eq!(outcome.stats.sites_collected, 3);
}

#[test]
fn test_output_header_and_verdicts() {
    let dir = TempDir::new().unwrap();
    let outcome = processor(test_config(dir.path())).process().unwrap();

    let (header, rows) = read_output(outcome.manifest.get("WaterChemistryData").unwrap());
    assert_eq!(&header[9..], &["Latitude", "Longitude", "DataQuality", "DataQualityIndicator", "Datum"]);
    assert_eq!(rows.len(), 5);

    let quality = column(&header, "DataQuality");
    let indicator = column(&header, "DataQualityIndicator");
    let verdicts: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r[quality].as_str(), r[indicator].as_str()))
        .collect();
    assert_eq!(
        verdicts,
        vec![
            ("Passed", ""),
            ("Reject record", "QACode:BT"),
            ("Spatial accuracy unknown", "Datum:NR"),
            ("Error in data", "SampleDate:bad"),
            ("Passed", ""),
        ]
    );

    let by_quality = &outcome.stats.records_by_quality;
    assert_eq!(by_quality[&QualityCategory::Passed], 2);
    assert_eq!(by_quality[&QualityCategory::ErrorInData], 1);
    assert_eq!(outcome.stats.classification_errors, 1);
    assert_eq!(outcome.stats.undated_records, 1);
}

#[test]
fn test_unreadable_date_without_dnq_is_counted() {
    let dir = TempDir::new().unwrap();
    let source = MemorySource::new().with_table(
        DatasetKind::WaterChemistry.default_table(),
        CHEMISTRY_COLUMNS,
        vec![row(&["SWAMP", "Creek", "S1", "05/01/2019", "E. coli", "10", "=", "None", "VLC", "37.1", "-122.1"])],
    );
    let config = test_config(dir.path()).with_datasets(vec![DatasetConfig::new(DatasetKind::WaterChemistry)]);
    let outcome = DatasetProcessor::new(config)
        .unwrap()
        .with_source(Box::new(source))
        .process()
        .unwrap();

    assert_eq!(outcome.stats.records_processed, 1);
    assert_eq!(outcome.stats.classification_errors, 0);
    assert_eq!(outcome.stats.undated_records, 1);
    assert_eq!(outcome.stats.buckets_written, 0);

    let (_, rows) = read_output(outcome.manifest.get("WaterChemistryData").unwrap());
    assert_eq!(rows.len(), 1);
    assert!(outcome.manifest.get("WaterChemistryData_year-2019").is_none());
}

#[test]
fn test_enrichment_in_output() {
    let dir = TempDir::new().unwrap();
    let outcome = processor(test_config(dir.path())).process().unwrap();

    let (header, rows) = read_output(outcome.manifest.get("WaterChemistryData").unwrap());
    let result = column(&header, "Result");
    let longitude = column(&header, "Longitude");
    let datum = column(&header, "Datum");

    assert_eq!(rows[0][result], "10.0");
    assert_eq!(rows[4][result], "NaN");
    assert_eq!(rows[1][longitude], "-121.5");
    assert_eq!(rows[0][datum], "NAD83");
    assert_eq!(rows[1][datum], "NAD27");
    assert_eq!(rows[2][datum], "NR");
    assert_eq!(outcome.stats.coercion_fallbacks, 1);
}

#[test]
fn test_stations_pass_through() {
    let dir = TempDir::new().unwrap();
    let outcome = processor(test_config(dir.path())).process().unwrap();

    let (header, rows) = read_output(outcome.manifest.get("WQX_Stations").unwrap());
    assert_eq!(header, STATION_COLUMNS);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][3], "-121.5");
    assert!(outcome.manifest.get("WQX_Stations_year-2019").is_none());
}

#[test]
fn test_rows_routed_to_year_buckets() {
    let dir = TempDir::new().unwrap();
    let outcome = processor(test_config(dir.path())).process().unwrap();

    let (header, rows) = read_output(outcome.manifest.get("WaterChemistryData_year-2019").unwrap());
    let station = column(&header, "StationCode");
    assert_eq!(
        rows.iter().map(|r| r[station].as_str()).collect::<Vec<_>>(),
        vec!["S1", "S3"]
    );

    let (_, rows) = read_output(outcome.manifest.get("WaterChemistryData_year-2021").unwrap());
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_small_buckets_are_discarded() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path()).with_min_bucket_bytes(2000);
    let outcome = processor(config).process().unwrap();

    assert_eq!(outcome.stats.buckets_written, 0);
    assert_eq!(outcome.stats.buckets_discarded, 3);
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains("_year-"))
        .collect();
    assert!(leftovers.is_empty(), "unexpected buckets: {:?}", leftovers);
}

#[test]
fn test_site_directory_first_seen() {
    let dir = TempDir::new().unwrap();
    let outcome = processor(test_config(dir.path())).process().unwrap();

    let (header, rows) = read_output(outcome.manifest.get("All_CEDEN_Sites").unwrap());
    assert_eq!(header, vec!["StationName", "SiteCode", "Latitude", "Longitude", "Datum"]);
    assert_eq!(
        rows,
        vec![
            row(&["Creek", "S1", "37.1", "-122.1", "NAD83"]),
            row(&["River", "S2", "38.0", "-121.5", "NAD27"]),
            row(&["Pond", "S3", "36.0", "-120.0", "NR"]),
        ]
    );
}

#[test]
fn test_stations_file_supplies_datums() {
    let dir = TempDir::new().unwrap();
    let stations = dir.path().join("stations_input.csv");
    fs::write(&stations, "StationCode,Datum\nS3,WGS84\n").unwrap();

    let config = test_config(dir.path())
        .with_datasets(vec![DatasetConfig::new(DatasetKind::WaterChemistry)])
        .with_stations_file(&stations);
    let outcome = processor(config).process().unwrap();

    let (header, rows) = read_output(outcome.manifest.get("WaterChemistryData").unwrap());
    let datum = column(&header, "Datum");
    assert_eq!(rows[0][datum], "NR");
    assert_eq!(rows[2][datum], "WGS84");
}

#[test]
fn test_subset_runs_after_datasets() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path())
        .with_subset(SubsetPreset::SafeToSwim.to_config("WaterChemistryData"));
    let outcome = processor(config).process().unwrap();

    let (_, rows) = read_output(outcome.manifest.get("SafeToSwim").unwrap());
    assert_eq!(rows.len(), 2);
    let (_, sites) = read_output(outcome.manifest.get("Sites_for_SafeToSwim").unwrap());
    assert_eq!(sites.len(), 2);
}

#[test]
fn test_subset_of_unknown_dataset_fails() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path())
        .with_subset(SubsetPreset::SafeToSwim.to_config("ToxicityData"));
    let result = processor(config).process();
    assert!(matches!(result, Err(CedenError::Configuration { .. })));
}

#[test]
fn test_missing_table_is_extraction_error() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path()).with_datasets(vec![
        DatasetConfig::new(DatasetKind::Stations),
        DatasetConfig::new(DatasetKind::Toxicity),
    ]);
    let result = processor(config).process();
    assert!(matches!(result, Err(CedenError::Extraction { .. })));
}

#[test]
fn test_stations_must_come_first() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path()).with_datasets(vec![
        DatasetConfig::new(DatasetKind::WaterChemistry),
        DatasetConfig::new(DatasetKind::Stations),
    ]);
    assert!(DatasetProcessor::new(config).is_err());
}

#[test]
fn test_classify_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chem.csv");
    fs::write(
        &path,
        "StationCode,SampleDate,ResultQualCode,QACode,Datum\n\
         S1,2019-01-01,=,None,NAD83\n\
         S1,2019-01-01,=,BT,NAD83\n\
         S1,garbage,DNQ,None,NAD83\n",
    )
    .unwrap();

    let stats = classify_file(
        &path,
        DatasetKind::WaterChemistry,
        &CodeTable::standard().unwrap(),
        b',',
    )
    .unwrap();
    assert_eq!(stats.records_processed, 3);
    assert_eq!(stats.records_by_quality[&QualityCategory::Passed], 1);
    assert_eq!(stats.records_by_quality[&QualityCategory::RejectRecord], 1);
    assert_eq!(stats.classification_errors, 1);
}
