//! Command implementations for the CEDEN refresh CLI
//!
//! Each subcommand sets up logging, resolves the layered configuration
//! (defaults, config file, environment, flags) and reports its outcome in
//! the requested output format.

use crate::cli::args::{Args, ClassifyArgs, Commands, OutputFormat, ProcessArgs, SubsetArgs};
use crate::config::{BucketScheme, CedenConfig, SubsetConfig};
use crate::error::{CedenError, Result};
use crate::models::{ProcessingStats, QualityCategory};
use crate::processor::writer::OutputManifest;
use crate::processor::{DatasetProcessor, classify_file};
use crate::quality::CodeTable;
use crate::subset::subset_file;
use crate::upload::{ResolvedUpload, UploadPlan};
use colored::*;
use indicatif::HumanDuration;
use std::path::Path;
use tracing::{debug, info, warn};

/// Dispatch to the subcommand handler
pub fn run(args: Args) -> Result<ProcessingStats> {
    match args.command {
        Some(Commands::Process(process_args)) => run_process(&process_args),
        Some(Commands::Subset(subset_args)) => run_subset(&subset_args),
        Some(Commands::Classify(classify_args)) => run_classify(&classify_args),
        None => Err(CedenError::configuration("No command given")),
    }
}

/// Full refresh: every configured dataset, sites, subsets and manifest
pub fn run_process(args: &ProcessArgs) -> Result<ProcessingStats> {
    setup_logging(args.get_log_level(), args.quiet);
    info!("Starting CEDEN refresh");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let mut config = load_configuration(args.config_file.as_deref())?;
    apply_cli_overrides(&mut config, args)?;
    config.validate()?;

    if args.dry_run {
        return run_dry_run(&config);
    }

    let processor = DatasetProcessor::new(config)?.with_progress(args.show_progress());
    let outcome = processor.process()?;

    let uploads = UploadPlan::new(processor.config().uploads.clone()).resolve(&outcome.manifest);
    info!("{} files ready for upload", uploads.len());

    generate_final_report(args.output_format, &outcome.stats, &outcome.manifest, &uploads)?;
    Ok(outcome.stats)
}

/// Re-run one topic extract over an existing output file
pub fn run_subset(args: &SubsetArgs) -> Result<ProcessingStats> {
    setup_logging(args.get_log_level(), false);
    args.validate()?;

    let mut config = load_configuration(args.config_file.as_deref())?;
    if let Some(output_path) = &args.output_path {
        config.output_dir = output_path.clone();
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    std::fs::create_dir_all(&config.output_dir)?;

    let subset = match (&args.preset, &args.field) {
        (Some(preset), _) => {
            let mut subset = preset.0.to_config(args.input_file.display().to_string());
            if let Some(name) = &args.name {
                subset.name = name.clone();
            }
            subset
        }
        (None, Some(field)) => SubsetConfig {
            name: args.name.clone().unwrap_or_default(),
            source: args.input_file.display().to_string(),
            field: field.clone(),
            values: args.values.clone(),
        },
        (None, None) => {
            return Err(CedenError::configuration(
                "Either --preset or --field with --values is required",
            ));
        }
    };

    let outcome = subset_file(&args.input_file, &subset, &config)?;
    println!(
        "{} {} {}",
        "Subset".bright_green().bold(),
        outcome.name.bright_white().bold(),
        format!("({} rows, {} sites)", outcome.rows, outcome.sites).bright_cyan()
    );
    println!("   • {}", outcome.data_path.display());
    println!("   • {}", outcome.sites_path.display());

    Ok(ProcessingStats {
        datasets_processed: 1,
        records_processed: outcome.rows,
        sites_collected: outcome.sites,
        ..Default::default()
    })
}

/// Classify an existing export and report the category counts
pub fn run_classify(args: &ClassifyArgs) -> Result<ProcessingStats> {
    setup_logging(args.get_log_level(), false);
    args.validate()?;

    let config = load_configuration(args.config_file.as_deref())?;
    let registry = CodeTable::standard()?.with_overrides(&config.code_table_overrides)?;
    let stats = classify_file(&args.input_file, args.kind.0, &registry, args.delimiter as u8)?;

    generate_final_report(args.output_format, &stats, &OutputManifest::new(), &[])?;
    Ok(stats)
}

/// Set up structured logging at `log_level`
fn setup_logging(log_level: &str, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ceden_refresh={}", log_level)));

    let result = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if result.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}

/// Defaults, then the explicit or default config file, then the environment
pub fn load_configuration(config_file: Option<&Path>) -> Result<CedenConfig> {
    let default_config_path = CedenConfig::default_config_path();
    let config_file = config_file.or_else(|| {
        default_config_path
            .as_deref()
            .filter(|path| path.exists())
    });

    match config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => info!("No config file found, using defaults and environment variables"),
    }

    CedenConfig::load_layered(config_file)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut CedenConfig, args: &ProcessArgs) -> Result<()> {
    if let Some(input_path) = &args.input_path {
        config.input_dir = input_path.clone();
    }
    if let Some(output_path) = &args.output_path {
        config.output_dir = output_path.clone();
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    if let Some(stations_file) = &args.stations_file {
        config.stations_file = Some(stations_file.clone());
    }
    if let Some(first_year) = args.first_year {
        config.buckets = BucketScheme::Yearly {
            first_year,
            last_year: args.last_year,
        };
    }
    if let Some(bytes) = args.min_bucket_bytes {
        config.min_bucket_bytes = bytes;
    }
    if let Some(run_date) = args.run_date {
        config.run_date = Some(run_date);
    }
    if let Some(datasets) = args.get_datasets() {
        config.retain_datasets(&datasets)?;
    }
    Ok(())
}

/// List what a refresh would read and write without touching the output directory
pub fn run_dry_run(config: &CedenConfig) -> Result<ProcessingStats> {
    info!("Performing dry run - no files will be created");

    let buckets = config.resolved_buckets();
    let mut stats = ProcessingStats::default();

    println!("{}", "Dry run".bright_yellow().bold());
    for dataset in &config.datasets {
        let input = config.input_path(dataset.table());
        if input.is_file() {
            stats.datasets_processed += 1;
        } else {
            warn!("Export for {} not found at {}", dataset.name(), input.display());
        }

        let bucket_count = if dataset.kind.is_stations() { 0 } else { buckets.len() };
        println!(
            "   • {} {} {}",
            dataset.name().bright_cyan(),
            format!("<- {}", input.display()).bright_black(),
            format!("({} candidate buckets)", bucket_count).bright_black()
        );
        println!("       -> {}", config.output_path(dataset.name()).display());
    }
    for subset in &config.subsets {
        println!(
            "   • {} {}",
            subset.name.bright_cyan(),
            format!("<- {} filtered on {}", subset.source, subset.field).bright_black()
        );
    }

    info!(
        "Dry run complete: {} of {} exports present",
        stats.datasets_processed,
        config.datasets.len()
    );
    Ok(stats)
}

/// Format a byte count in human-readable units
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn generate_final_report(
    format: OutputFormat,
    stats: &ProcessingStats,
    manifest: &OutputManifest,
    uploads: &[ResolvedUpload],
) -> Result<()> {
    match format {
        OutputFormat::Human => generate_human_report(stats, manifest, uploads),
        OutputFormat::Json => {
            let report = json_report(stats, manifest, uploads);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Csv => print!("{}", csv_report(stats)),
    }
    Ok(())
}

fn generate_human_report(stats: &ProcessingStats, manifest: &OutputManifest, uploads: &[ResolvedUpload]) {
    println!("\n🎉 {}", "CEDEN Refresh Complete!".bright_green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📊 Processing Summary:");
    println!("   • Datasets processed: {}", stats.datasets_processed);
    println!("   • Records processed: {}", stats.records_processed);
    println!(
        "   • Year buckets kept: {} (discarded {})",
        stats.buckets_written, stats.buckets_discarded
    );
    println!("   • Sites collected: {}", stats.sites_collected);
    println!("   • Processing time: {}", HumanDuration(stats.processing_time));

    if stats.coercion_fallbacks > 0 {
        println!("⚠️  Non-numeric values replaced: {}", stats.coercion_fallbacks);
    }
    if stats.classification_errors > 0 {
        println!(
            "⚠️  {}",
            format!("Records classified as errors in data: {}", stats.classification_errors)
                .bright_yellow()
        );
    }
    if stats.undated_records > 0 {
        println!(
            "⚠️  {}",
            format!("Records with unreadable sample dates: {}", stats.undated_records).bright_yellow()
        );
    }

    if !stats.records_by_quality.is_empty() {
        println!("\n🔎 Data Quality:");
        for (category, count) in &stats.records_by_quality {
            let line = format!("{}: {}", category, count);
            let line = match category {
                QualityCategory::Passed | QualityCategory::MetaData => line.bright_green(),
                QualityCategory::RejectRecord | QualityCategory::ErrorInData => line.bright_red(),
                _ => line.bright_yellow(),
            };
            println!("   • {}", line);
        }
    }

    if !manifest.is_empty() {
        println!("\n📁 Output Files:");
        for entry in &manifest.entries {
            println!(
                "   • {}: {}",
                entry.key,
                format_size(file_size(&entry.path)).bright_black()
            );
        }
    }

    if !uploads.is_empty() {
        println!("\n☁️  Ready for upload:");
        for upload in uploads {
            println!("   • {} <- {}", upload.resource_id.bright_cyan(), upload.path.display());
        }
    }

    println!();
}

fn json_report(
    stats: &ProcessingStats,
    manifest: &OutputManifest,
    uploads: &[ResolvedUpload],
) -> serde_json::Value {
    let by_quality: serde_json::Map<String, serde_json::Value> = stats
        .records_by_quality
        .iter()
        .map(|(category, count)| (category.label().to_string(), (*count).into()))
        .collect();

    serde_json::json!({
        "datasets_processed": stats.datasets_processed,
        "records_processed": stats.records_processed,
        "records_by_quality": by_quality,
        "classification_errors": stats.classification_errors,
        "undated_records": stats.undated_records,
        "coercion_fallbacks": stats.coercion_fallbacks,
        "buckets_written": stats.buckets_written,
        "buckets_discarded": stats.buckets_discarded,
        "sites_collected": stats.sites_collected,
        "processing_time_seconds": stats.processing_time.as_secs_f64(),
        "output_files": manifest.entries.iter().map(|entry| {
            serde_json::json!({
                "key": entry.key,
                "path": entry.path,
                "size_bytes": file_size(&entry.path),
            })
        }).collect::<Vec<_>>(),
        "uploads": uploads,
    })
}

fn csv_report(stats: &ProcessingStats) -> String {
    let mut report = String::from("metric,value\n");
    let mut row = |metric: &str, value: String| {
        report.push_str(&format!("{},{}\n", metric, value));
    };
    row("datasets_processed", stats.datasets_processed.to_string());
    row("records_processed", stats.records_processed.to_string());
    for (category, count) in &stats.records_by_quality {
        row(&format!("quality:{}", category.label()), count.to_string());
    }
    row("classification_errors", stats.classification_errors.to_string());
    row("undated_records", stats.undated_records.to_string());
    row("coercion_fallbacks", stats.coercion_fallbacks.to_string());
    row("buckets_written", stats.buckets_written.to_string());
    row("buckets_discarded", stats.buckets_discarded.to_string());
    row("sites_collected", stats.sites_collected.to_string());
    row(
        "processing_time_seconds",
        stats.processing_time.as_secs_f64().to_string(),
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::Args;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn process_args(argv: &[&str]) -> ProcessArgs {
        let mut full = vec!["ceden-refresh", "process"];
        full.extend_from_slice(argv);
        match Args::try_parse_from(full).unwrap().command {
            Some(Commands::Process(args)) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1024 * 1024), "1.00 MB");
    }

    #[test]
    fn test_apply_cli_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = CedenConfig::default();
        let args = process_args(&[
            "--output",
            temp_dir.path().to_str().unwrap(),
            "--delimiter",
            "|",
            "--first-year",
            "2015",
            "--last-year",
            "2018",
            "--min-bucket-bytes",
            "100",
            "--run-date",
            "2024-03-05",
            "--datasets",
            "water_chemistry,WQX_Stations",
        ]);

        apply_cli_overrides(&mut config, &args).unwrap();

        assert_eq!(config.output_dir, temp_dir.path());
        assert_eq!(config.delimiter, '|');
        assert_eq!(
            config.buckets,
            BucketScheme::Yearly {
                first_year: 2015,
                last_year: Some(2018)
            }
        );
        assert_eq!(config.min_bucket_bytes, 100);
        assert_eq!(config.run_date_label(), "2024-03-05");
        let names: Vec<&str> = config.datasets.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["WQX_Stations", "WaterChemistryData"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_dataset_override_fails() {
        let mut config = CedenConfig::default();
        let args = process_args(&["--datasets", "SedimentData"]);
        assert!(apply_cli_overrides(&mut config, &args).is_err());
    }

    #[test]
    fn test_dry_run_counts_present_exports() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("WQDMart_MV.csv"), "StationCode\n").unwrap();

        let output = temp_dir.path().join("out");
        let config = CedenConfig::new(temp_dir.path(), &output);
        let stats = run_dry_run(&config).unwrap();

        assert_eq!(stats.datasets_processed, 1);
        assert!(!output.exists());
    }

    #[test]
    fn test_json_and_csv_reports() {
        let mut stats = ProcessingStats {
            datasets_processed: 2,
            records_processed: 10,
            ..Default::default()
        };
        stats.record_verdict(QualityCategory::Passed);
        stats.record_verdict(QualityCategory::RejectRecord);

        let mut manifest = OutputManifest::new();
        manifest.insert("WaterChemistryData", PathBuf::from("/nonexistent/wq.csv"));
        let uploads = vec![ResolvedUpload {
            resource_id: "abc".to_string(),
            path: PathBuf::from("/nonexistent/wq.csv"),
        }];

        let report = json_report(&stats, &manifest, &uploads);
        assert_eq!(report["records_processed"], 10);
        assert_eq!(report["records_by_quality"]["Reject record"], 1);
        assert_eq!(report["output_files"][0]["key"], "WaterChemistryData");
        assert_eq!(report["output_files"][0]["size_bytes"], 0);
        assert_eq!(report["uploads"][0]["resource_id"], "abc");

        let csv = csv_report(&stats);
        assert!(csv.starts_with("metric,value\ndatasets_processed,2\n"));
        assert!(csv.contains("quality:Passed,1\n"));
    }
}
