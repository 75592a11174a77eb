use anyhow::Context;
use ceden_refresh::cli::{args::Args, commands};
use clap::Parser;
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args).context("CEDEN refresh failed") {
        Ok(_stats) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("CEDEN Refresh - California water-quality open-data refresh");
    println!("============================================================");
    println!();
    println!("Cleans CEDEN warehouse exports, assigns a data-quality category to every");
    println!("record and writes all-years files, yearly buckets and a site directory.");
    println!();
    println!("USAGE:");
    println!("    ceden-refresh <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Run a full refresh over the configured datasets");
    println!("    subset      Filter an existing output file down to a list of analytes");
    println!("    classify    Report data-quality categories for an existing export");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Refresh the default datasets from ./exports into ./output:");
    println!("    ceden-refresh process");
    println!();
    println!("    # Only water chemistry, yearly buckets from 2010:");
    println!("    ceden-refresh process --datasets stations,water_chemistry --first-year 2010");
    println!();
    println!("    # Rebuild the Safe To Swim extract from an existing file:");
    println!("    ceden-refresh subset --input output/WaterChemistryData_2024-01-02.csv --preset safe-to-swim");
    println!();
    println!("For detailed help on any command, use:");
    println!("    ceden-refresh <COMMAND> --help");
}
