///! Catalog format conversion.
///!
///! Usage:
///!   skywatch-catalog json-to-csv catalog.json catalog.csv
///!   skywatch-catalog csv-to-json catalog.csv catalog.json

mod convert;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "skywatch-catalog")]
#[command(about = "Convert the target catalog between JSON and CSV")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Array of records, or a `{"data": {...}}` mapping, to CSV.
    JsonToCsv { input: PathBuf, output: PathBuf },
    /// CSV with a header row to a JSON array of string-valued records.
    CsvToJson { input: PathBuf, output: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::JsonToCsv { input, output } => {
            let rows = convert::json_file_to_csv(&input, &output)?;
            tracing::info!("Wrote {} rows to {}", rows, output.display());
        }
        Command::CsvToJson { input, output } => {
            let records = convert::csv_file_to_json(&input, &output)?;
            tracing::info!("Wrote {} records to {}", records, output.display());
        }
    }

    Ok(())
}
