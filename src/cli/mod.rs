//! Command-line parsing for the bloom dashboard backend.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the series/math code. Every source setting can also come from
//! the environment (or a `.env` file).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    DEFAULT_BAND_COLUMN, DEFAULT_DATE_COLUMN, DEFAULT_RAINFALL_MEASURE, DEFAULT_RAINFALL_SOURCE,
    DEFAULT_SATELLITE_SOURCE, DEFAULT_TEMPERATURE_LABEL, DEFAULT_TEMPERATURE_SOURCE,
};

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bloom", version, about = "Desert bloom dashboard backend (CSV ingestion + aggregation)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the dashboard JSON API.
    Serve(ServeArgs),
    /// Print the temperature and rainfall series, computed or default.
    Series(SeriesArgs),
    /// Aggregate satellite observations and forecast bloom intensity.
    Forecast(ForecastArgs),
    /// Identify a plant from an image file name.
    Identify(IdentifyArgs),
}

/// Where the tables live and which rows/columns to read.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Base directory for relative source paths.
    #[arg(long, env = "BLOOM_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Wide monthly temperature table (path or http(s) URL).
    #[arg(long, env = "BLOOM_TEMPERATURE_SOURCE", default_value = DEFAULT_TEMPERATURE_SOURCE)]
    pub temperature_source: String,

    /// Long climate-indicator table (path or http(s) URL).
    #[arg(long, env = "BLOOM_RAINFALL_SOURCE", default_value = DEFAULT_RAINFALL_SOURCE)]
    pub rainfall_source: String,

    /// Point-sampled satellite observations (path or http(s) URL).
    #[arg(long, env = "BLOOM_SATELLITE_SOURCE", default_value = DEFAULT_SATELLITE_SOURCE)]
    pub satellite_source: String,

    /// Column-0 label of the temperature row to extract.
    #[arg(long, default_value = DEFAULT_TEMPERATURE_LABEL)]
    pub temperature_label: String,

    /// Measure code of the rainfall rows.
    #[arg(long, default_value = DEFAULT_RAINFALL_MEASURE)]
    pub rainfall_measure: String,

    /// Satellite date column.
    #[arg(long, default_value = DEFAULT_DATE_COLUMN)]
    pub date_column: String,

    /// Satellite band column used as bloom intensity.
    #[arg(long, default_value = DEFAULT_BAND_COLUMN)]
    pub band_column: String,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Listen address.
    #[arg(long, env = "BLOOM_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,
}

#[derive(Debug, Args, Clone)]
pub struct SeriesArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Export the series to CSV.
    #[arg(long = "export-csv")]
    pub export_csv: Option<PathBuf>,

    /// Export the series to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Target year.
    #[arg(long, default_value_t = 2026)]
    pub year: i32,

    /// Target month (1-12).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,

    /// Export aggregates and prediction to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct IdentifyArgs {
    /// Uploaded image file name.
    pub file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_defaults_to_january_2026() {
        let cli = Cli::try_parse_from(["bloom", "forecast"]).unwrap();
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!((args.year, args.month), (2026, 1));
        assert_eq!(args.sources.band_column, "HLSS30_020_B08");
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["bloom", "forecast", "--month", "13"]).is_err());
    }

    #[test]
    fn identify_takes_a_file_name() {
        let cli = Cli::try_parse_from(["bloom", "identify", "ghaf.jpg"]).unwrap();
        assert!(matches!(cli.command, Command::Identify(IdentifyArgs { ref file_name }) if file_name == "ghaf.jpg"));
    }
}
