//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments
//! - runs the shared pipeline (or starts the HTTP server)
//! - prints reports and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ForecastArgs, IdentifyArgs, SeriesArgs, ServeArgs, SourceArgs};
use crate::domain::{PipelineConfig, SeriesKind, YearMonth};
use crate::error::{AppError, EXIT_INPUT, EXIT_NO_DATA, EXIT_SERVER};
use crate::series::{FallbackPolicy, infeasible_reason};

pub mod pipeline;

const DEFAULT_LOG_FILTER: &str = "info,bloomcast=info,tower_http=info";

/// Entry point for the `bloom` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    // `bloom` and `bloom --bind ...` behave like `bloom serve ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Serve(args) => handle_serve(args),
        Command::Series(args) => handle_series(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Identify(args) => handle_identify(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // Logs go to stderr so CLI reports on stdout stay pipeable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args.sources);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::new(EXIT_SERVER, format!("Failed to start async runtime: {e}")))?;

    runtime.block_on(crate::server::serve(config, FallbackPolicy::default(), &args.bind))
}

fn handle_series(args: SeriesArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args.sources);
    let policy = FallbackPolicy::default();

    let temperature = policy.resolve(SeriesKind::Temperature, pipeline::load_temperature_series(&config));
    let rainfall = policy.resolve(SeriesKind::Rainfall, pipeline::load_rainfall_series(&config));
    let series = [&temperature, &rainfall];

    println!("{}", crate::report::format_series_summary(&series));

    if let Some(path) = &args.export_csv {
        crate::io::export::write_series_csv(path, &series)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::export::write_series_json(path, &series)?;
    }

    Ok(())
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let target = YearMonth::new(args.year, args.month)
        .ok_or_else(|| AppError::new(EXIT_INPUT, format!("Invalid target month: {}", args.month)))?;

    let mut config = pipeline_config_from_args(&args.sources);
    config.forecast_target = target;

    let run = pipeline::run_forecast(&config, config.forecast_target)?;
    println!("{}", crate::report::format_forecast(&run, target));

    if let Some(path) = &args.export_json {
        crate::io::export::write_forecast_json(path, &run, target)?;
    }

    // Infeasible regression: the report already carries the reason.
    run.forecast
        .map(|_| ())
        .map_err(|e| AppError::new(EXIT_NO_DATA, infeasible_reason(e)))
}

fn handle_identify(args: IdentifyArgs) -> Result<(), AppError> {
    let plant = crate::identify::identify_by_file_name(&args.file_name);
    print!("{}", crate::report::format_plant(&args.file_name, &plant));
    Ok(())
}

pub fn pipeline_config_from_args(args: &SourceArgs) -> PipelineConfig {
    PipelineConfig {
        data_dir: args.data_dir.clone(),
        temperature_source: args.temperature_source.clone(),
        rainfall_source: args.rainfall_source.clone(),
        satellite_source: args.satellite_source.clone(),
        temperature_label: args.temperature_label.clone(),
        rainfall_measure: args.rainfall_measure.clone(),
        date_column: args.date_column.clone(),
        band_column: args.band_column.clone(),
        ..PipelineConfig::default()
    }
}

/// Rewrite argv so `bloom` defaults to `bloom serve`.
///
/// Rules:
/// - `bloom`                       -> `bloom serve`
/// - `bloom --bind 0.0.0.0:80 ...` -> `bloom serve --bind 0.0.0.0:80 ...`
/// - `bloom --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("serve".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // A leading flag belongs to `serve`.
    if arg1.starts_with('-') {
        argv.insert(1, "serve".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_serves() {
        assert_eq!(rewrite_args(args(&["bloom"])), args(&["bloom", "serve"]));
        assert_eq!(
            rewrite_args(args(&["bloom", "--bind", "127.0.0.1:9000"])),
            args(&["bloom", "serve", "--bind", "127.0.0.1:9000"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(args(&["bloom", "forecast"])), args(&["bloom", "forecast"]));
        assert_eq!(rewrite_args(args(&["bloom", "--help"])), args(&["bloom", "--help"]));
    }

    #[test]
    fn config_keeps_source_flags() {
        let cli = crate::cli::Cli::try_parse_from([
            "bloom",
            "series",
            "--data-dir",
            "/srv/bloom",
            "--rainfall-source",
            "https://example.org/rain.csv",
        ])
        .unwrap();
        let Command::Series(series) = cli.command else {
            panic!("expected series");
        };
        let config = pipeline_config_from_args(&series.sources);
        assert_eq!(config.data_dir, std::path::PathBuf::from("/srv/bloom"));
        assert_eq!(config.rainfall_source, "https://example.org/rain.csv");
        assert_eq!(config.forecast_target, YearMonth::new(2026, 1).unwrap());
    }
}
