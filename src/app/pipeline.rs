//! Shared dashboard/forecast pipeline used by both the CLI and the HTTP server.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! read source -> parse table -> extract/normalize -> aggregate -> fallback
//!
//! Each series is resolved independently, so a missing temperature table
//! never hides a rainfall series that computed fine.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::{DeliveredSeries, PipelineConfig, SeriesKind, TimePoint, YearMonth};
use crate::error::AppError;
use crate::io::source::{DataSource, SourceError};
use crate::io::table::{parse_grid, parse_records};
use crate::math::ols::RegressionError;
use crate::series::{
    BloomAggregate, BloomForecast, FallbackPolicy, MonthlyBuckets, SeriesUnavailable, aggregate_bloom,
    bloom_samples_from_records, extract_temperature_series, forecast_bloom, normalize_indicators,
};

pub const DEFAULT_VEGETATION: &str = "Desert Vegetation";
pub const NO_PREDICTION: &str = "No prediction available";

/// A plant the dashboard knows how to describe.
#[derive(Debug)]
pub struct PlantProfile {
    pub id: &'static str,
    pub dominant_vegetation: &'static str,
    pub bloom_outlook: &'static str,
}

pub const PLANT_PROFILES: &[PlantProfile] = &[PlantProfile {
    id: "tribulus",
    dominant_vegetation: "Tribulus Omanense",
    bloom_outlook: "High bloom intensity expected in March-April based on current rainfall and temperature patterns.",
}];

/// Look up a plant identifier (case-insensitive).
pub fn plant_profile(id: &str) -> Option<&'static PlantProfile> {
    let id = id.trim();
    PLANT_PROFILES.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}

#[derive(Debug, Clone)]
pub struct DashboardRequest {
    pub date: NaiveDate,
    pub city: Option<String>,
    pub plant: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlantBloom {
    pub profile: &'static PlantProfile,
    pub series: DeliveredSeries,
}

/// All computed outputs of one dashboard request.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub date: NaiveDate,
    pub temperature: DeliveredSeries,
    pub rainfall: DeliveredSeries,
    pub plant: Option<PlantBloom>,
}

/// Outputs of one forecast run.
///
/// The aggregate is kept even when the trend cannot be fitted so callers can
/// still show the tables.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub source: DataSource,
    pub aggregate: BloomAggregate,
    pub forecast: Result<BloomForecast, RegressionError>,
}

/// Build every dashboard series for one request.
pub fn build_dashboard(config: &PipelineConfig, policy: &FallbackPolicy, request: &DashboardRequest) -> Dashboard {
    info!(
        date = %request.date,
        city = request.city.as_deref().unwrap_or("-"),
        plant = request.plant.as_deref().unwrap_or("-"),
        "building dashboard"
    );

    let temperature = policy.resolve(SeriesKind::Temperature, load_temperature_series(config));
    let rainfall = policy.resolve(SeriesKind::Rainfall, load_rainfall_series(config));

    let plant = request
        .plant
        .as_deref()
        .and_then(plant_profile)
        .map(|profile| PlantBloom {
            profile,
            series: policy.resolve(SeriesKind::Bloom, load_bloom_series(config)),
        });

    Dashboard {
        date: request.date,
        temperature,
        rainfall,
        plant,
    }
}

/// Temperature: wide table -> labeled row -> 12 points.
pub fn load_temperature_series(config: &PipelineConfig) -> Result<Vec<TimePoint>, SeriesUnavailable> {
    let source = DataSource::resolve(&config.temperature_source, &config.data_dir);
    let text = source.read_text()?;
    let grid = parse_grid(&text);
    let series = extract_temperature_series(&grid, &config.temperature_label);
    if series.is_empty() {
        return Err(SeriesUnavailable::NoUsableData(format!(
            "no '{}' row with a month header in {source}",
            config.temperature_label
        )));
    }
    Ok(series)
}

/// Rainfall: indicator table -> canonical samples -> calendar-month means.
pub fn load_rainfall_series(config: &PipelineConfig) -> Result<Vec<TimePoint>, SeriesUnavailable> {
    let source = DataSource::resolve(&config.rainfall_source, &config.data_dir);
    let text = source.read_text()?;
    let table = parse_records(&text);
    let normalized = normalize_indicators(&table);
    for issue in &normalized.issues {
        debug!(line = issue.line, message = %issue.message, "indicator row issue");
    }

    let buckets = MonthlyBuckets::from_samples(&normalized.samples, &config.rainfall_measure);
    debug!(
        rows = normalized.samples.len(),
        used = buckets.used(),
        measure = %config.rainfall_measure,
        "rainfall samples bucketed"
    );
    if buckets.used() == 0 {
        return Err(SeriesUnavailable::NoUsableData(format!(
            "no usable {} rows in {source}",
            config.rainfall_measure
        )));
    }
    Ok(buckets.averages())
}

/// Satellite table -> two-stage bloom aggregate.
pub fn load_bloom_aggregate(config: &PipelineConfig) -> Result<(DataSource, BloomAggregate), SourceError> {
    let source = DataSource::resolve(&config.satellite_source, &config.data_dir);
    let text = source.read_text()?;
    let table = parse_records(&text);
    for column in [&config.date_column, &config.band_column] {
        if !table.has_column(column) {
            warn!(column = %column, headers = ?table.headers(), source = %source, "satellite column not found");
        }
    }
    let samples = bloom_samples_from_records(&table, &config.date_column, &config.band_column);
    let aggregate = aggregate_bloom(&samples);
    debug!(
        rows = table.len(),
        samples = samples.len(),
        groups = aggregate.by_year_month.len(),
        "bloom samples aggregated"
    );
    Ok((source, aggregate))
}

/// Monthly bloom-intensity histogram as a named series.
pub fn load_bloom_series(config: &PipelineConfig) -> Result<Vec<TimePoint>, SeriesUnavailable> {
    let (source, aggregate) = load_bloom_aggregate(config)?;
    if aggregate.by_year_month.is_empty() {
        return Err(SeriesUnavailable::NoUsableData(format!(
            "no usable '{}' observations in {source}",
            config.band_column
        )));
    }
    Ok(aggregate.monthly_series())
}

/// Aggregate the satellite table and forecast `target`.
///
/// Source failures are errors; an infeasible regression is reported inside the
/// returned run.
pub fn run_forecast(config: &PipelineConfig, target: YearMonth) -> Result<ForecastRun, AppError> {
    let (source, aggregate) = load_bloom_aggregate(config)?;

    let forecast = forecast_bloom(&aggregate.by_year_month, target);
    match &forecast {
        Ok(f) => info!(month = %target, predicted = f.predicted_intensity, n = f.n_points, "bloom forecast"),
        Err(e) => info!(month = %target, reason = %e, "bloom forecast infeasible"),
    }

    Ok(ForecastRun {
        source,
        aggregate,
        forecast,
    })
}
