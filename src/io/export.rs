//! Export computed series and forecasts to CSV/JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::ForecastRun;
use crate::domain::{DeliveredSeries, YearMonth};
use crate::error::{AppError, EXIT_INPUT};
use crate::series::{MonthIntensity, YearMonthIntensity, infeasible_reason};

/// JSON document written by `bloom forecast --export-json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastExport<'a> {
    pub source: String,
    pub target: String,
    pub by_year_month: &'a [YearMonthIntensity],
    pub by_month: &'a [MonthIntensity],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_intensity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intercept: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> ForecastExport<'a> {
    pub fn new(run: &'a ForecastRun, target: YearMonth) -> Self {
        let (predicted_intensity, slope, intercept, error) = match &run.forecast {
            Ok(f) => (Some(f.predicted_intensity), Some(f.slope), Some(f.intercept), None),
            Err(e) => (None, None, None, Some(infeasible_reason(*e))),
        };
        Self {
            source: run.source.to_string(),
            target: target.to_string(),
            by_year_month: &run.aggregate.by_year_month,
            by_month: &run.aggregate.by_month,
            predicted_intensity,
            slope,
            intercept,
            error,
        }
    }
}

/// Write series as long-format CSV: `series,month,value,origin`.
pub fn write_series_csv(path: &Path, series: &[&DeliveredSeries]) -> Result<(), AppError> {
    let file = create(path)?;
    let mut wtr = csv::Writer::from_writer(BufWriter::new(file));
    let write_err = |e: csv::Error| AppError::new(EXIT_INPUT, format!("Failed to write export CSV '{}': {e}", path.display()));

    wtr.write_record(["series", "month", "value", "origin"]).map_err(write_err)?;
    for s in series {
        let origin = if s.origin.is_fallback() { "default" } else { "computed" };
        for p in &s.points {
            let value = format!("{:.4}", p.value);
            wtr.write_record([s.kind.label(), p.key.as_str(), value.as_str(), origin])
                .map_err(write_err)?;
        }
    }

    wtr.flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to flush export CSV '{}': {e}", path.display())))
}

/// Write series (with their origin) as pretty JSON.
pub fn write_series_json(path: &Path, series: &[&DeliveredSeries]) -> Result<(), AppError> {
    write_json(path, &series)
}

/// Write the forecast aggregates and prediction as pretty JSON.
pub fn write_forecast_json(path: &Path, run: &ForecastRun, target: YearMonth) -> Result<(), AppError> {
    write_json(path, &ForecastExport::new(run, target))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export JSON '{}': {e}", path.display())))
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create '{}': {e}", path.display())))
}
