//! Formatted terminal output: series tables, bloom aggregates, forecasts.
//!
//! We keep formatting code in one place so:
//! - the series/math code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::ForecastRun;
use crate::domain::{DeliveredSeries, SeriesOrigin, YearMonth};
use crate::identify::PlantInfo;
use crate::series::{MonthIntensity, YearMonthIntensity, infeasible_reason};

/// Width of the longest histogram bar, in characters.
const BAR_WIDTH: usize = 40;

/// Format delivered series side by side, one row per point.
pub fn format_series_summary(series: &[&DeliveredSeries]) -> String {
    let mut out = String::new();

    out.push_str("=== bloom - dashboard series ===\n");
    for s in series {
        out.push_str(&format!("{:<16} {}\n", s.kind.label(), origin_label(&s.origin)));
    }
    out.push('\n');

    let mut header = format!("{:<6}", "month");
    let mut rule = format!("{:-<6}", "");
    for s in series {
        header.push_str(&format!(" {:>16}", s.kind.label()));
        rule.push_str(&format!(" {:-<16}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    let rows = series.iter().map(|s| s.points.len()).max().unwrap_or(0);
    for idx in 0..rows {
        let key = series
            .iter()
            .find_map(|s| s.points.get(idx))
            .map(|p| p.key.as_str())
            .unwrap_or("");
        let mut line = format!("{key:<6}");
        for s in series {
            match s.points.get(idx) {
                Some(p) => line.push_str(&format!(" {:>16.2}", p.value)),
                None => line.push_str(&format!(" {:>16}", "")),
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Format the bloom aggregates plus the prediction (or why there is none).
pub fn format_forecast(run: &ForecastRun, target: YearMonth) -> String {
    let mut out = String::new();

    out.push_str("=== bloom - intensity forecast ===\n");
    out.push_str(&format!("Source: {}\n", run.source));
    out.push_str(&format!("Year-month groups: {}\n\n", run.aggregate.by_year_month.len()));

    out.push_str("Intensity by year-month:\n");
    out.push_str(&format_year_month_table(&run.aggregate.by_year_month));
    out.push('\n');

    out.push_str("Average intensity by month:\n");
    out.push_str(&format_month_histogram(&run.aggregate.by_month));
    out.push('\n');

    match &run.forecast {
        Ok(f) => {
            out.push_str(&format!(
                "Predicted intensity for {} ({} {}): {:.4}\n",
                target,
                target.month_name(),
                target.year,
                f.predicted_intensity
            ));
            out.push_str(&format!(
                "- trend: intercept={:.6} slope={:.6}/year over n={}\n",
                f.intercept, f.slope, f.n_points
            ));
        }
        Err(e) => {
            out.push_str(&infeasible_reason(*e));
            out.push('\n');
        }
    }

    out
}

/// Format one identification result.
pub fn format_plant(file_name: &str, plant: &PlantInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!("File:    {file_name}\n"));
    out.push_str(&format!("Plant:   {}\n", plant.name));
    out.push_str(&format!("Growth:  {}\n", plant.growth));
    out.push_str(&format!("Water:   {}\n", plant.water));
    out.push_str(&format!("Light:   {}\n", plant.light));
    out.push_str(&format!("Habitat: {}\n", plant.habitat));
    out
}

fn format_year_month_table(rows: &[YearMonthIntensity]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<8} {:>12}\n", "period", "intensity"));
    out.push_str(&format!("{:-<8} {:-<12}\n", "", ""));
    if rows.is_empty() {
        out.push_str("(none)\n");
    }
    for r in rows {
        let period = YearMonth::new(r.year, r.month)
            .map(|ym| ym.to_string())
            .unwrap_or_else(|| format!("{}-{}", r.year, r.month));
        out.push_str(&format!("{period:<8} {:>12.4}\n", r.intensity));
    }
    out
}

fn format_month_histogram(rows: &[MonthIntensity]) -> String {
    let max = rows.iter().map(|m| m.avg_intensity).fold(0.0_f64, f64::max);

    let mut out = String::new();
    for m in rows {
        let name = crate::domain::month_name(m.month).unwrap_or("?");
        let bar = bar_len(m.avg_intensity, max);
        let line = format!("{name:<4} {:>12.4} {}", m.avg_intensity, "#".repeat(bar));
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn bar_len(value: f64, max: f64) -> usize {
    if !max.is_finite() || max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return 0;
    }
    ((value / max) * BAR_WIDTH as f64).round() as usize
}

fn origin_label(origin: &SeriesOrigin) -> String {
    match origin {
        SeriesOrigin::Computed => "computed".to_string(),
        SeriesOrigin::Fallback(reason) => format!("default ({reason})"),
    }
}
