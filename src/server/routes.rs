//! API route handlers

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument, warn};

use super::AppState;
use crate::app::pipeline::{DEFAULT_VEGETATION, Dashboard, DashboardRequest, NO_PREDICTION, build_dashboard, run_forecast};
use crate::domain::{TimePoint, YearMonth};
use crate::identify::{PlantInfo, identify_by_file_name};
use crate::series::{MonthIntensity, YearMonthIntensity, infeasible_reason};

/// Headline figures shown on the dashboard cards.
const HEADLINE_TEMPERATURE: f64 = 25.0;
const HEADLINE_RAINFALL: f64 = 10.0;
const HEADLINE_NDVI: f64 = 0.45;

const DASHBOARD_FAILED: &str = "Failed to load bloom data";
const FORECAST_FAILED: &str = "Failed to load or process bloom data.";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct BloomDataQuery {
    pub date: Option<String>,
    pub city: Option<String>,
    pub plant: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TemperaturePoint {
    pub month: String,
    pub value: f64,
}

/// Rainfall point. The month name is sent as `year`, which is what the
/// dashboard chart reads.
#[derive(Debug, Serialize)]
pub struct RainfallPoint {
    pub year: String,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct BloomIntensityPoint {
    pub month: String,
    pub intensity: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BloomDataResponse {
    pub date: String,
    pub temperature: f64,
    pub rainfall: f64,
    pub ndvi: f64,
    pub temperature_series: Vec<TemperaturePoint>,
    pub rainfall_series: Vec<RainfallPoint>,
    pub monthly_bloom_intensity_series: Vec<BloomIntensityPoint>,
    pub dominant_vegetation: String,
    pub bloom_prediction: String,
}

impl From<Dashboard> for BloomDataResponse {
    fn from(d: Dashboard) -> Self {
        let (monthly_bloom_intensity_series, dominant_vegetation, bloom_prediction) = match d.plant {
            Some(plant) => (
                plant
                    .series
                    .points
                    .into_iter()
                    .map(|TimePoint { key, value }| BloomIntensityPoint {
                        month: key,
                        intensity: value,
                    })
                    .collect(),
                plant.profile.dominant_vegetation,
                plant.profile.bloom_outlook,
            ),
            None => (Vec::new(), DEFAULT_VEGETATION, NO_PREDICTION),
        };

        Self {
            date: d.date.format("%Y-%m-%d").to_string(),
            temperature: HEADLINE_TEMPERATURE,
            rainfall: HEADLINE_RAINFALL,
            ndvi: HEADLINE_NDVI,
            temperature_series: d
                .temperature
                .points
                .into_iter()
                .map(|TimePoint { key, value }| TemperaturePoint { month: key, value })
                .collect(),
            rainfall_series: d
                .rainfall
                .points
                .into_iter()
                .map(|TimePoint { key, value }| RainfallPoint { year: key, value })
                .collect(),
            monthly_bloom_intensity_series,
            dominant_vegetation: dominant_vegetation.to_string(),
            bloom_prediction: bloom_prediction.to_string(),
        }
    }
}

/// Requested calendar date; today when absent or blank.
fn parse_request_date(raw: Option<&str>) -> Option<NaiveDate> {
    match raw.map(str::trim) {
        None | Some("") => Some(Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
    }
}

/// `GET /api/bloom-data`
#[instrument(skip(state))]
pub async fn bloom_data(State(state): State<AppState>, Query(query): Query<BloomDataQuery>) -> Response {
    let Some(date) = parse_request_date(query.date.as_deref()) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid date");
    };

    let request = DashboardRequest {
        date,
        city: query.city,
        plant: query.plant,
    };
    let config = state.config.clone();
    let policy = state.policy.clone();

    match tokio::task::spawn_blocking(move || build_dashboard(&config, &policy, &request)).await {
        Ok(dashboard) => Json(BloomDataResponse::from(dashboard)).into_response(),
        Err(e) => {
            error!(error = %e, "dashboard task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, DASHBOARD_FAILED)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    pub by_year_month: Vec<YearMonthIntensity>,
    pub by_month: Vec<MonthIntensity>,
    pub target: String,
    pub predicted_intensity: f64,
    pub slope: f64,
    pub intercept: f64,
}

/// Target year-month from the query, with missing parts taken from `default`.
fn parse_target(query: &ForecastQuery, default: YearMonth) -> Option<YearMonth> {
    let year = match query.year.as_deref().map(str::trim) {
        None | Some("") => default.year,
        Some(s) => s.parse().ok()?,
    };
    let month = match query.month.as_deref().map(str::trim) {
        None | Some("") => default.month,
        Some(s) => s.parse().ok()?,
    };
    YearMonth::new(year, month)
}

/// `GET /api/bloom-forecast`
#[instrument(skip(state))]
pub async fn bloom_forecast(State(state): State<AppState>, Query(query): Query<ForecastQuery>) -> Response {
    let Some(target) = parse_target(&query, state.config.forecast_target) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid year or month");
    };

    let config = state.config.clone();
    let run = match tokio::task::spawn_blocking(move || run_forecast(&config, target)).await {
        Ok(Ok(run)) => run,
        Ok(Err(e)) => {
            warn!(error = %e, "bloom forecast source unavailable");
            return error_response(StatusCode::SERVICE_UNAVAILABLE, FORECAST_FAILED);
        }
        Err(e) => {
            error!(error = %e, "forecast task failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, FORECAST_FAILED);
        }
    };

    match run.forecast {
        Ok(forecast) => Json(ForecastResponse {
            by_year_month: run.aggregate.by_year_month,
            by_month: run.aggregate.by_month,
            target: target.to_string(),
            predicted_intensity: forecast.predicted_intensity,
            slope: forecast.slope,
            intercept: forecast.intercept,
        })
        .into_response(),
        Err(e) => error_response(StatusCode::UNPROCESSABLE_ENTITY, infeasible_reason(e)),
    }
}

#[derive(Debug, Serialize)]
pub struct IdentifyResponse {
    pub success: bool,
    pub plant: PlantInfo,
}

/// `GET /api/identify`
pub async fn identify_status() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Plant API is working" }))
}

/// `POST /api/identify` with a multipart `image` field.
#[instrument(skip(multipart))]
pub async fn identify(multipart: Result<Multipart, MultipartRejection>) -> Response {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(e) => {
            warn!(error = %e, "identify request is not multipart");
            return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
        }
    };

    let mut file_name = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("image") => {
                // A part without a filename is still an upload.
                file_name = Some(field.file_name().unwrap_or_default().to_string());
                break;
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "multipart read failed");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
            }
        }
    }

    let Some(file_name) = file_name else {
        return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
    };

    Json(IdentifyResponse {
        success: true,
        plant: identify_by_file_name(&file_name),
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, header};
    use serde_json::Value;
    use tower::ServiceExt; // for oneshot

    use super::*;
    use crate::domain::PipelineConfig;
    use crate::series::FallbackPolicy;
    use crate::server::router;

    const RAINFALL: &str = "\
CLIMATE_INDIC,TIME_PERIOD,OBS_VALUE
RAIN_TOTAL,2019-01,10
RAIN_TOTAL,2020-01,20
";

    const SATELLITE: &str = "\
Date,HLSS30_020_B08
2024-01-05,10
2025-01-05,20
";

    fn app(dir: &Path) -> Router {
        let config = PipelineConfig {
            data_dir: dir.to_path_buf(),
            ..PipelineConfig::default()
        };
        router(AppState::new(config, FallbackPolicy::default()))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        json_response(response).await
    }

    async fn json_response(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn multipart_request(field: &str, file_name: &str) -> Request<Body> {
        let boundary = "XBLOOMBOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: image/jpeg\r\n\r\nbytes\r\n--{boundary}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/identify")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_version() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(app(dir.path()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn invalid_date_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(app(dir.path()), "/api/bloom-data?date=2025-13-40").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid date");
    }

    #[tokio::test]
    async fn dashboard_mixes_computed_and_default_series() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Rainfall.csv"), RAINFALL).unwrap();

        let (status, body) = get(
            app(dir.path()),
            "/api/bloom-data?date=2025-03-01&city=abu-dhabi&plant=tribulus",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["date"], "2025-03-01");
        assert_eq!(body["ndvi"], 0.45);

        // Temperature source missing: default series.
        assert_eq!(body["temperatureSeries"][0]["month"], "Jan");
        assert_eq!(body["temperatureSeries"][0]["value"], 20.3);

        // Rainfall computed from the table.
        assert_eq!(body["rainfallSeries"][0]["year"], "Jan");
        assert_eq!(body["rainfallSeries"][0]["value"], 15.0);
        assert_eq!(body["rainfallSeries"][1]["value"], 0.0);

        // Satellite source missing: default bloom curve.
        assert_eq!(body["monthlyBloomIntensitySeries"][3]["intensity"], 95.0);
        assert_eq!(body["dominantVegetation"], "Tribulus Omanense");
    }

    #[tokio::test]
    async fn unknown_plant_gets_generic_description() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(app(dir.path()), "/api/bloom-data?plant=cactus").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dominantVegetation"], "Desert Vegetation");
        assert_eq!(body["bloomPrediction"], "No prediction available");
        assert_eq!(body["monthlyBloomIntensitySeries"].as_array().unwrap().len(), 0);
        assert_eq!(body["temperatureSeries"].as_array().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn forecast_extrapolates_satellite_trend() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("liwa-HLSS30-020-results.csv"), SATELLITE).unwrap();

        let (status, body) = get(app(dir.path()), "/api/bloom-forecast").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["target"], "2026-01");
        assert!((body["predictedIntensity"].as_f64().unwrap() - 30.0).abs() < 1e-9);
        assert_eq!(body["byYearMonth"].as_array().unwrap().len(), 2);
        assert_eq!(body["byMonth"][0]["avgIntensity"], 15.0);
    }

    #[tokio::test]
    async fn forecast_error_statuses() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = get(app(dir.path()), "/api/bloom-forecast").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Failed to load or process bloom data.");

        fs::write(dir.path().join("liwa-HLSS30-020-results.csv"), "Date,HLSS30_020_B08\n").unwrap();
        let (status, body) = get(app(dir.path()), "/api/bloom-forecast").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "No valid bloom data to predict.");

        let (status, _) = get(app(dir.path()), "/api/bloom-forecast?month=13").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn identify_by_uploaded_file_name() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = get(app(dir.path()), "/api/identify").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Plant API is working");

        let response = app(dir.path())
            .oneshot(multipart_request("image", "IMG_ghaf_01.jpg"))
            .await
            .unwrap();
        let (status, body) = json_response(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["plant"]["name"], "Ghaf Tree");

        let response = app(dir.path())
            .oneshot(multipart_request("document", "ghaf.jpg"))
            .await
            .unwrap();
        let (status, body) = json_response(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn non_multipart_upload_gets_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/api/identify")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let response = app(dir.path()).oneshot(request).await.unwrap();
        let (status, body) = json_response(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file uploaded");
    }

    #[test]
    fn blank_date_means_today() {
        let before = Local::now().date_naive();
        let parsed = parse_request_date(Some("  ")).unwrap();
        let after = Local::now().date_naive();
        assert!(parsed == before || parsed == after);
        assert_eq!(parse_request_date(None).map(|d| d >= before), Some(true));
        assert_eq!(
            parse_request_date(Some("2024-02-29")),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(parse_request_date(Some("yesterday")), None);
    }
}
