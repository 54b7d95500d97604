//! AWS Lambda handler for deposit revenue projections
//!
//! Accepts a package's terms as JSON and returns the chart-ready series,
//! the claimable-region annotation and a summary.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use chrono::NaiveDate;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};

use vault_projection::projection::{
    ChartSeries, ClaimAnnotation, Clock, DayCount, FixedClock, PrincipalSchedule, ProjectionConfig,
    ProjectionEngine, ProjectionError, ProjectionInput, ProjectionOutput, ProjectionSummary,
    SystemClock, DEFAULT_DATE_FORMAT,
};

/// Input configuration for the projection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    pub start_date: NaiveDate,
    pub amount: f64,
    pub interest_rate: f64,
    pub duration_in_days: u32,

    #[serde(default)]
    pub principal_delay_in_days: u32,

    #[serde(default)]
    pub day_count: DayCount,

    #[serde(default)]
    pub principal_schedule: PrincipalSchedule,

    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Collapse the daily series to every N-th day
    #[serde(default)]
    pub sample_every_days: Option<usize>,

    /// Override "today" for the elapsed marker
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

fn default_date_format() -> String { DEFAULT_DATE_FORMAT.to_string() }

/// Output from the projection
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    #[serde(flatten)]
    pub output: ProjectionOutput,
    pub series: Vec<ChartSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<ClaimAnnotation>,
    pub summary: ProjectionSummary,
    pub execution_time_ms: u64,
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::json!({ "error": message }).to_string();
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Text(body))?)
}

fn json_response(body: &ProjectionResponse) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

fn project_with<C: Clock>(
    config: ProjectionConfig,
    clock: C,
    input: &ProjectionInput,
) -> Result<ProjectionOutput, ProjectionError> {
    ProjectionEngine::with_clock(config, clock).project(input)
}

/// Chart payload plus figures taken from the full daily projection
#[derive(Debug)]
struct BuiltProjection {
    chart: ProjectionOutput,
    annotation: Option<ClaimAnnotation>,
    summary: ProjectionSummary,
}

fn build_output(request: &ProjectionRequest) -> Result<BuiltProjection, ProjectionError> {
    let config = ProjectionConfig {
        day_count: request.day_count,
        principal_schedule: request.principal_schedule,
        date_format: request.date_format.clone(),
    };
    let input = ProjectionInput::new(
        request.start_date,
        request.amount,
        request.interest_rate,
        request.duration_in_days,
        request.principal_delay_in_days,
    );

    let daily = match request.as_of {
        Some(today) => project_with(config, FixedClock(today), &input)?,
        None => project_with(config, SystemClock, &input)?,
    };

    // Sampling only thins the plotted points; day counts and claimable
    // amounts always come from the daily series.
    let annotation = daily.claim_annotation();
    let summary = daily.summary();
    let chart = match request.sample_every_days {
        Some(step) => daily.sample_every(step)?,
        None => daily,
    };

    Ok(BuiltProjection { chart, annotation, summary })
}

/// Lambda handler function
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)?);
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let request: ProjectionRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => return error_response(400, &format!("Invalid JSON: {}", e)),
    };

    let built = match build_output(&request) {
        Ok(built) => built,
        Err(e) => return error_response(400, &e.to_string()),
    };

    log::info!(
        "projected {} days from {} ({} chart points) in {:?}",
        built.summary.total_days,
        request.start_date,
        built.chart.len(),
        start.elapsed()
    );

    let response = ProjectionResponse {
        series: built.chart.chart_series(),
        annotation: built.annotation,
        summary: built.summary,
        output: built.chart,
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    json_response(&response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
