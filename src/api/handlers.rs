use crate::api::views::{render, BulkTemplate, IndexTemplate};
use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{FeatureRecord, MachineType, PredictionResult, RawFeatureInput, RiskLevel};
use crate::pipeline::{export_csv, EXPORT_FILENAME};
use crate::translation;
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Empty single-record form
pub async fn index() -> Result<Html<String>> {
    render(&IndexTemplate::empty())
}

/// Empty bulk upload page
pub async fn bulk_page() -> Result<Html<String>> {
    render(&BulkTemplate::empty())
}

/// Score the single-record form and re-render it with the result
pub async fn predict(
    State(state): State<AppState>,
    Form(inputs): Form<RawFeatureInput>,
) -> Result<Html<String>> {
    // A form with blank fields never reaches the model, loaded or not
    if inputs.has_blank_field() {
        return render(&IndexTemplate::blank(inputs));
    }

    let service = state.service()?;

    let page = match service.predict_form(&inputs) {
        Ok(Some(result)) => {
            metrics::record_prediction("form", result.risk_level.is_high());
            IndexTemplate::with_result(inputs, &result)
        }
        Ok(None) => IndexTemplate::blank(inputs),
        Err(AppError::Validation(reason)) => {
            warn!(reason = %reason, "Form rejected");
            metrics::record_error("form", "VALIDATION_ERROR");
            IndexTemplate::invalid_numbers(inputs)
        }
        Err(e) => return Err(e),
    };

    render(&page)
}

fn plain_text(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message.into(),
    )
        .into_response()
}

/// Score an uploaded CSV and render the table.
///
/// Upload problems answer with a plain-text message rather than a page.
pub async fn predict_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response> {
    let service = state.service()?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?;

        upload = Some((file_name, bytes));
        break;
    }

    let Some((file_name, bytes)) = upload else {
        return Ok(plain_text(StatusCode::BAD_REQUEST, translation::NO_FILE_UPLOADED));
    };
    if file_name.trim().is_empty() {
        return Ok(plain_text(StatusCode::BAD_REQUEST, translation::EMPTY_FILENAME));
    }

    info!(file_name = %file_name, bytes = bytes.len(), "Scoring uploaded table");

    let outcome = tokio::task::spawn_blocking(move || service.predict_table(&bytes))
        .await
        .map_err(|e| AppError::Internal(format!("Bulk prediction task failed: {}", e)))?;

    match outcome {
        Ok(result) => {
            let page = BulkTemplate::with_result(&result)?;
            Ok(render(&page)?.into_response())
        }
        Err(e) => {
            let status = if e.is_client_error() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            Ok(plain_text(status, translation::file_error(&e.to_string())))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub table_data: String,
}

/// Serve the serialized bulk table as a CSV attachment
pub async fn download_results(Form(form): Form<DownloadForm>) -> Result<Response> {
    let csv = export_csv(&form.table_data)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        csv,
    )
        .into_response())
}

/// Liveness endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_state(&state))
}

/// Readiness endpoint, 503 while the model artifacts are missing
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let status = if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(HealthResponse::from_state(&state)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_loaded: bool,
}

impl HealthResponse {
    fn from_state(state: &AppState) -> Self {
        Self {
            status: if state.is_ready() { "healthy" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.uptime_seconds(),
            model_loaded: state.is_ready(),
        }
    }
}

/// Score one record from JSON
pub async fn predict_json(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictionResponse>> {
    let service = state.service()?;

    let result = service.predict_record(request.into_record())?;
    metrics::record_prediction("api", result.risk_level.is_high());

    Ok(Json(PredictionResponse::new(
        result,
        service.artifacts().classifier().metadata().name.clone(),
    )))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "type", default)]
    pub machine_type: MachineType,
    pub air_temp: f64,
    pub proc_temp: f64,
    pub speed: f64,
    pub torque: f64,
    pub tool_wear: f64,
}

impl PredictRequest {
    pub fn into_record(self) -> FeatureRecord {
        FeatureRecord {
            machine_type: self.machine_type,
            air_temperature: self.air_temp,
            process_temperature: self.proc_temp,
            rotational_speed: self.speed,
            torque: self.torque,
            tool_wear: self.tool_wear,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub label: String,
    pub localized_label: String,
    pub risk_level: RiskLevel,
    pub prediction_text: String,
    pub fail_type_text: String,
    /// Features after clipping
    pub features: FeatureRecord,
    pub model: String,
}

impl PredictionResponse {
    fn new(result: PredictionResult, model: String) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            label: result.label,
            localized_label: result.localized_label,
            risk_level: result.risk_level,
            prediction_text: result.prediction_text,
            fail_type_text: result.fail_type_text,
            features: result.record,
            model,
        }
    }
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    let metrics = crate::metrics::gather_metrics();
    (StatusCode::OK, metrics)
}
