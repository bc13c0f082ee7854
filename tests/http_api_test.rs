/// Integration tests for the HTTP surface
///
/// Drives the axum router directly with `tower::ServiceExt::oneshot`.
mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::{
    app, app_with, csv_table, degraded_app, form_encode, multipart_body, multipart_content_type,
    parse_prometheus_output, service, RuleClassifier, HEADER,
};
use predictive_maintenance::{pipeline::write_csv, translation};
use std::sync::Arc;
use tower::ServiceExt;

async fn send(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, pairs: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form_encode(pairs)))
        .unwrap()
}

fn post_upload(field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/predict_file")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(multipart_body(field, file_name, content)))
        .unwrap()
}

fn sample_form(torque: &str) -> Vec<(&'static str, String)> {
    vec![
        ("type", "1".to_string()),
        ("air_temp", "300".to_string()),
        ("proc_temp", "310".to_string()),
        ("speed", "1500".to_string()),
        ("torque", torque.to_string()),
        ("tool_wear", "100".to_string()),
    ]
}

fn borrowed<'a>(pairs: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    pairs.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

#[tokio::test]
async fn test_index_and_bulk_pages_render() {
    let (status, _, body) = send(app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("name=\"air_temp\""));

    let (status, _, body) = send(app(), get("/bulk")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/predict_file"));
}

#[tokio::test]
async fn test_predict_healthy_machine() {
    let pairs = sample_form("40");
    let (status, _, body) = send(app(), post_form("/predict", &borrowed(&pairs))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(translation::STATUS_STABLE));
    assert!(body.contains("risk-Low"));
    assert!(body.contains("value=\"1500\""));
}

#[tokio::test]
async fn test_predict_failure_shows_diagnosis() {
    let pairs = sample_form("75");
    let (status, _, body) = send(app(), post_form("/predict", &borrowed(&pairs))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(translation::STATUS_FAULT_DETECTED));
    assert!(body.contains(translation::translate("Overstrain Failure")));
    assert!(body.contains("risk-High"));
}

#[tokio::test]
async fn test_predict_blank_field_skips_model() {
    let classifier = Arc::new(RuleClassifier::new());
    let pairs = sample_form("");
    let (status, _, body) = send(
        app_with(classifier.clone()),
        post_form("/predict", &borrowed(&pairs)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains(translation::STATUS_STABLE));
    assert!(!body.contains(translation::STATUS_FAULT_DETECTED));
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_predict_whitespace_field_is_invalid_number() {
    let classifier = Arc::new(RuleClassifier::new());
    let pairs = sample_form("   ");
    let (status, _, body) = send(
        app_with(classifier.clone()),
        post_form("/predict", &borrowed(&pairs)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(translation::INVALID_NUMBERS));
    assert!(body.contains("risk-High"));
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_predict_non_numeric_field() {
    let pairs = sample_form("strong");
    let (status, _, body) = send(app(), post_form("/predict", &borrowed(&pairs))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(translation::INVALID_NUMBERS));
    assert!(body.contains("risk-High"));
    assert!(body.contains("value=\"strong\""));
}

#[tokio::test]
async fn test_predict_file_renders_table() {
    let upload = csv_table(&["L,298.1,308.6,1551,42.8,0", "H,298.2,308.7,1408,76.3,3"]);
    let (status, _, body) = send(app(), post_upload("file", "machines.csv", &upload)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<table"));
    assert!(body.contains("Torque [Nm]"));
    assert!(body.contains(translation::translate("No Failure")));
    assert!(body.contains(translation::translate("Overstrain Failure")));
    assert!(body.contains("name=\"table_data\""));
}

#[tokio::test]
async fn test_predict_file_keeps_uploaded_columns() {
    let upload = format!("UDI,Product ID,{}\n1,M14860,M,298.1,308.6,1551,42.8,0\n", HEADER);
    let (status, _, body) = send(
        app(),
        post_upload("file", "machines.csv", upload.as_bytes()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<th>Product ID</th>"));
    assert!(body.contains("<td>M14860</td>"));
}

#[tokio::test]
async fn test_predict_file_missing_column_is_plain_text() {
    let upload = b"Type,Air temperature [K],Process temperature [K],Rotational speed [rpm],Tool wear [min]\nL,300,310,1500,100\n";
    let (status, headers, body) = send(app(), post_upload("file", "machines.csv", upload)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(body, translation::file_error("missing columns: Torque [Nm]"));
}

#[tokio::test]
async fn test_predict_file_without_file_part() {
    let upload = csv_table(&["L,300,310,1500,40,100"]);
    let (status, _, body) = send(app(), post_upload("attachment", "machines.csv", &upload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, translation::NO_FILE_UPLOADED);
}

#[tokio::test]
async fn test_predict_file_with_empty_filename() {
    let upload = csv_table(&["L,300,310,1500,40,100"]);
    let (status, _, body) = send(app(), post_upload("file", "", &upload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, translation::EMPTY_FILENAME);
}

#[tokio::test]
async fn test_download_results_returns_csv_attachment() {
    let result = service()
        .predict_table(&csv_table(&[
            "L,298.1,308.6,1551,42.8,0",
            "M,298.2,308.7,1408,76.3,3",
        ]))
        .unwrap();
    let payload = result.to_json().unwrap();

    let (status, headers, body) = send(
        app(),
        post_form("/download_results", &[("table_data", payload.as_str())]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("maintenance_results.csv"));
    assert_eq!(body.as_bytes(), write_csv(&result.table).unwrap().as_slice());
}

#[tokio::test]
async fn test_download_results_rejects_malformed_payload() {
    let (status, _, body) = send(
        app(),
        post_form("/download_results", &[("table_data", "{not json")]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"]["code"], "SERIALIZATION_ERROR");
}

#[tokio::test]
async fn test_health_endpoints() {
    let (status, _, body) = send(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model_loaded"], true);

    let (status, _, _) = send(app(), get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_degraded_mode() {
    let (status, _, _) = send(degraded_app(), get("/health/live")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(degraded_app(), get("/health/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let pairs = sample_form("40");
    let (status, _, body) = send(degraded_app(), post_form("/predict", &borrowed(&pairs))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"]["code"], "MODEL_UNAVAILABLE");

    // Blank fields render the empty page without needing the model
    let blank = sample_form("");
    let (status, _, body) = send(degraded_app(), post_form("/predict", &borrowed(&blank))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("name=\"air_temp\""));
    assert!(!body.contains(translation::STATUS_STABLE));

    // Pages and export do not need the model
    let (status, _, _) = send(degraded_app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);

    let payload = service()
        .predict_table(&csv_table(&["L,298.1,308.6,1551,42.8,0"]))
        .unwrap()
        .to_json()
        .unwrap();
    let (status, _, body) = send(
        degraded_app(),
        post_form("/download_results", &[("table_data", payload.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("Type,"));
}

#[tokio::test]
async fn test_json_predict() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({
                "type": "H",
                "air_temp": 300.0,
                "proc_temp": 310.0,
                "speed": 1500.0,
                "torque": 500.0,
                "tool_wear": 100.0
            })
            .to_string(),
        ))
        .unwrap();

    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["label"], "Overstrain Failure");
    assert_eq!(json["risk_level"], "High");
    assert_eq!(json["features"]["Torque [Nm]"], 150.0);
    assert_eq!(json["features"]["Type"], "H");
    assert!(json["request_id"].is_string());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    predictive_maintenance::metrics::init_metrics().unwrap();

    let pairs = sample_form("40");
    send(app(), post_form("/predict", &borrowed(&pairs))).await;

    let (status, _, body) = send(app(), get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);

    let metrics = parse_prometheus_output(&body);
    assert!(metrics.contains_key("predictive_maintenance_predictions_total"));
    assert!(metrics.contains_key("predictive_maintenance_http_requests_total"));
}
