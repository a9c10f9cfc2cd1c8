//! Integration tests for the screener API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use phq9_screener::api::{create_router, AppState};
use screener_lib::{
    dataset::generate_synthetic,
    health::{components, HealthRegistry},
    observability::{ScreenerMetrics, StructuredLogger},
    predictor::{ForestConfig, ModelTrainer, Predictor, TrainedModel, TrainingConfig},
    PredictError, PredictionResult, SurveyResponse,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn train_model() -> TrainedModel {
    let config = TrainingConfig {
        forest: ForestConfig {
            n_estimators: 25,
            ..ForestConfig::default()
        },
        ..TrainingConfig::default()
    };
    ModelTrainer::new(config)
        .train(&generate_synthetic(500, 42))
        .unwrap()
}

async fn setup_test_app() -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.set_healthy(components::MODEL).await;

    let state = Arc::new(AppState::from_model(
        train_model(),
        health_registry,
        ScreenerMetrics::new(),
        StructuredLogger::new("phq9-screener-test"),
    ));
    let router = create_router(state.clone());

    (router, state)
}

/// Same reports as a real model, different predictor
fn app_with_predictor(predictor: Arc<dyn Predictor>) -> Router {
    let model = train_model();
    let state = AppState {
        predictor,
        ..AppState::from_model(
            model,
            HealthRegistry::new(),
            ScreenerMetrics::new(),
            StructuredLogger::new("phq9-screener-test"),
        )
    };
    create_router(Arc::new(state))
}

struct FailingPredictor;

impl Predictor for FailingPredictor {
    fn predict(&self, _response: &SurveyResponse) -> Result<PredictionResult, PredictError> {
        Err(PredictError::Internal("forest missing at path /models/rf.bin".into()))
    }
}

struct PanickingPredictor;

impl Predictor for PanickingPredictor {
    fn predict(&self, _response: &SurveyResponse) -> Result<PredictionResult, PredictError> {
        panic!("inference blew up")
    }
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_predict_returns_full_body() {
    let (app, _state) = setup_test_app().await;
    let request = json!({"q1": 1, "q2": 2, "q3": 1, "q4": 2, "q5": 1, "q6": 2, "q7": 1, "q8": 2, "q9": 1});

    let (status, body) = send(app, post_json("/predict", &request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["raw_score"], 13);
    assert_eq!(body["max_score"], 27);
    assert_eq!(body["rule_severity"], "Moderate");
    assert_eq!(body["responses"]["q2"], 2);
    assert_eq!(body["responses"].as_object().unwrap().len(), 9);

    let confidence = body["confidence"].as_f64().unwrap();
    assert!(confidence > 0.0 && confidence <= 1.0);
    let severity = body["severity"].as_str().unwrap();
    assert!(["Minimal", "Mild", "Moderate", "Moderately Severe", "Severe"].contains(&severity));
    assert_eq!(body["agrees_with_rule"], severity == "Moderate");
    assert_eq!(body["crisis_alert"], false);
    assert!(body["recommendations"][0].as_str().unwrap().contains("counselor"));
}

#[tokio::test]
async fn test_predict_flags_crisis_from_score() {
    let (app, _state) = setup_test_app().await;
    let request = json!({"q1": 2, "q2": 2, "q3": 2, "q4": 2, "q5": 2, "q6": 2, "q7": 1, "q8": 1, "q9": 1});

    let (status, body) = send(app, post_json("/predict", &request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["raw_score"], 15);
    assert_eq!(body["crisis_alert"], true);
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_predict_missing_fields_default_to_zero() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(app, post_json("/predict", &json!({"q3": 2}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["raw_score"], 2);
    assert_eq!(body["rule_severity"], "Minimal");
    assert_eq!(body["responses"]["q1"], 0);
    assert_eq!(body["responses"]["q3"], 2);
}

#[tokio::test]
async fn test_predict_accepts_integral_float() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(app, post_json("/predict", &json!({"q1": 2.0}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responses"]["q1"], 2);
}

#[tokio::test]
async fn test_predict_rejects_out_of_range_with_position() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(app, post_json("/predict", &json!({"q1": 1, "q4": 4}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("question 4"), "message was {message}");
    assert!(message.contains("Must be 0-3"));
}

#[tokio::test]
async fn test_predict_rejects_non_integer_values() {
    for bad in [json!("x"), json!(1.5), json!(-1), json!(true), json!(null), json!([1])] {
        let (app, _state) = setup_test_app().await;
        let (status, body) = send(app, post_json("/predict", &json!({ "q1": bad }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "value {bad} should be rejected");
        assert!(body["error"].as_str().unwrap().contains("question 1"));
    }
}

#[tokio::test]
async fn test_predict_rejects_malformed_json() {
    let (app, _state) = setup_test_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from("{\"q1\": 1,"))
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_predict_rejects_non_object_body() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(app, post_json("/predict", &json!([0, 1, 2]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("JSON object"));
}

#[tokio::test]
async fn test_predict_is_idempotent() {
    let (app, _state) = setup_test_app().await;
    let request = json!({"q1": 3, "q2": 0, "q3": 2, "q4": 1, "q5": 3, "q6": 0, "q7": 2, "q8": 1, "q9": 2});

    let (_, first) = send(app.clone(), post_json("/predict", &request)).await;
    let (_, second) = send(app, post_json("/predict", &request)).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_internal_failure_returns_generic_500() {
    let app = app_with_predictor(Arc::new(FailingPredictor));
    let before = ScreenerMetrics::new().internal_errors();

    let (status, body) = send(app, post_json("/predict", &json!({"q1": 1}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(ScreenerMetrics::new().internal_errors() > before);
    let message = body["error"].as_str().unwrap();
    assert_eq!(message, "Internal server error");
    assert!(!message.contains("/models"));
}

#[tokio::test]
async fn test_panicking_predictor_returns_500() {
    let app = app_with_predictor(Arc::new(PanickingPredictor));

    let (status, body) = send(app, post_json("/predict", &json!({"q1": 1}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_health_reports_model_and_accuracy() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "PHQ-9 Random Forest");
    let accuracy = body["accuracy"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
}

#[tokio::test]
async fn test_model_info_matches_health_accuracy() {
    let (app, _state) = setup_test_app().await;

    let (_, health) = send(app.clone(), get("/health")).await;
    let (status, info) = send(app, get("/model-info")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["accuracy"], health["accuracy"]);
    assert_eq!(info["model_type"], "Random Forest Classifier");
    assert_eq!(info["features"], json!(["q1", "q2", "q3", "q4", "q5", "q6", "q7", "q8", "q9"]));
    assert_eq!(
        info["classes"],
        json!(["Minimal", "Mild", "Moderate", "Moderately Severe", "Severe"])
    );
    assert_eq!(info["training_samples"], 400);
    assert_eq!(info["test_samples"], 100);
    assert_eq!(info["n_estimators"], 25);
    assert_eq!(info["corpus_source"], "synthetic");
}

#[tokio::test]
async fn test_readyz_returns_503_when_not_ready() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(app, get("/readyz")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ready"], false);
}

#[tokio::test]
async fn test_readyz_returns_ok_when_ready() {
    let (app, state) = setup_test_app().await;
    state.health_registry.set_ready(true).await;

    let (status, body) = send(app, get("/readyz")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_readyz_returns_503_when_ready_but_unhealthy() {
    let (app, state) = setup_test_app().await;
    state.health_registry.set_ready(true).await;
    state
        .health_registry
        .set_unhealthy(components::API, "Listener closed")
        .await;

    let (status, _) = send(app, get("/readyz")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let (app, state) = setup_test_app().await;
    state.metrics.set_model(train_model().metadata());

    let (status, _) = send(app.clone(), post_json("/predict", &json!({"q1": 1}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(app.clone(), post_json("/predict", &json!({"q1": 9}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("phq9_prediction_latency_seconds_bucket"));
    assert!(metrics_text.contains("phq9_predictions_total"));
    assert!(metrics_text.contains("phq9_validation_errors_total"));
    assert!(metrics_text.contains("phq9_model_accuracy"));
    assert!(metrics_text.contains("phq9_model_info"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _state) = setup_test_app().await;

    let (status, _) = send(app, get("/predict/batch")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
