//! HTTP API: prediction, health, model info, readiness and Prometheus metrics

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use screener_lib::{
    health::{components, HealthRegistry},
    observability::{ScreenerMetrics, StructuredLogger},
    predictor::{Predictor, TrainedModel},
    report::{ErrorBody, HealthReport, ModelInfo, PredictResponse},
    scoring::validate,
    PredictError, ValidationError,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Message returned for any failure that is not the caller's fault
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Shared application state; immutable after startup apart from health tracking
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn Predictor>,
    pub health: HealthReport,
    pub model_info: ModelInfo,
    pub health_registry: HealthRegistry,
    pub metrics: ScreenerMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    /// State serving a freshly trained model
    pub fn from_model(
        model: TrainedModel,
        health_registry: HealthRegistry,
        metrics: ScreenerMetrics,
        logger: StructuredLogger,
    ) -> Self {
        let health = HealthReport::from_model(&model);
        let model_info = ModelInfo::from_model(&model);
        Self {
            predictor: Arc::new(model),
            health,
            model_info,
            health_registry,
            metrics,
            logger,
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

fn reject(state: &AppState, err: ValidationError) -> Response {
    state.metrics.inc_validation_errors();
    let message = err.to_string();
    state.logger.log_validation_rejected(err.position(), &message);
    error_response(StatusCode::BAD_REQUEST, message)
}

fn internal(state: &AppState, detail: &str) -> Response {
    state.metrics.inc_internal_errors();
    state.logger.log_internal_error(detail);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
}

/// Classify a questionnaire: 200 with the prediction, 400 on invalid input, 500 otherwise
async fn predict(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return reject(&state, ValidationError::MalformedBody(rejection.body_text()));
        }
    };

    let response = match validate(&body) {
        Ok(response) => response,
        Err(err) => return reject(&state, err),
    };

    let start = Instant::now();
    let predictor = Arc::clone(&state.predictor);
    let outcome = tokio::task::spawn_blocking(move || predictor.predict(&response)).await;
    state
        .metrics
        .observe_prediction_latency(start.elapsed().as_secs_f64());

    match outcome {
        Ok(Ok(result)) => {
            state.metrics.record_prediction(&result);
            state.logger.log_prediction(&result);
            (StatusCode::OK, Json(PredictResponse::from(&result))).into_response()
        }
        Ok(Err(PredictError::Validation(err))) => reject(&state, err),
        Ok(Err(err)) => internal(&state, &err.to_string()),
        Err(join_err) => internal(&state, &format!("inference task failed: {join_err}")),
    }
}

/// Liveness and headline accuracy
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.health.clone())
}

async fn model_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.model_info.clone())
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .route("/model-info", get(model_info))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Bind the listener, mark the service ready and serve until the task is dropped
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(Arc::clone(&state));

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    state.health_registry.set_healthy(components::API).await;
    state.health_registry.set_ready(true).await;

    axum::serve(listener, app).await?;

    Ok(())
}
