//! Observability infrastructure for the screening service
//!
//! Provides:
//! - Prometheus metrics (prediction latency, predictions per label, error counts, model info)
//! - Structured JSON logging with tracing

use crate::dataset::CorpusSource;
use crate::models::{PredictionResult, SeverityLabel};
use crate::predictor::ModelMetadata;
use prometheus::{
    register_gauge, register_gauge_vec, register_histogram, register_int_counter,
    register_int_counter_vec, Gauge, GaugeVec, Histogram, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{debug, error, info, warn};

/// Histogram buckets for inference latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ScreenerMetricsInner> = OnceLock::new();

struct ScreenerMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounterVec,
    validation_errors_total: IntCounter,
    internal_errors_total: IntCounter,
    rule_disagreements_total: IntCounter,
    model_accuracy: Gauge,
    model_info: GaugeVec,
}

impl ScreenerMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "phq9_prediction_latency_seconds",
                "Time spent classifying a single questionnaire",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "phq9_predictions_total",
                "Predictions served, by model severity label",
                &["severity"]
            )
            .expect("Failed to register predictions_total"),

            validation_errors_total: register_int_counter!(
                "phq9_validation_errors_total",
                "Prediction requests rejected by input validation"
            )
            .expect("Failed to register validation_errors_total"),

            internal_errors_total: register_int_counter!(
                "phq9_internal_errors_total",
                "Prediction requests that failed inside the service"
            )
            .expect("Failed to register internal_errors_total"),

            rule_disagreements_total: register_int_counter!(
                "phq9_rule_disagreements_total",
                "Predictions whose model label differs from the threshold band"
            )
            .expect("Failed to register rule_disagreements_total"),

            model_accuracy: register_gauge!(
                "phq9_model_accuracy",
                "Held-out accuracy measured at training time"
            )
            .expect("Failed to register model_accuracy"),

            model_info: register_gauge_vec!(
                "phq9_model_info",
                "Information about the loaded model",
                &["fingerprint", "corpus_source", "n_estimators"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Screener metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ScreenerMetrics {
    _private: (),
}

impl Default for ScreenerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenerMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ScreenerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ScreenerMetricsInner {
        GLOBAL_METRICS.get_or_init(ScreenerMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    /// Count a served prediction and, if it differs from the threshold band, a disagreement
    pub fn record_prediction(&self, result: &PredictionResult) {
        self.inner()
            .predictions_total
            .with_label_values(&[result.severity.as_str()])
            .inc();
        if !result.agrees_with_rule() {
            self.inner().rule_disagreements_total.inc();
        }
    }

    pub fn inc_validation_errors(&self) {
        self.inner().validation_errors_total.inc();
    }

    pub fn inc_internal_errors(&self) {
        self.inner().internal_errors_total.inc();
    }

    /// Publish the facts of the loaded model
    pub fn set_model(&self, metadata: &ModelMetadata) {
        self.inner().model_accuracy.set(metadata.accuracy);
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[
                metadata.fingerprint.as_str(),
                metadata.corpus_source.as_str(),
                &metadata.n_estimators.to_string(),
            ])
            .set(1.0);
    }

    pub fn predictions_for(&self, label: SeverityLabel) -> u64 {
        self.inner()
            .predictions_total
            .with_label_values(&[label.as_str()])
            .get()
    }

    pub fn validation_errors(&self) -> u64 {
        self.inner().validation_errors_total.get()
    }

    pub fn internal_errors(&self) -> u64 {
        self.inner().internal_errors_total.get()
    }

    pub fn rule_disagreements(&self) -> u64 {
        self.inner().rule_disagreements_total.get()
    }
}

/// Structured logger for service events
///
/// Every record carries an `event` field and the service name so log
/// pipelines can filter on them.
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, port: u16) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            port = port,
            "PHQ-9 screening service started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "PHQ-9 screening service shutting down"
        );
    }

    /// Log the real corpus being unusable
    pub fn log_corpus_fallback(&self, path: &str, reason: &str, synthetic_samples: usize) {
        warn!(
            event = "corpus_fallback",
            service = %self.service,
            path = %path,
            reason = %reason,
            synthetic_samples = synthetic_samples,
            "Survey corpus unavailable, training on synthetic data"
        );
    }

    /// Log the corpus that training will use
    pub fn log_corpus_loaded(&self, source: CorpusSource, rows: usize, skipped: usize) {
        info!(
            event = "corpus_loaded",
            service = %self.service,
            source = source.as_str(),
            rows = rows,
            skipped_rows = skipped,
            "Training corpus ready"
        );
    }

    /// Log training completion
    pub fn log_training_complete(&self, metadata: &ModelMetadata) {
        info!(
            event = "training_complete",
            service = %self.service,
            accuracy = metadata.accuracy,
            training_samples = metadata.training_samples,
            test_samples = metadata.test_samples,
            n_estimators = metadata.n_estimators,
            corpus_source = metadata.corpus_source.as_str(),
            fingerprint = %metadata.fingerprint,
            "Severity model trained"
        );
    }

    /// Log a served prediction; disagreements with the threshold band log at warn
    pub fn log_prediction(&self, result: &PredictionResult) {
        if result.agrees_with_rule() {
            info!(
                event = "prediction",
                service = %self.service,
                severity = result.severity.as_str(),
                confidence = result.confidence,
                raw_score = result.total_score.value(),
                "Classified questionnaire"
            );
        } else {
            warn!(
                event = "rule_disagreement",
                service = %self.service,
                severity = result.severity.as_str(),
                rule_severity = result.rule_severity.as_str(),
                confidence = result.confidence,
                raw_score = result.total_score.value(),
                "Model label differs from threshold band"
            );
        }
    }

    /// Log a rejected request
    pub fn log_validation_rejected(&self, position: Option<usize>, reason: &str) {
        debug!(
            event = "validation_rejected",
            service = %self.service,
            position = ?position,
            reason = %reason,
            "Rejected prediction request"
        );
    }

    /// Log an internal failure; the detail stays in the log and is never returned to callers
    pub fn log_internal_error(&self, detail: &str) {
        error!(
            event = "internal_error",
            service = %self.service,
            detail = %detail,
            "Prediction failed"
        );
    }
}
