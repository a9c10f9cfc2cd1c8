//! Response bodies for health, model-info and prediction
//!
//! Health and model-info are built once from the trained model, so both
//! always report the same accuracy.

use crate::models::{PredictionResult, SeverityLabel, FEATURE_NAMES, MAX_SCORE};
use crate::predictor::{TrainedModel, MODEL_NAME, MODEL_TYPE};
use crate::scoring::{crisis_alert, recommendations};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of the health endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub model: String,
    pub accuracy: f64,
}

impl HealthReport {
    pub fn from_model(model: &TrainedModel) -> Self {
        Self {
            status: "healthy".to_string(),
            model: MODEL_NAME.to_string(),
            accuracy: model.accuracy(),
        }
    }
}

/// Body of the model-info endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub features: Vec<String>,
    /// Labels in ascending severity
    pub classes: Vec<SeverityLabel>,
    pub accuracy: f64,
    pub training_samples: usize,
    pub test_samples: usize,
    pub n_estimators: usize,
    pub seed: u64,
    pub corpus_source: String,
    pub fingerprint: String,
}

impl ModelInfo {
    pub fn from_model(model: &TrainedModel) -> Self {
        let meta = model.metadata();
        Self {
            model_type: MODEL_TYPE.to_string(),
            features: FEATURE_NAMES.iter().map(|f| f.to_string()).collect(),
            classes: SeverityLabel::ALL.to_vec(),
            accuracy: meta.accuracy,
            training_samples: meta.training_samples,
            test_samples: meta.test_samples,
            n_estimators: meta.n_estimators,
            seed: meta.seed,
            corpus_source: meta.corpus_source.as_str().to_string(),
            fingerprint: meta.fingerprint.clone(),
        }
    }
}

/// Body of a successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub severity: SeverityLabel,
    pub confidence: f64,
    pub raw_score: u8,
    pub max_score: u8,
    /// Validated answers keyed q1..q9
    pub responses: BTreeMap<String, u8>,
    pub rule_severity: SeverityLabel,
    pub agrees_with_rule: bool,
    /// Guidance for the threshold band, not the model label
    pub recommendations: Vec<String>,
    pub crisis_alert: bool,
}

impl From<&PredictionResult> for PredictResponse {
    fn from(result: &PredictionResult) -> Self {
        Self {
            severity: result.severity,
            confidence: result.confidence,
            raw_score: result.total_score.value(),
            max_score: MAX_SCORE,
            responses: result
                .response
                .named()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            rule_severity: result.rule_severity,
            agrees_with_rule: result.agrees_with_rule(),
            recommendations: recommendations(result.rule_severity)
                .iter()
                .map(|r| r.to_string())
                .collect(),
            crisis_alert: crisis_alert(result.total_score),
        }
    }
}

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
