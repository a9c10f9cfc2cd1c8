//! Inference against the trained pipeline
//!
//! The model label is a statistical approximation of the threshold table and
//! may disagree with it. The rule-based band is computed next to the
//! prediction so callers can see and count the disagreement.

use super::forest::{argmax, ClassDistribution};
use super::trainer::TrainedModel;
use super::Predictor;
use crate::error::PredictError;
use crate::models::{PredictionResult, SeverityLabel, SurveyResponse};
use crate::scoring::score_response;
use std::time::Instant;
use tracing::{debug, warn};

/// Inference slower than this is logged
const SLOW_INFERENCE_MS: u128 = 5;

/// Tolerance for the probability vector summing to one
const PROBABILITY_TOLERANCE: f64 = 1e-6;

impl TrainedModel {
    /// Class probabilities for a validated response
    pub fn predict_proba(&self, response: &SurveyResponse) -> Result<ClassDistribution, PredictError> {
        let row = self.preprocess(&response.features());
        if row.iter().any(|v| !v.is_finite()) {
            return Err(PredictError::Internal("non-finite feature after scaling".into()));
        }

        let proba = self.forest.predict_proba(&row);
        let sum: f64 = proba.iter().sum();
        if proba.iter().any(|p| !p.is_finite() || *p < 0.0) || (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(PredictError::Internal(format!(
                "malformed class distribution (sum {sum})"
            )));
        }

        Ok(proba)
    }
}

impl Predictor for TrainedModel {
    fn predict(&self, response: &SurveyResponse) -> Result<PredictionResult, PredictError> {
        let start = Instant::now();

        let probabilities = self.predict_proba(response)?;
        let (class, confidence) = argmax(&probabilities);
        let severity = SeverityLabel::from_index(class)
            .ok_or_else(|| PredictError::Internal(format!("class index {class} out of range")))?;
        let (total_score, rule_severity) = score_response(response);

        let elapsed = start.elapsed();
        if elapsed.as_millis() > SLOW_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis() as u64, "Inference exceeded {}ms", SLOW_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros() as u64, "Inference completed");
        }

        Ok(PredictionResult {
            severity,
            confidence,
            probabilities,
            total_score,
            rule_severity,
            response: *response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{generate_synthetic, Corpus, CorpusSource};
    use crate::models::{TrainingExample, NUM_ITEMS};
    use crate::predictor::{ForestConfig, ModelTrainer, TrainingConfig};
    use crate::scoring::classify_raw;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn config(n_estimators: usize) -> TrainingConfig {
        TrainingConfig {
            forest: ForestConfig {
                n_estimators,
                ..ForestConfig::default()
            },
            ..TrainingConfig::default()
        }
    }

    /// Rows cluster around a per-row base level, so every band (including
    /// the all-zero and all-three extremes) is well covered
    fn covering_corpus(n: usize, seed: u64) -> Corpus {
        let mut rng = StdRng::seed_from_u64(seed);
        let examples = (0..n)
            .map(|_| {
                let base: i32 = rng.gen_range(0..=3);
                let answers: [u8; NUM_ITEMS] =
                    std::array::from_fn(|_| (base + rng.gen_range(-1..=1)).clamp(0, 3) as u8);
                let total: u8 = answers.iter().sum();
                TrainingExample {
                    features: answers.map(|a| Some(f64::from(a))),
                    label: classify_raw(total),
                }
            })
            .collect();
        Corpus {
            examples,
            source: CorpusSource::Synthetic,
            skipped_rows: 0,
        }
    }

    #[test]
    fn test_confidence_is_max_probability() {
        let model = ModelTrainer::new(config(40)).train(&generate_synthetic(500, 42)).unwrap();
        let response = SurveyResponse::new([1, 2, 1, 2, 1, 2, 1, 2, 1]).unwrap();
        let result = model.predict(&response).unwrap();

        let max = result.probabilities.iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(result.confidence, max);
        assert!(result.confidence > 0.0 && result.confidence <= 1.0);
        assert_eq!(result.probabilities[result.severity.index()], result.confidence);
        assert_eq!(result.total_score.value(), 13);
        assert_eq!(result.rule_severity, SeverityLabel::Moderate);
        assert_eq!(result.response, response);
    }

    #[test]
    fn test_repeated_predictions_identical() {
        let model = ModelTrainer::new(config(40)).train(&generate_synthetic(500, 42)).unwrap();
        let response = SurveyResponse::new([3, 0, 2, 1, 3, 0, 2, 1, 2]).unwrap();
        let a = model.predict(&response).unwrap();
        let b = model.predict(&response).unwrap();
        assert_eq!(a.severity, b.severity);
        assert_eq!(a.confidence, b.confidence);
    }

    #[test]
    fn test_extremes_agree_with_rule_when_covered() {
        let model = ModelTrainer::new(config(100)).train(&covering_corpus(1000, 42)).unwrap();

        let zeros = model.predict(&SurveyResponse::new([0; NUM_ITEMS]).unwrap()).unwrap();
        assert_eq!(zeros.total_score.value(), 0);
        assert_eq!(zeros.rule_severity, SeverityLabel::Minimal);
        assert_eq!(zeros.severity, SeverityLabel::Minimal);
        assert!(zeros.agrees_with_rule());
        assert!(zeros.confidence > 0.8, "confidence was {}", zeros.confidence);

        let threes = model.predict(&SurveyResponse::new([3; NUM_ITEMS]).unwrap()).unwrap();
        assert_eq!(threes.total_score.value(), 27);
        assert_eq!(threes.rule_severity, SeverityLabel::Severe);
        assert_eq!(threes.severity, SeverityLabel::Severe);
        assert!(threes.confidence > 0.8, "confidence was {}", threes.confidence);
    }

    #[test]
    fn test_label_always_known() {
        let model = ModelTrainer::new(config(20)).train(&generate_synthetic(300, 3)).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let answers: [u8; NUM_ITEMS] = std::array::from_fn(|_| rng.gen_range(0..=3));
            let result = model.predict(&SurveyResponse::new(answers).unwrap()).unwrap();
            assert!(SeverityLabel::ALL.contains(&result.severity));
            let sum: f64 = result.probabilities.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}
