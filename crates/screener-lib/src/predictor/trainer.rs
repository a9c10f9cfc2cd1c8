//! Startup training of the severity model
//!
//! Split the corpus, fit imputer → scaler → forest on the training subset,
//! score the evaluation subset. The result is an immutable [`TrainedModel`].

use super::forest::{ForestConfig, RandomForest};
use super::preprocess::{FeatureRow, MeanImputer, RawRow, StandardScaler};
use crate::dataset::{stratified_split, Corpus, CorpusSource};
use crate::error::TrainingError;
use crate::models::{SeverityLabel, TrainingExample};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Human-readable model identifier reported by the health endpoint
pub const MODEL_NAME: &str = "PHQ-9 Random Forest";

/// Model family reported by the model-info endpoint
pub const MODEL_TYPE: &str = "Random Forest Classifier";

/// Training parameters
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Fraction of the corpus held out for evaluation
    pub test_ratio: f64,
    /// Seed for the stratified split
    pub split_seed: u64,
    pub forest: ForestConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            split_seed: 42,
            forest: ForestConfig::default(),
        }
    }
}

impl TrainingConfig {
    fn validate(&self) -> Result<(), TrainingError> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(TrainingError::InvalidConfig(format!(
                "test_ratio must be in (0, 1), got {}",
                self.test_ratio
            )));
        }
        if self.forest.n_estimators == 0 {
            return Err(TrainingError::InvalidConfig("n_estimators must be at least 1".into()));
        }
        Ok(())
    }
}

/// Facts about the fitted model, fixed at training time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelMetadata {
    /// Held-out accuracy on the evaluation subset
    pub accuracy: f64,
    pub training_samples: usize,
    pub test_samples: usize,
    pub n_estimators: usize,
    pub seed: u64,
    pub corpus_source: CorpusSource,
    /// Training-subset examples per label, in label order
    pub class_counts: [usize; SeverityLabel::COUNT],
    /// SHA-256 over the fitted parameters
    pub fingerprint: String,
    pub trained_at: DateTime<Utc>,
}

/// Fitted imputer + scaler + forest; read-only once built
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub(crate) imputer: MeanImputer,
    pub(crate) scaler: StandardScaler,
    pub(crate) forest: RandomForest,
    metadata: ModelMetadata,
}

impl TrainedModel {
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn accuracy(&self) -> f64 {
        self.metadata.accuracy
    }

    pub fn fingerprint(&self) -> &str {
        &self.metadata.fingerprint
    }

    /// Run a raw row through imputation and scaling
    pub(crate) fn preprocess(&self, row: &RawRow) -> FeatureRow {
        self.scaler.transform(&self.imputer.transform(row))
    }
}

/// Builds a [`TrainedModel`] from a corpus
pub struct ModelTrainer {
    config: TrainingConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Fit the pipeline and measure held-out accuracy
    pub fn train(&self, corpus: &Corpus) -> Result<TrainedModel, TrainingError> {
        self.config.validate()?;
        let start = Instant::now();

        if corpus.is_empty() {
            return Err(TrainingError::EmptyCorpus);
        }
        let counts = corpus.class_counts();
        let present: Vec<SeverityLabel> = SeverityLabel::ALL
            .into_iter()
            .filter(|l| counts[l.index()] > 0)
            .collect();
        if present.len() < 2 {
            return Err(TrainingError::SingleClass(present[0]));
        }
        for label in SeverityLabel::ALL {
            if counts[label.index()] == 1 {
                warn!(label = %label, "Only one example for label, keeping it in the training subset");
            }
        }

        let split = stratified_split(&corpus.examples, self.config.test_ratio, self.config.split_seed);
        if split.train.is_empty() {
            return Err(TrainingError::EmptyTrainingSubset);
        }
        if split.test.is_empty() {
            return Err(TrainingError::EmptyEvaluationSubset);
        }
        debug!(train = split.train.len(), test = split.test.len(), "Corpus split");

        let raw_train: Vec<RawRow> = split.train.iter().map(|e| e.features).collect();
        let missing = raw_train.iter().flatten().filter(|v| v.is_none()).count();
        if missing > 0 {
            debug!(missing, "Imputing missing answers with training means");
        }

        let imputer = MeanImputer::fit(&raw_train);
        let imputed: Vec<FeatureRow> = raw_train.iter().map(|r| imputer.transform(r)).collect();
        let scaler = StandardScaler::fit(&imputed);
        let x: Vec<FeatureRow> = imputed.iter().map(|r| scaler.transform(r)).collect();
        let y: Vec<usize> = split.train.iter().map(|e| e.label.index()).collect();

        let forest = RandomForest::fit(&x, &y, &self.config.forest);

        let mut model = TrainedModel {
            imputer,
            scaler,
            forest,
            metadata: ModelMetadata {
                accuracy: 0.0,
                training_samples: split.train.len(),
                test_samples: split.test.len(),
                n_estimators: self.config.forest.n_estimators,
                seed: self.config.forest.seed,
                corpus_source: corpus.source,
                class_counts: label_counts(&split.train),
                fingerprint: String::new(),
                trained_at: Utc::now(),
            },
        };
        model.metadata.accuracy = evaluate(&model, &split.test);
        model.metadata.fingerprint = fingerprint(&model);

        info!(
            accuracy = model.metadata.accuracy,
            training_samples = model.metadata.training_samples,
            test_samples = model.metadata.test_samples,
            n_estimators = model.metadata.n_estimators,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Model trained"
        );

        Ok(model)
    }
}

/// Fraction of examples whose predicted label matches the derived label
pub fn evaluate(model: &TrainedModel, examples: &[TrainingExample]) -> f64 {
    if examples.is_empty() {
        return 0.0;
    }
    let correct = examples
        .iter()
        .filter(|e| model.forest.predict(&model.preprocess(&e.features)) == e.label.index())
        .count();
    correct as f64 / examples.len() as f64
}

fn label_counts(examples: &[TrainingExample]) -> [usize; SeverityLabel::COUNT] {
    let mut counts = [0usize; SeverityLabel::COUNT];
    for e in examples {
        counts[e.label.index()] += 1;
    }
    counts
}

fn fingerprint(model: &TrainedModel) -> String {
    let mut hasher = Sha256::new();
    model.imputer.digest(&mut hasher);
    model.scaler.digest(&mut hasher);
    model.forest.digest(&mut hasher);
    hex::encode(hasher.finalize())
}
