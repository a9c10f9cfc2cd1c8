//! Training corpus acquisition and splitting
//!
//! The corpus comes from a CSV file of survey records when one is available,
//! otherwise from a seeded synthetic generator. Acquisition never fails: any
//! problem with the file falls back to synthetic data.

mod loader;
mod split;
mod synthetic;

pub use loader::load_csv;
pub use split::{stratified_split, Split};
pub use synthetic::generate_synthetic;

use crate::models::{SeverityLabel, TrainingExample};
use crate::observability::StructuredLogger;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Where the training corpus came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusSource {
    Csv,
    Synthetic,
}

impl CorpusSource {
    pub fn as_str(self) -> &'static str {
        match self {
            CorpusSource::Csv => "csv",
            CorpusSource::Synthetic => "synthetic",
        }
    }
}

/// Labeled training corpus
#[derive(Debug, Clone)]
pub struct Corpus {
    pub examples: Vec<TrainingExample>,
    pub source: CorpusSource,
    /// Rows dropped while loading (CSV only)
    pub skipped_rows: usize,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Number of examples per label, indexed by [`SeverityLabel::index`]
    pub fn class_counts(&self) -> [usize; SeverityLabel::COUNT] {
        let mut counts = [0usize; SeverityLabel::COUNT];
        for example in &self.examples {
            counts[example.label.index()] += 1;
        }
        counts
    }
}

/// Settings for corpus acquisition
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    /// Path to a CSV file with columns q1..q9
    pub csv_path: Option<PathBuf>,
    /// Rows to generate when falling back to synthetic data
    pub synthetic_samples: usize,
    /// Seed for the synthetic generator
    pub seed: u64,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            csv_path: Some("phq9_survey.csv".into()),
            synthetic_samples: 1000,
            seed: 42,
        }
    }
}

/// Load the CSV corpus if possible, otherwise generate a synthetic one
pub fn acquire(config: &CorpusConfig, logger: &StructuredLogger) -> Corpus {
    if let Some(path) = &config.csv_path {
        match load_csv(path) {
            Ok(corpus) => {
                debug!(path = %path.display(), "Loaded survey corpus");
                return corpus;
            }
            Err(e) => logger.log_corpus_fallback(
                &path.display().to_string(),
                &e.to_string(),
                config.synthetic_samples,
            ),
        }
    }

    generate_synthetic(config.synthetic_samples, config.seed)
}
