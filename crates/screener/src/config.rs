//! Service configuration

use anyhow::{bail, Result};
use screener_lib::dataset::CorpusConfig;
use screener_lib::predictor::{ForestConfig, TrainingConfig};
use serde::Deserialize;
use std::path::PathBuf;

/// Service configuration, read from `PHQ9_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ScreenerConfig {
    /// HTTP listen port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// CSV survey corpus; synthetic data is used when it cannot be read
    #[serde(default = "default_corpus_path")]
    pub corpus_path: PathBuf,

    /// Rows to generate for the synthetic fallback corpus
    #[serde(default = "default_synthetic_samples")]
    pub synthetic_samples: usize,

    /// Seed for synthetic data, the split and the forest
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Fraction of the corpus held out for evaluation
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,

    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    /// Name attached to every structured log record
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_api_port() -> u16 {
    5001
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("phq9_survey.csv")
}

fn default_synthetic_samples() -> usize {
    1000
}

fn default_seed() -> u64 {
    42
}

fn default_test_ratio() -> f64 {
    0.2
}

fn default_n_estimators() -> usize {
    200
}

fn default_service_name() -> String {
    "phq9-screener".to_string()
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            corpus_path: default_corpus_path(),
            synthetic_samples: default_synthetic_samples(),
            seed: default_seed(),
            test_ratio: default_test_ratio(),
            n_estimators: default_n_estimators(),
            service_name: default_service_name(),
        }
    }
}

impl ScreenerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("PHQ9").try_parsing(true))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            bail!("PHQ9_TEST_RATIO must be between 0 and 1, got {}", self.test_ratio);
        }
        if self.n_estimators == 0 {
            bail!("PHQ9_N_ESTIMATORS must be at least 1");
        }
        if self.synthetic_samples == 0 {
            bail!("PHQ9_SYNTHETIC_SAMPLES must be at least 1");
        }
        Ok(())
    }

    pub fn corpus(&self) -> CorpusConfig {
        CorpusConfig {
            csv_path: Some(self.corpus_path.clone()),
            synthetic_samples: self.synthetic_samples,
            seed: self.seed,
        }
    }

    pub fn training(&self) -> TrainingConfig {
        TrainingConfig {
            test_ratio: self.test_ratio,
            split_seed: self.seed,
            forest: ForestConfig {
                n_estimators: self.n_estimators,
                seed: self.seed,
                ..ForestConfig::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScreenerConfig::default();
        assert_eq!(config.api_port, 5001);
        assert_eq!(config.corpus_path, PathBuf::from("phq9_survey.csv"));
        assert_eq!(config.n_estimators, 200);
        assert!(config.validate().is_ok());

        let training = config.training();
        assert_eq!(training.test_ratio, 0.2);
        assert_eq!(training.forest.n_estimators, 200);
        assert_eq!(training.forest.seed, 42);
        assert_eq!(config.corpus().synthetic_samples, 1000);
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let config: ScreenerConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.api_port, 5001);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config: ScreenerConfig = config::Config::builder()
            .set_override("api_port", 6000)
            .unwrap()
            .set_override("n_estimators", 50)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.api_port, 6000);
        assert_eq!(config.n_estimators, 50);
        assert_eq!(config.training().forest.n_estimators, 50);
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let config = ScreenerConfig {
            test_ratio: 1.5,
            ..ScreenerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
