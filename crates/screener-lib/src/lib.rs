//! Core library for PHQ-9 depression severity screening
//!
//! This crate provides:
//! - Questionnaire validation and rule-based severity scoring
//! - Training corpus loading, synthetic fallback and stratified splitting
//! - A random forest severity model trained at startup
//! - Report bodies, health tracking and observability

pub mod dataset;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod report;
pub mod scoring;

pub use error::{CorpusError, PredictError, TrainingError, ValidationError};
pub use health::{ComponentHealth, ComponentReport, ComponentStatus, HealthRegistry, ReadinessResponse};
pub use models::*;
pub use observability::{ScreenerMetrics, StructuredLogger};
pub use predictor::{Predictor, TrainedModel};
pub use report::{ErrorBody, HealthReport, ModelInfo, PredictResponse};
