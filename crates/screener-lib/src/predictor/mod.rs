//! Severity model: preprocessing, random forest, training and inference

mod forest;
mod inference;
mod preprocess;
mod trainer;

pub use forest::{argmax, ClassDistribution, DecisionTree, ForestConfig, RandomForest};
pub use preprocess::{FeatureRow, MeanImputer, RawRow, StandardScaler};
pub use trainer::{
    evaluate, ModelMetadata, ModelTrainer, TrainedModel, TrainingConfig, MODEL_NAME, MODEL_TYPE,
};

use crate::error::PredictError;
use crate::models::{PredictionResult, SurveyResponse};

/// Trait for prediction implementations
pub trait Predictor: Send + Sync {
    /// Classify a validated response
    fn predict(&self, response: &SurveyResponse) -> Result<PredictionResult, PredictError>;
}
