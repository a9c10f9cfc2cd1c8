//! Error types for validation, inference, corpus loading and training

use crate::models::SeverityLabel;
use thiserror::Error;

/// Caller-supplied input violates the questionnaire domain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid response for question {position}: {value}. Must be 0-3.")]
    InvalidResponse { position: usize, value: String },

    #[error("Request body must be a JSON object with fields q1..q9")]
    NotAnObject,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

impl ValidationError {
    /// 1-indexed question position, if the error concerns a single item
    pub fn position(&self) -> Option<usize> {
        match self {
            ValidationError::InvalidResponse { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// Failure while serving a prediction
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("internal inference failure: {0}")]
    Internal(String),
}

impl PredictError {
    pub fn is_client_fault(&self) -> bool {
        matches!(self, PredictError::Validation(_))
    }
}

/// The real corpus could not be used
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse corpus: {0}")]
    Csv(#[from] csv::Error),

    #[error("corpus is missing column {0}")]
    MissingColumn(String),

    #[error("corpus has no usable rows ({skipped} skipped)")]
    NoUsableRows { skipped: usize },
}

/// Training could not produce a model; fatal at startup
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    #[error("training corpus is empty")]
    EmptyCorpus,

    #[error("training corpus contains a single class ({0}); at least two are required")]
    SingleClass(SeverityLabel),

    #[error("training subset is empty after the split")]
    EmptyTrainingSubset,

    #[error("evaluation subset is empty; corpus too small to measure accuracy")]
    EmptyEvaluationSubset,

    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_position_and_value() {
        let err = ValidationError::InvalidResponse {
            position: 4,
            value: "\"x\"".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid response for question 4: \"x\". Must be 0-3.");
        assert_eq!(err.position(), Some(4));
        assert_eq!(ValidationError::NotAnObject.position(), None);
    }

    #[test]
    fn test_predict_error_fault_classification() {
        let client: PredictError = ValidationError::NotAnObject.into();
        assert!(client.is_client_fault());
        assert!(!PredictError::Internal("bad".into()).is_client_fault());
    }
}
