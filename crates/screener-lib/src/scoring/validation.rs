//! Request validation
//!
//! Turns an untrusted JSON mapping into a [`SurveyResponse`]. Absent fields
//! default to 0. Present fields must be JSON numbers with an integral value in
//! [0, 3]; `2` and `2.0` are the same answer, `1.5` is not an answer.

use crate::error::ValidationError;
use crate::models::{SurveyResponse, FEATURE_NAMES, MAX_ITEM_VALUE, NUM_ITEMS};
use serde_json::{Map, Value};

/// Validate a request body
pub fn validate(input: &Value) -> Result<SurveyResponse, ValidationError> {
    match input {
        Value::Object(fields) => validate_fields(fields),
        _ => Err(ValidationError::NotAnObject),
    }
}

/// Validate the `q1`..`q9` fields of a JSON object, stopping at the first bad item
pub fn validate_fields(fields: &Map<String, Value>) -> Result<SurveyResponse, ValidationError> {
    let mut answers = [0u8; NUM_ITEMS];

    for (idx, name) in FEATURE_NAMES.iter().enumerate() {
        if let Some(value) = fields.get(*name) {
            answers[idx] = check_item(idx + 1, value)?;
        }
    }

    Ok(SurveyResponse::from_checked(answers))
}

/// Check a single answer; `position` is 1-indexed
pub fn check_item(position: usize, value: &Value) -> Result<u8, ValidationError> {
    let invalid = || ValidationError::InvalidResponse {
        position,
        value: value.to_string(),
    };

    let number = match value {
        Value::Number(n) => n.as_f64().ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };

    if !number.is_finite() || number.fract() != 0.0 {
        return Err(invalid());
    }
    if number < 0.0 || number > f64::from(MAX_ITEM_VALUE) {
        return Err(invalid());
    }

    Ok(number as u8)
}
