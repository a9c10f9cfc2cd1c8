//! Rule-based scoring: input validation, total score, severity bands

mod severity;
mod validation;

pub use severity::{
    band_range, classify, classify_raw, crisis_alert, recommendations, score_response,
    total_score, CRISIS_THRESHOLD, SEVERITY_BANDS,
};
pub use validation::{check_item, validate, validate_fields};
