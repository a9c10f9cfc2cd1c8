//! Total score and the fixed severity threshold table
//!
//! [`classify`] is the only place a score is turned into a band. Training
//! labels, offline CLI scoring and the per-prediction rule comparison all go
//! through it.

use crate::models::{SeverityLabel, SurveyResponse, TotalScore, MAX_SCORE};

/// Inclusive score range for each band, in ascending order
pub const SEVERITY_BANDS: [(u8, u8, SeverityLabel); 5] = [
    (0, 4, SeverityLabel::Minimal),
    (5, 9, SeverityLabel::Mild),
    (10, 14, SeverityLabel::Moderate),
    (15, 19, SeverityLabel::ModeratelySevere),
    (20, MAX_SCORE, SeverityLabel::Severe),
];

/// Score from which a response is flagged for crisis follow-up
pub const CRISIS_THRESHOLD: u8 = 15;

/// Follow-up guidance for a threshold band
pub fn recommendations(label: SeverityLabel) -> &'static [&'static str] {
    match label {
        SeverityLabel::Minimal => {
            &["Continue with healthy lifestyle habits and self-care practices."]
        }
        SeverityLabel::Mild => &[
            "Consider lifestyle changes and stress management techniques.",
            "Monitor your mood and consider speaking with a counselor if symptoms persist.",
        ],
        SeverityLabel::Moderate => &[
            "Scheduling an appointment with a counselor is strongly recommended.",
            "Consider implementing daily mood tracking and self-care routines.",
        ],
        SeverityLabel::ModeratelySevere | SeverityLabel::Severe => &[
            "Please schedule an appointment with a counselor as soon as possible.",
            "Consider contacting your healthcare provider or a mental health crisis line.",
        ],
    }
}

/// Whether a total score calls for immediate follow-up
pub fn crisis_alert(score: TotalScore) -> bool {
    score.value() >= CRISIS_THRESHOLD
}

/// Sum the answers of a validated response
pub fn total_score(response: &SurveyResponse) -> TotalScore {
    let sum: u8 = response.answers().iter().sum();
    TotalScore::new_unchecked(sum)
}

/// Map a total score to its severity band
pub fn classify(score: TotalScore) -> SeverityLabel {
    classify_raw(score.value())
}

/// Same as [`classify`] for a raw sum; values above 27 saturate to Severe
pub fn classify_raw(score: u8) -> SeverityLabel {
    match score {
        0..=4 => SeverityLabel::Minimal,
        5..=9 => SeverityLabel::Mild,
        10..=14 => SeverityLabel::Moderate,
        15..=19 => SeverityLabel::ModeratelySevere,
        _ => SeverityLabel::Severe,
    }
}

/// Inclusive score range covered by a band
pub fn band_range(label: SeverityLabel) -> (u8, u8) {
    let (lo, hi, _) = SEVERITY_BANDS[label.index()];
    (lo, hi)
}

/// Score and classify a response with the threshold table
pub fn score_response(response: &SurveyResponse) -> (TotalScore, SeverityLabel) {
    let score = total_score(response);
    (score, classify(score))
}
