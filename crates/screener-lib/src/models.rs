//! Core data models for the PHQ-9 screener

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of questionnaire items
pub const NUM_ITEMS: usize = 9;

/// Highest allowed answer for a single item
pub const MAX_ITEM_VALUE: u8 = 3;

/// Highest possible total score (9 items x 3)
pub const MAX_SCORE: u8 = 27;

/// Request field names, in item order
pub const FEATURE_NAMES: [&str; NUM_ITEMS] = ["q1", "q2", "q3", "q4", "q5", "q6", "q7", "q8", "q9"];

/// Ordinal severity band derived from a total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityLabel {
    #[serde(rename = "Minimal")]
    Minimal,
    #[serde(rename = "Mild")]
    Mild,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Moderately Severe")]
    ModeratelySevere,
    #[serde(rename = "Severe")]
    Severe,
}

impl SeverityLabel {
    /// All labels in ascending severity
    pub const ALL: [SeverityLabel; 5] = [
        SeverityLabel::Minimal,
        SeverityLabel::Mild,
        SeverityLabel::Moderate,
        SeverityLabel::ModeratelySevere,
        SeverityLabel::Severe,
    ];

    /// Number of classes the model distinguishes
    pub const COUNT: usize = 5;

    /// Position of this label in [`SeverityLabel::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeverityLabel::Minimal => "Minimal",
            SeverityLabel::Mild => "Mild",
            SeverityLabel::Moderate => "Moderate",
            SeverityLabel::ModeratelySevere => "Moderately Severe",
            SeverityLabel::Severe => "Severe",
        }
    }
}

impl fmt::Display for SeverityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated questionnaire response: 9 answers, each in [0, 3]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurveyResponse {
    answers: [u8; NUM_ITEMS],
}

impl SurveyResponse {
    /// Returns `None` if any answer exceeds [`MAX_ITEM_VALUE`].
    pub fn new(answers: [u8; NUM_ITEMS]) -> Option<Self> {
        if answers.iter().all(|a| *a <= MAX_ITEM_VALUE) {
            Some(Self { answers })
        } else {
            None
        }
    }

    pub(crate) fn from_checked(answers: [u8; NUM_ITEMS]) -> Self {
        debug_assert!(answers.iter().all(|a| *a <= MAX_ITEM_VALUE));
        Self { answers }
    }

    pub fn answers(&self) -> &[u8; NUM_ITEMS] {
        &self.answers
    }

    /// Answers as model features (no missing values)
    pub fn features(&self) -> [Option<f64>; NUM_ITEMS] {
        self.answers.map(|a| Some(f64::from(a)))
    }

    /// Answers keyed by field name, in item order
    pub fn named(&self) -> Vec<(&'static str, u8)> {
        FEATURE_NAMES.iter().copied().zip(self.answers).collect()
    }
}

/// Total score in [0, 27]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TotalScore(u8);

impl TotalScore {
    pub(crate) fn new_unchecked(value: u8) -> Self {
        debug_assert!(value <= MAX_SCORE);
        Self(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for TotalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Training row: features (possibly with gaps) plus the derived label
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub features: [Option<f64>; NUM_ITEMS],
    pub label: SeverityLabel,
}

/// Output of a single prediction
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub severity: SeverityLabel,
    pub confidence: f64,
    pub probabilities: [f64; SeverityLabel::COUNT],
    pub total_score: TotalScore,
    pub rule_severity: SeverityLabel,
    pub response: SurveyResponse,
}

impl PredictionResult {
    /// True when the model and the threshold table give the same band
    pub fn agrees_with_rule(&self) -> bool {
        self.severity == self.rule_severity
    }
}
