//! Offline scoring with the threshold table; no service needed

use anyhow::{anyhow, Result};
use screener_lib::scoring::{
    band_range, crisis_alert, recommendations, score_response, SEVERITY_BANDS,
};
use screener_lib::{SurveyResponse, MAX_SCORE, NUM_ITEMS};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{
    color_severity, print_info, print_record, print_rows, print_warning, FieldRow, OutputFormat,
};

#[derive(Serialize)]
struct ScoreOutput {
    raw_score: u8,
    max_score: u8,
    severity: screener_lib::SeverityLabel,
    band: (u8, u8),
    recommendations: &'static [&'static str],
    crisis_alert: bool,
}

#[derive(Tabled)]
struct BandRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Score range")]
    range: String,
}

/// Warning shown when a score reaches the crisis threshold
pub fn crisis_message(raw_score: u8) -> String {
    format!("Score {raw_score} calls for immediate follow-up with a counselor or crisis line")
}

/// Pad to nine answers with zeros, the same default the service applies
pub fn complete_answers(answers: &[u8]) -> Result<SurveyResponse> {
    if answers.len() > NUM_ITEMS {
        return Err(anyhow!("expected at most {NUM_ITEMS} answers, got {}", answers.len()));
    }
    let mut full = [0u8; NUM_ITEMS];
    full[..answers.len()].copy_from_slice(answers);
    SurveyResponse::new(full).ok_or_else(|| anyhow!("answers must be between 0 and 3"))
}

pub fn score(answers: &[u8], format: OutputFormat) -> Result<()> {
    let response = complete_answers(answers)?;
    let (total, severity) = score_response(&response);
    let band = band_range(severity);
    let alert = crisis_alert(total);

    let output = ScoreOutput {
        raw_score: total.value(),
        max_score: MAX_SCORE,
        severity,
        band,
        recommendations: recommendations(severity),
        crisis_alert: alert,
    };
    let rows = vec![
        FieldRow::new("Score", format!("{}/{}", total, MAX_SCORE)),
        FieldRow::new("Severity", color_severity(severity)),
        FieldRow::new("Band", format!("{}-{}", band.0, band.1)),
        FieldRow::new("Recommendations", recommendations(severity).join("\n")),
    ];
    print_record(&output, rows, format)?;

    if alert && matches!(format, OutputFormat::Table) {
        print_warning(&crisis_message(total.value()));
    }

    if answers.len() < NUM_ITEMS && matches!(format, OutputFormat::Table) {
        print_info(&format!(
            "{} unanswered item(s) counted as 0",
            NUM_ITEMS - answers.len()
        ));
    }
    Ok(())
}

/// Print the fixed threshold table
pub fn bands(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let bands: Vec<_> = SEVERITY_BANDS
                .iter()
                .map(|(lo, hi, label)| serde_json::json!({"severity": label, "min": lo, "max": hi}))
                .collect();
            println!("{}", serde_json::to_string_pretty(&bands)?);
        }
        OutputFormat::Table => print_rows(
            SEVERITY_BANDS
                .iter()
                .map(|(lo, hi, label)| BandRow {
                    severity: color_severity(*label),
                    range: format!("{lo}-{hi}"),
                })
                .collect(),
        ),
    }
    Ok(())
}
