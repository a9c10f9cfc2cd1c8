//! Remote classification through the service

use anyhow::Result;

use crate::client::ApiClient;
use crate::commands::score::crisis_message;
use crate::output::{
    color_confidence, color_severity, print_record, print_warning, FieldRow, OutputFormat,
};

/// Classify answers with the trained model
pub async fn predict(client: &ApiClient, answers: &[u8], format: OutputFormat) -> Result<()> {
    let prediction = client.predict(answers).await?;

    let answered = prediction
        .responses
        .iter()
        .map(|(q, v)| format!("{q}={v}"))
        .collect::<Vec<_>>()
        .join(" ");

    let rows = vec![
        FieldRow::new("Severity", color_severity(prediction.severity)),
        FieldRow::new("Confidence", color_confidence(prediction.confidence)),
        FieldRow::new(
            "Score",
            format!("{}/{}", prediction.raw_score, prediction.max_score),
        ),
        FieldRow::new("Threshold band", color_severity(prediction.rule_severity)),
        FieldRow::new("Answers", answered),
        FieldRow::new("Recommendations", prediction.recommendations.join("\n")),
    ];
    print_record(&prediction, rows, format)?;

    if matches!(format, OutputFormat::Table) && prediction.crisis_alert {
        print_warning(&crisis_message(prediction.raw_score));
    }

    if matches!(format, OutputFormat::Table) && !prediction.agrees_with_rule {
        print_warning(&format!(
            "Model label {} differs from the threshold band {} for score {}",
            prediction.severity, prediction.rule_severity, prediction.raw_score
        ));
    }

    Ok(())
}
