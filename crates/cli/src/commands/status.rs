//! Service health and model details

use anyhow::Result;

use crate::client::ApiClient;
use crate::output::{color_status, format_percent, print_record, FieldRow, OutputFormat};

pub async fn health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health = client.health().await?;

    let rows = vec![
        FieldRow::new("Status", color_status(&health.status)),
        FieldRow::new("Model", &health.model),
        FieldRow::new("Accuracy", format_percent(health.accuracy)),
    ];
    print_record(&health, rows, format)
}

pub async fn model_info(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let info = client.model_info().await?;

    let classes = info
        .classes
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let rows = vec![
        FieldRow::new("Model type", &info.model_type),
        FieldRow::new("Features", info.features.join(", ")),
        FieldRow::new("Classes", classes),
        FieldRow::new("Accuracy", format_percent(info.accuracy)),
        FieldRow::new("Training samples", info.training_samples),
        FieldRow::new("Test samples", info.test_samples),
        FieldRow::new("Trees", info.n_estimators),
        FieldRow::new("Seed", info.seed),
        FieldRow::new("Corpus", &info.corpus_source),
        FieldRow::new("Fingerprint", &info.fingerprint),
    ];
    print_record(&info, rows, format)
}
