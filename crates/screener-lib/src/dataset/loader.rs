//! CSV survey corpus loader
//!
//! Expects a header row containing `q1`..`q9` (other columns are ignored).
//! Blank cells are missing answers: they are imputed by the model and count
//! as 0 towards the label. Rows with an unparseable or out-of-range cell are
//! dropped.

use super::{Corpus, CorpusSource};
use crate::error::CorpusError;
use crate::models::{TrainingExample, FEATURE_NAMES, MAX_ITEM_VALUE, NUM_ITEMS};
use crate::scoring::classify_raw;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Load a labeled corpus from a CSV file
pub fn load_csv(path: &Path) -> Result<Corpus, CorpusError> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let mut columns = [0usize; NUM_ITEMS];
    for (slot, name) in columns.iter_mut().zip(FEATURE_NAMES) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CorpusError::MissingColumn(name.to_string()))?;
    }

    let mut examples = Vec::new();
    let mut skipped = 0usize;

    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                debug!(line = line + 2, error = %e, "Skipping unreadable corpus row");
                skipped += 1;
                continue;
            }
        };

        match parse_row(&columns, |idx| record.get(idx)) {
            Some(example) => examples.push(example),
            None => {
                debug!(line = line + 2, "Skipping corpus row with invalid answer");
                skipped += 1;
            }
        }
    }

    if examples.is_empty() {
        return Err(CorpusError::NoUsableRows { skipped });
    }

    Ok(Corpus {
        examples,
        source: CorpusSource::Csv,
        skipped_rows: skipped,
    })
}

fn parse_row<'a>(
    columns: &[usize; NUM_ITEMS],
    cell: impl Fn(usize) -> Option<&'a str>,
) -> Option<TrainingExample> {
    let mut features = [None; NUM_ITEMS];
    let mut total = 0u8;

    for (slot, &col) in features.iter_mut().zip(columns) {
        let raw = cell(col).unwrap_or("");
        if raw.is_empty() {
            continue;
        }
        let value: f64 = raw.parse().ok()?;
        if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value > f64::from(MAX_ITEM_VALUE) {
            return None;
        }
        total += value as u8;
        *slot = Some(value);
    }

    Some(TrainingExample {
        features,
        label: classify_raw(total),
    })
}
