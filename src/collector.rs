//! Feature collection from free text or an uploaded CSV file.

use crate::error::{PrioritizerError, Result};
use crate::model::FeatureList;
use std::io::Read;
use std::path::Path;

/// Column a CSV upload must contain.
pub const FEATURE_COLUMN: &str = "Feature";

/// One feature per line; blank lines dropped, entries trimmed.
pub fn from_text(input: &str) -> FeatureList {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read the `Feature` column of a CSV document. Other columns are ignored.
pub fn from_csv_reader<R: Read>(reader: R) -> Result<FeatureList> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let index = column_index(&headers, FEATURE_COLUMN).ok_or_else(|| {
        PrioritizerError::Validation(format!(
            "CSV must contain a '{}' column (found: {})",
            FEATURE_COLUMN,
            describe_headers(&headers)
        ))
    })?;

    let mut features = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(cell) = record.get(index) {
            let cell = cell.trim();
            if !cell.is_empty() {
                features.push(cell.to_string());
            }
        }
    }

    tracing::debug!(count = features.len(), "Collected features from CSV");
    Ok(features)
}

pub fn from_csv_str(input: &str) -> Result<FeatureList> {
    from_csv_reader(input.as_bytes())
}

pub fn from_csv_path(path: &Path) -> Result<FeatureList> {
    let file = std::fs::File::open(path)?;
    from_csv_reader(file)
}

/// Reject an empty list before anything is sent to the completion service.
pub fn ensure_not_empty(features: &FeatureList) -> Result<()> {
    if features.is_empty() {
        return Err(PrioritizerError::Validation(
            "Please enter at least one feature.".to_string(),
        ));
    }
    Ok(())
}

/// Position of `name` in a header row, ignoring a leading UTF-8 BOM.
pub(crate) fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
}

fn describe_headers(headers: &csv::StringRecord) -> String {
    if headers.is_empty() {
        return "no columns".to_string();
    }
    headers
        .iter()
        .map(|h| format!("'{}'", h))
        .collect::<Vec<_>>()
        .join(", ")
}
