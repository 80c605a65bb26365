//! Ordering, terminal rendering and CSV export of scored features.

use crate::collector::column_index;
use crate::error::{PrioritizerError, Result};
use crate::model::ScoredFeature;
use colored::Colorize;
use std::path::Path;

/// Fixed name offered for the downloadable export.
pub const EXPORT_FILENAME: &str = "prioritized_features.csv";

pub const COL_FEATURE: &str = "Feature";
pub const COL_SCORE: &str = "RICE Score";
pub const COL_REACH: &str = "Reach";
pub const COL_IMPACT: &str = "Impact";
pub const COL_CONFIDENCE: &str = "Confidence";
pub const COL_EFFORT: &str = "Effort";
pub const COL_REASON: &str = "Reason";

/// Descending by score. Ties keep their original relative order.
pub fn sort_by_score(features: &mut [ScoredFeature]) {
    features.sort_by(|a, b| b.rice_score.total_cmp(&a.rice_score));
}

/// Which optional columns the result set needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    factors: bool,
    reason: bool,
}

impl Columns {
    fn for_rows(features: &[ScoredFeature]) -> Self {
        Self {
            factors: features.iter().any(ScoredFeature::has_factors),
            reason: features.iter().any(|f| f.reason.is_some()),
        }
    }

    fn header(&self) -> Vec<&'static str> {
        let mut header = vec![COL_FEATURE, COL_SCORE];
        if self.factors {
            header.extend([COL_REACH, COL_IMPACT, COL_CONFIDENCE, COL_EFFORT]);
        }
        if self.reason {
            header.push(COL_REASON);
        }
        header
    }

    fn row(&self, feature: &ScoredFeature) -> Vec<String> {
        let mut row = vec![feature.name.clone(), format_number(feature.rice_score)];
        if self.factors {
            for value in [feature.reach, feature.impact, feature.confidence, feature.effort] {
                row.push(value.map(format_number).unwrap_or_default());
            }
        }
        if self.reason {
            row.push(feature.reason.clone().unwrap_or_default());
        }
        row
    }
}

/// Shortest representation that parses back to the same value (`42`, `0.33`).
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Render an aligned table with a rank column.
pub fn render_table(features: &[ScoredFeature]) -> String {
    if features.is_empty() {
        return "No features to show.".to_string();
    }

    let columns = Columns::for_rows(features);
    let mut header: Vec<String> = vec!["#".to_string()];
    header.extend(columns.header().into_iter().map(str::to_string));

    let rows: Vec<Vec<String>> = features
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let mut row = vec![(i + 1).to_string()];
            row.extend(columns.row(f));
            row
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_line = join_padded(&header, &widths);
    out.push_str(&header_line.bold().to_string());
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
            .dimmed()
            .to_string(),
    );
    out.push('\n');

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let padded = pad(cell, widths[i]);
                match i {
                    0 => padded.dimmed().to_string(),
                    1 => padded.cyan().to_string(),
                    2 => padded.green().bold().to_string(),
                    _ => padded,
                }
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }

    out
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| pad(cell, *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
}

/// Serialize to UTF-8 CSV with a header row.
pub fn to_csv(features: &[ScoredFeature]) -> Result<String> {
    let columns = Columns::for_rows(features);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.header())?;
    for feature in features {
        writer.write_record(columns.row(feature))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PrioritizerError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| PrioritizerError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

pub fn write_csv(path: &Path, features: &[ScoredFeature]) -> Result<()> {
    std::fs::write(path, to_csv(features)?)?;
    tracing::info!(path = %path.display(), rows = features.len(), "Exported CSV");
    Ok(())
}

/// Read an exported file back. `Feature` and `RICE Score` are required.
pub fn from_csv_str(input: &str) -> Result<Vec<ScoredFeature>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();
    let required = |name: &str| {
        column_index(&headers, name).ok_or_else(|| {
            PrioritizerError::Validation(format!("CSV must contain a '{}' column", name))
        })
    };
    let feature_idx = required(COL_FEATURE)?;
    let score_idx = required(COL_SCORE)?;
    let reach_idx = column_index(&headers, COL_REACH);
    let impact_idx = column_index(&headers, COL_IMPACT);
    let confidence_idx = column_index(&headers, COL_CONFIDENCE);
    let effort_idx = column_index(&headers, COL_EFFORT);
    let reason_idx = column_index(&headers, COL_REASON);

    let mut features = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let Some(name) = cell(Some(feature_idx)) else {
            continue;
        };
        let score = cell(Some(score_idx))
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| {
                PrioritizerError::Validation(format!(
                    "Row {}: '{}' is not a number",
                    row + 2,
                    record.get(score_idx).unwrap_or_default()
                ))
            })?;
        let number = |idx: Option<usize>| cell(idx).and_then(|s| s.parse::<f64>().ok());

        let mut feature = ScoredFeature::new(name, score);
        feature.reach = number(reach_idx);
        feature.impact = number(impact_idx);
        feature.confidence = number(confidence_idx);
        feature.effort = number(effort_idx);
        if let Some(reason) = cell(reason_idx) {
            feature = feature.with_reason(reason);
        }
        features.push(feature);
    }

    Ok(features)
}

pub fn from_csv_path(path: &Path) -> Result<Vec<ScoredFeature>> {
    let content = std::fs::read_to_string(path)?;
    from_csv_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector;

    fn scores(values: &[f64]) -> Vec<ScoredFeature> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| ScoredFeature::new(format!("F{}", i), *v))
            .collect()
    }

    #[test]
    fn test_sort_descending() {
        let mut features = scores(&[10.0, 99.0, 5.0]);
        sort_by_score(&mut features);
        let ordered: Vec<f64> = features.iter().map(|f| f.rice_score).collect();
        assert_eq!(ordered, vec![99.0, 10.0, 5.0]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let mut features = scores(&[5.0, 7.0, 5.0, 7.0]);
        sort_by_score(&mut features);
        let names: Vec<&str> = features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["F1", "F3", "F0", "F2"]);
    }

    #[test]
    fn test_csv_minimal_columns() {
        let csv = to_csv(&[ScoredFeature::new("Login flow", 42.0)]).unwrap();
        assert_eq!(csv, "Feature,RICE Score\nLogin flow,42\n");
    }

    #[test]
    fn test_csv_optional_columns() {
        let features = vec![
            ScoredFeature::new("Search", 0.0)
                .with_factors(5.0, 3.0, 0.8, 2.0)
                .with_reason("Users, lots of them"),
            ScoredFeature::new("Dark mode", 17.0),
        ];
        let csv = to_csv(&features).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Feature,RICE Score,Reach,Impact,Confidence,Effort,Reason")
        );
        assert_eq!(lines.next(), Some("Search,6,5,3,0.8,2,\"Users, lots of them\""));
        assert_eq!(lines.next(), Some("Dark mode,17,,,,,"));
    }

    #[test]
    fn test_export_reimport_round_trip() {
        let features = vec![
            ScoredFeature::new("Login flow", 42.0),
            ScoredFeature::new("Dark mode, \"v2\"", 17.25).with_reason("Nice to have"),
        ];
        let csv = to_csv(&features).unwrap();

        let back = from_csv_str(&csv).unwrap();
        assert_eq!(back, features);

        let names = collector::from_csv_str(&csv).unwrap();
        assert_eq!(names, vec!["Login flow", "Dark mode, \"v2\""]);
    }

    #[test]
    fn test_import_requires_score_column() {
        let err = from_csv_str("Feature\nLogin\n").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_import_rejects_non_numeric_score() {
        let err = from_csv_str("Feature,RICE Score\nLogin,high\n").unwrap_err();
        assert!(err.to_string().contains("Row 2"));
    }

    #[test]
    fn test_render_table_contents() {
        let features = vec![
            ScoredFeature::new("Login flow", 42.0).with_reason("Everyone logs in"),
            ScoredFeature::new("Dark mode", 17.0),
        ];
        let table = render_table(&features);
        assert!(table.contains("Feature"));
        assert!(table.contains("RICE Score"));
        assert!(table.contains("Reason"));
        assert!(!table.contains("Reach"));
        assert!(table.contains("Login flow"));
        assert!(table.contains("Everyone logs in"));
        assert!(table.find("Login flow").unwrap() < table.find("Dark mode").unwrap());
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_table(&[]), "No features to show.");
    }
}
