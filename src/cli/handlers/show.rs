use crate::presenter;
use anyhow::{Context, Result};
use std::path::Path;

use super::utils::print_table;

pub fn handle_show(file: &Path, json: bool) -> Result<()> {
    let mut features = presenter::from_csv_path(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    presenter::sort_by_score(&mut features);

    if json {
        println!("{}", serde_json::to_string_pretty(&features)?);
    } else {
        print_table(&features);
    }
    Ok(())
}
