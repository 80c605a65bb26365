use crate::cli::CompletionArgs;
use crate::config::{CompletionSettings, PrioritizerConfig, Secrets};
use crate::model::ScoredFeature;
use crate::parser::ParseOutcome;
use crate::presenter;
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

/// Config completion settings with command-line overrides applied.
pub fn resolve_settings(config: &PrioritizerConfig, args: &CompletionArgs) -> CompletionSettings {
    let mut settings = config.completion.clone();
    if let Some(model) = &args.model {
        settings.model = model.clone();
    }
    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    settings
}

pub fn resolve_secrets(args: &CompletionArgs, password: Option<String>) -> Secrets {
    Secrets::new(args.api_key.clone(), password)
}

/// Read features from stdin unless it is an interactive terminal.
pub fn read_stdin() -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut content = String::new();
    stdin
        .lock()
        .read_to_string(&mut content)
        .context("Failed to read features from stdin")?;
    Ok(content)
}

/// Where `--output` writes: the given path, or the configured filename in `cwd`.
pub fn export_path(output: Option<PathBuf>, config: &PrioritizerConfig, cwd: &Path) -> PathBuf {
    output.unwrap_or_else(|| cwd.join(&config.output.export_filename))
}

/// Print a scored table, or a warning followed by the raw text.
pub fn print_outcome(outcome: &ParseOutcome) {
    if outcome.is_scored() {
        print_table(outcome.features());
        return;
    }
    eprintln!(
        "{}: Could not parse the response into a table. Showing raw output.",
        "Warning".yellow().bold()
    );
    println!();
    println!("{}", outcome.raw());
}

pub fn print_table(features: &[ScoredFeature]) {
    println!("{}", "Prioritized List".bold());
    println!();
    print!("{}", presenter::render_table(features));
}
