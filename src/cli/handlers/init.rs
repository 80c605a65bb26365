use crate::config::{CONFIG_FILE_NAME, PrioritizerConfig};
use crate::error::PrioritizerError;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn handle_init(cwd: &Path, model: Option<String>, force: bool) -> Result<()> {
    let config_path = cwd.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        return Err(PrioritizerError::AlreadyInitialized(config_path.display().to_string()).into());
    }

    let mut config = PrioritizerConfig::default();
    if let Some(model) = model {
        config.completion.model = model;
    }
    config.validate()?;
    config.save(&config_path)?;

    println!("{} prioritizer in {}", "Initialized".green(), cwd.display());
    println!("  Config: {}", config_path.display());
    println!("  Model:  {}", config.completion.model.cyan());
    println!(
        "  Set {} in your environment or a .env file before prioritizing.",
        crate::config::API_KEY_ENV.yellow()
    );

    Ok(())
}
