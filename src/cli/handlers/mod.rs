mod init;
mod prioritize;
mod serve;
mod show;
mod utils;

pub use init::handle_init;
pub use prioritize::handle_prioritize;
pub use serve::handle_serve;
pub use show::handle_show;

use crate::config::PrioritizerConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Common context passed to all command handlers
pub struct CommandContext {
    pub config: PrioritizerConfig,
    pub cwd: PathBuf,
}

impl CommandContext {
    pub fn new(config: PrioritizerConfig, cwd: PathBuf) -> Self {
        Self { config, cwd }
    }

    /// Load from an explicit config file, or search upward from `cwd`.
    pub fn load(config_path: Option<&Path>, cwd: PathBuf) -> Result<Self> {
        let config = match config_path {
            Some(path) => PrioritizerConfig::load_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => PrioritizerConfig::load_or_default(&cwd)
                .context("Failed to load prioritizer configuration")?,
        };
        Ok(Self::new(config, cwd))
    }
}
