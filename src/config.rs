use crate::error::{PrioritizerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".prioritizer.yml";

/// Environment variable holding the completion service credential.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Environment variable holding the optional access password.
pub const PASSWORD_ENV: &str = "PRIORITIZER_PASSWORD";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrioritizerConfig {
    #[serde(default)]
    pub completion: CompletionSettings,

    #[serde(default)]
    pub output: OutputSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSettings {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as `HTTP-Referer` for app attribution on OpenRouter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,

    /// Sent as `X-Title` for app attribution on OpenRouter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Request timeout. Unset leaves the transport default in place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_model() -> String {
    "mistralai/mistral-7b-instruct".to_string()
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            referer: None,
            title: None,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_export_filename")]
    pub export_filename: String,
}

fn default_export_filename() -> String {
    crate::presenter::EXPORT_FILENAME.to_string()
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            export_filename: default_export_filename(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8501
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl PrioritizerConfig {
    /// Load the nearest `.prioritizer.yml` above `start_path`.
    pub fn load(start_path: &Path) -> Result<(Self, PathBuf)> {
        let config_path = Self::find_config_file(start_path)?;
        let config = Self::load_file(&config_path)?;
        Ok((config, config_path))
    }

    /// Like [`PrioritizerConfig::load`] but falls back to built-in defaults
    /// when no config file exists.
    pub fn load_or_default(start_path: &Path) -> Result<Self> {
        match Self::load(start_path) {
            Ok((config, path)) => {
                tracing::debug!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            Err(PrioritizerError::NotInitialized) => {
                tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PrioritizerConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn find_config_file(start_path: &Path) -> Result<PathBuf> {
        let mut current = start_path.to_path_buf();
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Ok(config_path);
            }
            if !current.pop() {
                return Err(PrioritizerError::NotInitialized);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.completion.model.trim().is_empty() {
            return Err(PrioritizerError::Config(
                "completion.model cannot be empty".to_string(),
            ));
        }
        if !self.completion.base_url.starts_with("http://")
            && !self.completion.base_url.starts_with("https://")
        {
            return Err(PrioritizerError::Config(format!(
                "completion.base_url must be an http(s) URL, got '{}'",
                self.completion.base_url
            )));
        }
        if self.output.export_filename.trim().is_empty() {
            return Err(PrioritizerError::Config(
                "output.export_filename cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Secret values sourced from the environment, never from the config file.
#[derive(Clone, Default)]
pub struct Secrets {
    pub api_key: Option<String>,
    pub access_password: Option<String>,
}

impl Secrets {
    pub fn new(api_key: Option<String>, access_password: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            access_password: access_password.filter(|p| !p.is_empty()),
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            PrioritizerError::Config(format!(
                "{} is not set (export it or put it in a .env file)",
                API_KEY_ENV
            ))
        })
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("api_key", &self.api_key.as_deref().map(key_prefix))
            .field("access_password", &self.access_password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Short, log-safe prefix of a credential.
pub fn key_prefix(key: &str) -> String {
    let prefix: String = key.chars().take(8).collect();
    format!("{prefix}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_fields_missing() {
        let config: PrioritizerConfig = serde_yaml::from_str("completion:\n  model: foo/bar\n").unwrap();
        assert_eq!(config.completion.model, "foo/bar");
        assert_eq!(config.completion.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.output.export_filename, "prioritized_features.csv");
        assert_eq!(config.server.port, 8501);
        assert!(config.completion.timeout_secs.is_none());
    }

    #[test]
    fn test_find_config_searches_upward() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        PrioritizerConfig::default()
            .save(&temp_dir.path().join(CONFIG_FILE_NAME))
            .unwrap();

        let (_, path) = PrioritizerConfig::load(&nested).unwrap();
        assert_eq!(path, temp_dir.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = PrioritizerConfig::load_or_default(temp_dir.path()).unwrap();
        assert_eq!(config.completion.model, default_model());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "completion:\n  base_url: ftp://nope\n").unwrap();

        let err = PrioritizerConfig::load_file(&path).unwrap_err();
        assert!(matches!(err, PrioritizerError::Config(_)));
    }

    #[test]
    fn test_secrets_debug_hides_key() {
        let secrets = Secrets::new(Some("sk-or-v1-abcdef123456".to_string()), Some("hunter2".to_string()));
        let debug = format!("{:?}", secrets);
        assert!(debug.contains("sk-or-v1…"));
        assert!(!debug.contains("abcdef123456"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let secrets = Secrets::new(Some("   ".to_string()), None);
        assert!(secrets.require_api_key().is_err());
    }
}
