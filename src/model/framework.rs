use crate::error::{PrioritizerError, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Prioritization framework the model is asked to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    #[default]
    Rice,
}

impl Framework {
    /// Names of the factors the framework scores, in formula order.
    pub fn factors(&self) -> &'static [&'static str] {
        match self {
            Framework::Rice => &["Reach", "Impact", "Confidence", "Effort"],
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framework::Rice => write!(f, "RICE"),
        }
    }
}

impl FromStr for Framework {
    type Err = PrioritizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rice" => Ok(Framework::Rice),
            _ => Err(PrioritizerError::Validation(format!(
                "Unsupported framework: {} (only RICE is supported)",
                s
            ))),
        }
    }
}
