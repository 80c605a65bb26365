//! Data models for prioritization.
//!
//! - [`FeatureList`]: Ordered feature names collected from the user
//! - [`Framework`]: The prioritization framework (only RICE)
//! - [`ScoredFeature`]: A feature with its RICE score and optional factors

mod framework;
mod scored;

pub use framework::Framework;
pub use scored::{ScoredFeature, rice_score};

/// Ordered, trimmed, non-empty feature names. Duplicates are kept.
pub type FeatureList = Vec<String>;
