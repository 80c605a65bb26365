//! Prompt construction for the completion service.
//!
//! The prompt requests exactly the line grammar that [`crate::parser`]
//! understands:
//!
//! ```text
//! <Feature Name> - RICE Score: <number> (Reach: <n>, Impact: <n>, Confidence: <n>, Effort: <n>)
//! Reason: <one sentence>
//! ```

use crate::model::{FeatureList, Framework};

/// Substitution point for the newline-joined feature list.
const FEATURES_PLACEHOLDER: &str = "{features}";

pub const RICE_PROMPT_TEMPLATE: &str = r#"You are a product manager. Use the RICE framework to prioritize the following product features.

RICE score = (Reach x Impact x Confidence) / Effort, where:
- Reach: number of users affected per quarter
- Impact: 3 = massive, 2 = high, 1 = medium, 0.5 = low, 0.25 = minimal
- Confidence: a number between 0 and 1
- Effort: person-months of work

Features (one per line):
{features}

Respond with exactly one line per feature, sorted from highest to lowest RICE score, using this exact format:
<Feature Name> - RICE Score: <number> (Reach: <number>, Impact: <number>, Confidence: <number>, Effort: <number>)
You may follow each feature line with one line of the form:
Reason: <one sentence explaining the score>

Use the feature names exactly as given. Do not add headings, tables, or any other text."#;

/// A preamble with a single `{features}` substitution point.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    text: &'static str,
}

impl PromptTemplate {
    pub fn for_framework(framework: Framework) -> Self {
        match framework {
            Framework::Rice => Self {
                text: RICE_PROMPT_TEMPLATE,
            },
        }
    }

    pub fn render(&self, features: &FeatureList) -> String {
        self.text
            .replacen(FEATURES_PLACEHOLDER, &features.join("\n"), 1)
    }
}

pub fn build_prompt(features: &FeatureList, framework: Framework) -> String {
    PromptTemplate::for_framework(framework).render(features)
}
