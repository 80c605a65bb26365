use serde::{Deserialize, Serialize};

/// One feature with the scores extracted from the model's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredFeature {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reach: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<f64>,

    pub rice_score: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ScoredFeature {
    pub fn new(name: impl Into<String>, rice_score: f64) -> Self {
        Self {
            name: name.into(),
            reach: None,
            impact: None,
            confidence: None,
            effort: None,
            rice_score,
            reason: None,
        }
    }

    /// Attach all four factors and recompute the score from them.
    pub fn with_factors(mut self, reach: f64, impact: f64, confidence: f64, effort: f64) -> Self {
        self.reach = Some(reach);
        self.impact = Some(impact);
        self.confidence = Some(confidence);
        self.effort = Some(effort);
        self.rice_score = rice_score(reach, impact, confidence, effort);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        self.reason = if reason.trim().is_empty() {
            None
        } else {
            Some(reason)
        };
        self
    }

    pub fn has_factors(&self) -> bool {
        self.reach.is_some()
            || self.impact.is_some()
            || self.confidence.is_some()
            || self.effort.is_some()
    }
}

/// `round(reach * impact * confidence / effort, 2)`.
///
/// An effort of zero is treated as one so the score stays finite.
pub fn rice_score(reach: f64, impact: f64, confidence: f64, effort: f64) -> f64 {
    let effort = if effort == 0.0 { 1.0 } else { effort };
    round2(reach * impact * confidence / effort)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
