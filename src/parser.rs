//! Best-effort extraction of scored features from the model's free text.
//!
//! Only the grammar requested by [`crate::prompt`] is recognised. Lines that
//! do not match are skipped; parsing never fails.

use crate::model::ScoredFeature;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Integer or decimal, optionally with thousands separators (`1,200.5`).
const NUMBER: &str = r"-?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?|-?\.\d+";

static FEATURE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?xi)
        ^\s*
        (?:(?:\d+[.)]|[-*•])\s+)?                # list numbering or bullet
        (?P<name>.+?)
        \s*[-–—:|]\s*
        (?:\*\*)?RICE\s+Score(?:\*\*)?\s*[:=]?\s*(?:\*\*)?\s*
        (?P<score>{NUMBER})
        (?:\*\*)?
        (?:\s*[-–—,]?\s*\((?P<factors>[^)]*)\))?
        [\s.]*$"
    ))
    .expect("feature line pattern is valid")
});

static FACTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<key>reach|impact|confidence|effort)\b\s*[:=]\s*(?P<value>{NUMBER})\s*(?P<pct>%)?"
    ))
    .expect("factor pattern is valid")
});

static REASON_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*•]\s*)?(?:\*\*)?reason(?:\*\*)?\s*:(?:\*\*)?\s*(?P<reason>.*?)\s*$")
        .expect("reason pattern is valid")
});

/// Result of parsing a completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ParseOutcome {
    /// At least one line matched the grammar.
    Scored {
        features: Vec<ScoredFeature>,
        raw: String,
    },
    /// Nothing matched; the raw text should be shown instead of a table.
    Unparsed { raw: String },
}

impl ParseOutcome {
    pub fn is_scored(&self) -> bool {
        matches!(self, ParseOutcome::Scored { .. })
    }

    pub fn features(&self) -> &[ScoredFeature] {
        match self {
            ParseOutcome::Scored { features, .. } => features,
            ParseOutcome::Unparsed { .. } => &[],
        }
    }

    /// The completion text as received.
    pub fn raw(&self) -> &str {
        match self {
            ParseOutcome::Scored { raw, .. } | ParseOutcome::Unparsed { raw } => raw,
        }
    }

    /// Order scored features for presentation.
    pub fn sorted(mut self) -> Self {
        if let ParseOutcome::Scored { features, .. } = &mut self {
            crate::presenter::sort_by_score(features);
        }
        self
    }
}

/// Parse a completion into an outcome, keeping the raw text when nothing matched.
pub fn parse_outcome(raw: String) -> ParseOutcome {
    let features = parse_response(&raw);
    if features.is_empty() {
        tracing::warn!("Response did not match the expected format");
        ParseOutcome::Unparsed { raw }
    } else {
        ParseOutcome::Scored { features, raw }
    }
}

/// Scan the response line by line. An empty result means nothing matched.
pub fn parse_response(text: &str) -> Vec<ScoredFeature> {
    let mut features: Vec<ScoredFeature> = Vec::new();
    // Whether the previous non-blank line produced an entry
    let mut after_entry = false;

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(feature) = parse_feature_line(line) {
            features.push(feature);
            after_entry = true;
            continue;
        }

        if after_entry {
            if let Some(caps) = REASON_LINE.captures(line) {
                let reason = caps["reason"].trim();
                if let Some(last) = features.last_mut() {
                    if last.reason.is_none() && !reason.is_empty() {
                        last.reason = Some(reason.to_string());
                    }
                }
            }
        }
        after_entry = false;
    }

    features
}

fn parse_feature_line(line: &str) -> Option<ScoredFeature> {
    let caps = FEATURE_LINE.captures(line)?;

    let name = clean_name(&caps["name"]);
    if name.is_empty() {
        return None;
    }
    let stated = parse_number(&caps["score"])?;

    let mut feature = ScoredFeature::new(name, stated);
    if let Some(group) = caps.name("factors") {
        apply_factors(&mut feature, group.as_str());
    }

    if let (Some(r), Some(i), Some(c), Some(e)) =
        (feature.reach, feature.impact, feature.confidence, feature.effort)
    {
        feature = feature.with_factors(r, i, c, e);
        if (feature.rice_score - stated).abs() > 0.01 {
            tracing::debug!(
                feature = %feature.name,
                stated,
                computed = feature.rice_score,
                "Stated RICE score differs from factors, using computed score"
            );
        }
    }

    Some(feature)
}

fn apply_factors(feature: &mut ScoredFeature, group: &str) {
    for caps in FACTOR.captures_iter(group) {
        let Some(mut value) = parse_number(&caps["value"]) else {
            continue;
        };
        if caps.name("pct").is_some() {
            value /= 100.0;
        }
        match caps["key"].to_lowercase().as_str() {
            "reach" => feature.reach = Some(value),
            "impact" => feature.impact = Some(value),
            "confidence" => feature.confidence = Some(value),
            "effort" => feature.effort = Some(value),
            _ => {}
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Strip markup that wraps the whole name. Characters belonging to the
/// name itself (`*Starred* items`, `-5% churn`) are left alone.
fn clean_name(raw: &str) -> String {
    let mut name = raw.trim();
    for wrap in ["**", "__", "\"", "`"] {
        if let Some(inner) = name.strip_prefix(wrap).and_then(|n| n.strip_suffix(wrap)) {
            name = inner.trim();
        }
    }
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_plain_lines_in_order() {
        let text = "Login flow - RICE Score: 42\nDark mode - RICE Score: 17";
        let features = parse_response(text);
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].name, "Login flow");
        assert_eq!(features[0].rice_score, 42.0);
        assert_eq!(features[1].name, "Dark mode");
        assert_eq!(features[1].rice_score, 17.0);
    }

    #[test]
    fn test_paragraph_yields_empty() {
        let text = "I think you should build the login flow first because users need it, \
                    and dark mode can wait until next quarter.";
        assert!(parse_response(text).is_empty());
    }

    #[test]
    fn test_unparsed_outcome_keeps_raw_text() {
        let raw = "Sorry, I cannot help with that.".to_string();
        match parse_outcome(raw.clone()) {
            ParseOutcome::Unparsed { raw: kept } => assert_eq!(kept, raw),
            other => panic!("expected unparsed, got {:?}", other),
        }
    }

    #[test]
    fn test_factors_recompute_score() {
        let text = "Search - RICE Score: 7 (Reach: 5, Impact: 3, Confidence: 0.8, Effort: 2)";
        let features = parse_response(text);
        assert_eq!(features.len(), 1);
        let f = &features[0];
        assert_eq!(f.reach, Some(5.0));
        assert_eq!(f.impact, Some(3.0));
        assert_eq!(f.confidence, Some(0.8));
        assert_eq!(f.effort, Some(2.0));
        assert_eq!(f.rice_score, 6.0);
    }

    #[test]
    fn test_confidence_percentage_and_zero_effort() {
        let text = "Onboarding - RICE Score: 8 (Reach: 4, Impact: 2, Confidence: 100%, Effort: 0)";
        let features = parse_response(text);
        assert_eq!(features[0].confidence, Some(1.0));
        assert_eq!(features[0].rice_score, 8.0);
    }

    #[test]
    fn test_partial_factors_keep_stated_score() {
        let text = "Billing - RICE Score: 12.5 (Reach: 500, Impact: 1)";
        let features = parse_response(text);
        assert_eq!(features[0].rice_score, 12.5);
        assert_eq!(features[0].reach, Some(500.0));
        assert!(features[0].effort.is_none());
    }

    #[test]
    fn test_markdown_decorations_tolerated() {
        let text = "1. **Login flow** - **RICE Score:** 1,200\n\
                    2) Sign-up wizard – RICE score: 3.5\n\
                    * 2FA support: RICE Score = 9";
        let features = parse_response(text);
        let names: Vec<_> = features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Login flow", "Sign-up wizard", "2FA support"]);
        assert_eq!(features[0].rice_score, 1200.0);
        assert_eq!(features[1].rice_score, 3.5);
        assert_eq!(features[2].rice_score, 9.0);
    }

    #[test]
    fn test_reason_attaches_to_preceding_entry() {
        let text = "Login flow - RICE Score: 42\n\
                    Reason: Everyone has to log in.\n\
                    \n\
                    Dark mode - RICE Score: 17\n\
                    Some unrelated commentary.\n\
                    Reason: orphaned";
        let features = parse_response(text);
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].reason.as_deref(), Some("Everyone has to log in."));
        assert!(features[1].reason.is_none());
    }

    #[test]
    fn test_non_matching_lines_skipped() {
        let text = "Here is the prioritized list:\n\
                    \n\
                    Login flow - RICE Score: 42\n\
                    | Feature | Score |\n\
                    Dark mode - RICE Score: lots\n\
                    Hope this helps!";
        let features = parse_response(text);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].name, "Login flow");
    }

    #[test]
    fn test_names_starting_with_marker_characters_kept() {
        let text = "2.0 API redesign - RICE Score: 9\n\
                    -5% churn campaign - RICE Score: 4\n\
                    *Starred* items - RICE Score: 3\n\
                    3.14 release - RICE Score: 2\n\
                    - **\"Quoted\" export** - RICE Score: 1";
        let names: Vec<_> = parse_response(text).into_iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec![
                "2.0 API redesign",
                "-5% churn campaign",
                "*Starred* items",
                "3.14 release",
                "\"Quoted\" export",
            ]
        );
    }

    #[test]
    fn test_marker_then_name_with_digits() {
        let features = parse_response("1. 2.0 API redesign - RICE Score: 9");
        assert_eq!(features[0].name, "2.0 API redesign");
    }

    #[test]
    fn test_garbage_input_never_panics() {
        for text in ["", "\n\n", " - RICE Score: ", "RICE Score: 5", "((((", "- - - RICE Score: 1e999"] {
            let _ = parse_response(text);
        }
        assert!(parse_response(" - RICE Score: 5").is_empty());
    }
}
