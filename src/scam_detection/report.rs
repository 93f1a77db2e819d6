//! Response formatter
//!
//! Renders a verdict as a plain-text report for people, or as an
//! [`AnalysisResponse`] for programmatic callers. Both are pure functions of
//! their input.

use serde::{Deserialize, Serialize};

use crate::scam_detection::reconcile::Verdict;
use crate::scam_detection::scorer::HeuristicResult;

/// Explanation shown when the assessment service could not be used
pub const SERVICE_ERROR_EXPLANATION: &str = "Error contacting AI service.";

/// Shown when the service answered without an explanation
pub const NO_EXPLANATION: &str = "No explanation provided.";

/// Placeholder for an empty red-flag listing
pub const NO_FLAGS: &str = "No major red flags detected";

/// Render the text report
pub fn format_report(verdict: &Verdict) -> String {
    let tier = verdict.risk_tier;
    let mut out = String::new();

    out.push_str(&format!("{} ({}/100)\n", tier.label(), verdict.combined_score));
    out.push_str(tier.description());
    out.push('\n');

    out.push_str(&format!("AI score: {}", display_score(verdict.external_score)));
    out.push_str(&format!(" | Pattern match: {}\n", verdict.heuristic_score));

    out.push_str(&format!("\nRED FLAGS ({}):\n", verdict.flags.len()));
    if verdict.flags.is_empty() {
        out.push_str(&format!("• {}\n", NO_FLAGS));
    } else {
        for flag in &verdict.flags {
            out.push_str(&format!("• {}\n", flag));
        }
    }

    out.push_str("\nANALYSIS:\n");
    let explanation = verdict.explanation.trim();
    out.push_str(if explanation.is_empty() { NO_EXPLANATION } else { explanation });
    out.push('\n');

    out.push_str("\nRECOMMENDATIONS:\n");
    for rec in &verdict.recommendations {
        out.push_str(&format!("• {}\n", rec));
    }

    out
}

fn display_score(score: Option<u8>) -> String {
    score.map_or_else(|| "n/a".to_string(), |s| s.to_string())
}

/// Outbound response for UI and extension callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub combined_score: Option<u8>,
    pub ai_score: Option<u8>,
    pub base_scam_score: u8,
    pub risk_label: Option<String>,
    pub flags: Vec<String>,
    pub explanation: String,
    pub recommendations: Vec<String>,
    /// The assessment service failed; only the heuristic part is present
    pub degraded: bool,
}

impl AnalysisResponse {
    pub fn from_verdict(verdict: &Verdict) -> Self {
        let explanation = if verdict.explanation.trim().is_empty() {
            NO_EXPLANATION.to_string()
        } else {
            verdict.explanation.clone()
        };

        Self {
            combined_score: Some(verdict.combined_score),
            ai_score: verdict.external_score,
            base_scam_score: verdict.heuristic_score,
            risk_label: Some(verdict.risk_tier.label().to_string()),
            flags: verdict.flags.to_strings(),
            explanation,
            recommendations: verdict.recommendations.clone(),
            degraded: false,
        }
    }

    /// Heuristic-only response used when the assessment service failed
    pub fn service_error(heuristic: &HeuristicResult) -> Self {
        Self {
            combined_score: None,
            ai_score: None,
            base_scam_score: heuristic.score,
            risk_label: None,
            flags: heuristic.flags.to_strings(),
            explanation: SERVICE_ERROR_EXPLANATION.to_string(),
            recommendations: Vec::new(),
            degraded: true,
        }
    }
}
