//! Score reconciler
//!
//! Combines the heuristic and external results into one verdict under the
//! configured score and flag policies.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scam_detection::config::{FlagPolicy, ReconcileConfig, ScorePolicy};
use crate::scam_detection::reply::ExternalResult;
use crate::scam_detection::rules::FlagSet;
use crate::scam_detection::scorer::{HeuristicResult, MAX_SCORE};

/// Coarse risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    /// score < 30
    Low,
    /// 30 <= score < 70
    Medium,
    /// score >= 70
    High,
}

impl RiskTier {
    /// Lower bound of the medium tier (inclusive)
    pub const MEDIUM_THRESHOLD: u8 = 30;
    /// Lower bound of the high tier (inclusive)
    pub const HIGH_THRESHOLD: u8 = 70;

    /// Convert a combined score to a tier
    pub fn from_score(score: u8) -> Self {
        if score < Self::MEDIUM_THRESHOLD {
            Self::Low
        } else if score < Self::HIGH_THRESHOLD {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Banner label shown to users
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "LOW RISK",
            Self::Medium => "MEDIUM RISK",
            Self::High => "HIGH RISK",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Message appears legitimate",
            Self::Medium => "Exercise caution",
            Self::High => "High probability of scam",
        }
    }

    /// Canned actions for this tier, most important first
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            Self::High => &[
                "DO NOT click any links or provide personal information",
                "DO NOT respond to this message",
                "Block the sender immediately",
                "Report this as spam/scam to your provider",
            ],
            Self::Medium => &[
                "Verify sender identity through official channels",
                "Be cautious with any requested actions",
                "Do not provide sensitive information",
            ],
            Self::Low => &[
                "Message appears legitimate but stay vigilant",
                "When in doubt, verify through official channels",
            ],
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        };
        f.write_str(name)
    }
}

/// Final, reconciled verdict for one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub combined_score: u8,
    pub risk_tier: RiskTier,
    pub flags: FlagSet,
    pub explanation: String,
    pub recommendations: Vec<String>,
    /// Heuristic score, kept for display
    pub heuristic_score: u8,
    /// External score, when the service supplied one
    pub external_score: Option<u8>,
}

/// Score reconciler
#[derive(Debug, Clone, Default)]
pub struct ScoreReconciler {
    config: ReconcileConfig,
}

impl ScoreReconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn score_policy(&self) -> ScorePolicy {
        self.config.score_policy
    }

    pub fn flag_policy(&self) -> FlagPolicy {
        self.config.flag_policy
    }

    /// Reconcile both results into a verdict
    pub fn reconcile(&self, heuristic: &HeuristicResult, external: &ExternalResult) -> Verdict {
        let combined_score = self.combined_score(heuristic.score, external.score);
        let risk_tier = RiskTier::from_score(combined_score);
        let flags = self.final_flags(&heuristic.flags, external.flags.as_ref());

        Verdict {
            combined_score,
            risk_tier,
            flags,
            explanation: external.explanation.clone(),
            recommendations: risk_tier
                .recommendations()
                .iter()
                .map(|r| r.to_string())
                .collect(),
            heuristic_score: heuristic.score,
            external_score: external.score,
        }
    }

    /// Combined score; falls back to the heuristic score when the service gave none
    pub fn combined_score(&self, heuristic: u8, external: Option<u8>) -> u8 {
        let heuristic = heuristic.min(MAX_SCORE);
        let Some(external) = external.map(|s| s.min(MAX_SCORE)) else {
            return heuristic;
        };
        match self.config.score_policy {
            ScorePolicy::Average => average_rounded(heuristic, external),
            ScorePolicy::ExternalAuthoritative => external,
        }
    }

    fn final_flags(&self, local: &FlagSet, remote: Option<&FlagSet>) -> FlagSet {
        let Some(remote) = remote.filter(|r| !r.is_empty()) else {
            return local.clone();
        };
        match self.config.flag_policy {
            FlagPolicy::Merge => {
                let mut merged = local.clone();
                merged.extend(remote.iter().cloned());
                merged
            }
            FlagPolicy::ExternalOverwrite => remote.clone(),
        }
    }
}

/// Mean of two scores, halves rounded up
fn average_rounded(a: u8, b: u8) -> u8 {
    ((a as u16 + b as u16 + 1) / 2) as u8
}
