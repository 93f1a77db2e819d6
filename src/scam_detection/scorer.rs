//! Heuristic scorer
//!
//! Turns locally detected flags (and, under the density formula, pattern
//! counts) into a 0-100 score. No network, no state.

use serde::{Deserialize, Serialize};

use crate::scam_detection::config::{HeuristicConfig, HeuristicFormula};
use crate::scam_detection::features::PatternCounts;
use crate::scam_detection::rules::FlagSet;

/// Upper bound of every score in the pipeline
pub const MAX_SCORE: u8 = 100;

/// Result of the local (rule-based) analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicResult {
    pub score: u8,
    pub flags: FlagSet,
}

/// Heuristic scorer
#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer {
    config: HeuristicConfig,
}

impl HeuristicScorer {
    pub fn new(config: HeuristicConfig) -> Self {
        Self { config }
    }

    pub fn formula(&self) -> HeuristicFormula {
        self.config.formula
    }

    /// Score a message given the flags detected in it
    pub fn score(&self, text: &str, flags: &FlagSet) -> u8 {
        match self.config.formula {
            HeuristicFormula::FlagCount => score_from_flags(flags.len(), self.config.flag_points),
            HeuristicFormula::PatternDensity => density_score(
                &PatternCounts::extract(text),
                flags.len(),
                self.config.pattern_points,
                self.config.density_flag_points,
            ),
        }
    }

    pub fn evaluate(&self, text: &str, flags: FlagSet) -> HeuristicResult {
        let score = self.score(text, &flags);
        HeuristicResult { score, flags }
    }
}

/// `min(flag_count * points, 100)`
pub fn score_from_flags(flag_count: usize, points: u32) -> u8 {
    clamp_score((flag_count as u64).saturating_mul(points as u64))
}

/// `min(pattern_total * pattern_points + flag_count * flag_points, 100)`
pub fn density_score(
    counts: &PatternCounts,
    flag_count: usize,
    pattern_points: u32,
    flag_points: u32,
) -> u8 {
    let patterns = (counts.total() as u64).saturating_mul(pattern_points as u64);
    let flags = (flag_count as u64).saturating_mul(flag_points as u64);
    clamp_score(patterns.saturating_add(flags))
}

/// Clamp any non-negative value into 0..=100
pub fn clamp_score(value: u64) -> u8 {
    value.min(MAX_SCORE as u64) as u8
}
