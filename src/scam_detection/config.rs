//! Scam detection configuration
//!
//! Every decision point with more than one acceptable behavior (scoring
//! formula, reply shape, reconciliation policy) is an enum here, resolved once
//! when the detector is built.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::scam_detection::errors::{Result, ScamDetectionError};
use crate::scam_detection::rules::FlagRule;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScamDetectionConfig {
    /// Keyword rule table
    pub rules: RuleConfig,

    /// Heuristic scoring
    pub heuristic: HeuristicConfig,

    /// External assessment service
    pub assessment: AssessmentConfig,

    /// Score and flag reconciliation
    pub reconcile: ReconcileConfig,
}

/// Keyword rule table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Phrase rules, evaluated in order
    pub flag_rules: Vec<FlagRule>,

    /// All-caps text longer than this many chars is flagged
    pub all_caps_min_len: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            flag_rules: default_flag_rules(),
            all_caps_min_len: 10,
        }
    }
}

fn default_flag_rules() -> Vec<FlagRule> {
    [
        ("verify", "Verification scam"),
        ("click below", "Call-to-action"),
        ("click here", "Call-to-action"),
        ("bit.ly", "Shortened link"),
        ("urgent", "Urgency phrase"),
        ("tax refund", "Authority impersonation (IRS/tax refund)"),
        ("prize", "Too good to be true"),
        ("free", "Too good to be true"),
        ("congratulations", "Generic bait"),
        ("suspended", "Account threat"),
        ("expires", "Time pressure"),
        ("act now", "Urgency phrase"),
        ("limited time", "Time pressure"),
        ("confirm", "Verification scam"),
        ("update", "Account maintenance scam"),
        ("office 365", "Brand impersonation (Microsoft)"),
        ("microsoft", "Brand impersonation (Microsoft)"),
        ("email-records.com", "Suspicious sender domain"),
    ]
    .into_iter()
    .map(|(phrase, label)| FlagRule::new(phrase, label))
    .collect()
}

/// Heuristic scoring formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicFormula {
    /// Fixed points per distinct flag
    #[default]
    FlagCount,
    /// Points per pattern occurrence plus points per flag
    PatternDensity,
}

/// Heuristic scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub formula: HeuristicFormula,

    /// Points per flag under `FlagCount`
    pub flag_points: u32,

    /// Points per pattern occurrence under `PatternDensity`
    pub pattern_points: u32,

    /// Points per flag under `PatternDensity`
    pub density_flag_points: u32,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            formula: HeuristicFormula::FlagCount,
            flag_points: 20,
            pattern_points: 15,
            density_flag_points: 10,
        }
    }
}

/// Which assessor backs the external assessment step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentBackend {
    /// Remote text-understanding service over HTTP
    #[default]
    Http,
    /// Local pattern-based stand-in, no network
    Simulated,
}

/// Expected shape of the service reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyFormat {
    /// "Scam Score: N" line followed by explanation lines
    #[default]
    FreeText,
    /// JSON object with score/explanation/flags fields
    Structured,
}

/// External assessment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    pub backend: AssessmentBackend,

    /// Service endpoint (POST)
    pub endpoint: String,

    pub reply_format: ReplyFormat,

    /// Upper bound on one assessment, in milliseconds
    pub timeout_ms: u64,

    /// List locally detected flags in the prompt
    pub include_flags_in_prompt: bool,

    /// Name of the environment variable holding the service credential
    pub api_key_env: String,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            backend: AssessmentBackend::Http,
            endpoint: "http://127.0.0.1:3003/api/analyze".to_string(),
            reply_format: ReplyFormat::FreeText,
            timeout_ms: 15_000,
            include_flags_in_prompt: true,
            api_key_env: "SCAMBUSTER_API_KEY".to_string(),
        }
    }
}

/// How the combined score is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePolicy {
    /// Rounded mean of heuristic and external scores
    #[default]
    Average,
    /// External score replaces the heuristic one
    ExternalAuthoritative,
}

/// How the final flag set is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagPolicy {
    /// Union, local flags first
    #[default]
    Merge,
    /// External flags replace local ones when the service supplies any
    ExternalOverwrite,
}

/// Reconciliation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub score_policy: ScorePolicy,
    pub flag_policy: FlagPolicy,
}

impl ScamDetectionConfig {
    /// Load configuration from a file; `.toml` files are read as TOML,
    /// anything else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = if is_toml(path) {
            toml::from_str(&content)
                .map_err(|e| ScamDetectionError::Configuration(e.to_string()))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| ScamDetectionError::Configuration(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file, format chosen like [`Self::from_file`]
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_toml(path) {
            toml::to_string_pretty(self)
                .map_err(|e| ScamDetectionError::Configuration(e.to_string()))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| ScamDetectionError::Configuration(e.to_string()))?
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        for rule in &self.rules.flag_rules {
            rule.validate()?;
        }

        if self.heuristic.flag_points == 0 {
            return Err(ScamDetectionError::Configuration(
                "flag_points must be greater than 0".to_string(),
            ));
        }

        if self.assessment.backend == AssessmentBackend::Http
            && self.assessment.endpoint.trim().is_empty()
        {
            return Err(ScamDetectionError::Configuration(
                "assessment endpoint must not be empty".to_string(),
            ));
        }

        if self.assessment.timeout_ms == 0 {
            return Err(ScamDetectionError::Configuration(
                "assessment timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScamDetectionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rules.flag_rules.len(), 18);
        assert_eq!(config.heuristic.formula, HeuristicFormula::FlagCount);
        assert_eq!(config.reconcile.score_policy, ScorePolicy::Average);
        assert_eq!(config.reconcile.flag_policy, FlagPolicy::Merge);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ScamDetectionConfig::default();
        config.assessment.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ScamDetectionConfig::default();
        config.rules.flag_rules.push(FlagRule::new("Bit.LY", "Shortened link"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_simulated_backend_needs_no_endpoint() {
        let mut config = ScamDetectionConfig::default();
        config.assessment.backend = AssessmentBackend::Simulated;
        config.assessment.endpoint.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ScamDetectionConfig = toml::from_str(
            r#"
            [assessment]
            reply_format = "structured"
            timeout_ms = 500

            [reconcile]
            score_policy = "external_authoritative"
            "#,
        )
        .unwrap();

        assert_eq!(config.assessment.reply_format, ReplyFormat::Structured);
        assert_eq!(config.assessment.timeout_ms, 500);
        assert_eq!(config.reconcile.score_policy, ScorePolicy::ExternalAuthoritative);
        assert_eq!(config.reconcile.flag_policy, FlagPolicy::Merge);
        assert_eq!(config.rules.flag_rules.len(), 18);
    }
}
