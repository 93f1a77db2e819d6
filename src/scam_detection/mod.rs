//! Scam message detection
//!
//! Classifies a free-text message (typed, or extracted from a screenshot) as
//! scam-like or benign.
//!
//! ## Pipeline
//! - Keyword rule engine: fixed phrase table plus an all-caps check
//! - Heuristic scorer: flag count (or pattern density) to a 0-100 score
//! - External assessment: a text-understanding service, bounded by a timeout
//!   and cancellable
//! - Reconciler: one combined score, risk tier and flag set
//! - Report: text report or a serializable response

pub mod assessment;
pub mod config;
pub mod detector;
pub mod errors;
pub mod features;
pub mod message;
pub mod reconcile;
pub mod reply;
pub mod report;
pub mod rules;
pub mod scorer;

pub use assessment::{
    assess_bounded, build_prompt, AssessmentRequest, ExternalAssessor, HttpAssessmentClient,
    SimulatedAssessor,
};
pub use config::{
    AssessmentBackend, AssessmentConfig, FlagPolicy, HeuristicConfig, HeuristicFormula,
    ReconcileConfig, ReplyFormat, RuleConfig, ScamDetectionConfig, ScorePolicy,
};
pub use detector::{AnalysisRequest, InputSource, ScamDetector};
pub use errors::{ErrorKind, Result, ScamDetectionError};
pub use features::{PatternClass, PatternCounts};
pub use message::Message;
pub use reconcile::{RiskTier, ScoreReconciler, Verdict};
pub use reply::{parse_free_text, parse_reply, parse_structured, ExternalResult};
pub use report::{format_report, AnalysisResponse, SERVICE_ERROR_EXPLANATION};
pub use rules::{DetectedFlag, FlagRule, FlagSet, RuleEngine, RuleTable, ALL_CAPS_LABEL};
pub use scorer::{HeuristicResult, HeuristicScorer};
