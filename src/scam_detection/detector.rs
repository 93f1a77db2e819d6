//! Scam detector - main entry point
//!
//! Runs the pipeline for one request: normalize, detect flags, score locally,
//! ask the external assessor, reconcile. Nothing is shared between requests
//! except the read-only rule table.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::scam_detection::assessment::{
    assess_bounded, AssessmentRequest, ExternalAssessor, HttpAssessmentClient, SimulatedAssessor,
};
use crate::scam_detection::config::{AssessmentBackend, ScamDetectionConfig};
use crate::scam_detection::errors::Result;
use crate::scam_detection::message::Message;
use crate::scam_detection::reconcile::{ScoreReconciler, Verdict};
use crate::scam_detection::reply::ExternalResult;
use crate::scam_detection::report::AnalysisResponse;
use crate::scam_detection::rules::{DetectedFlag, RuleEngine, RuleTable};
use crate::scam_detection::scorer::{HeuristicResult, HeuristicScorer};

/// Where the message text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    /// Typed or pasted by the user
    #[default]
    Typed,
    /// Extracted from a screenshot
    Ocr,
}

/// Inbound analysis request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub message: String,
    /// Flags the caller already computed; merged with local detection
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub source: InputSource,
}

impl AnalysisRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn from_ocr(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: InputSource::Ocr,
            ..Self::default()
        }
    }

    pub fn with_flags(mut self, flags: Vec<String>) -> Self {
        self.flags = flags;
        self
    }
}

/// Scam detector
pub struct ScamDetector {
    config: ScamDetectionConfig,
    rule_engine: RuleEngine,
    scorer: HeuristicScorer,
    assessor: Arc<dyn ExternalAssessor>,
    reconciler: ScoreReconciler,
}

impl ScamDetector {
    /// Create a detector, building the assessor the configuration selects
    pub fn with_config(config: ScamDetectionConfig) -> Result<Self> {
        config.validate()?;
        let assessor: Arc<dyn ExternalAssessor> = match config.assessment.backend {
            AssessmentBackend::Http => Arc::new(HttpAssessmentClient::from_env(&config.assessment)?),
            AssessmentBackend::Simulated => {
                Arc::new(SimulatedAssessor::new(config.heuristic.clone()))
            }
        };
        Self::with_assessor(config, assessor)
    }

    /// Create a detector with an injected assessor
    pub fn with_assessor(
        config: ScamDetectionConfig,
        assessor: Arc<dyn ExternalAssessor>,
    ) -> Result<Self> {
        config.validate()?;
        let table = Arc::new(RuleTable::from_config(&config.rules)?);

        info!(
            "Scam detector ready: {} rules, formula={:?}, assessor={}, reply={:?}, policy={:?}/{:?}",
            table.len(),
            config.heuristic.formula,
            assessor.name(),
            config.assessment.reply_format,
            config.reconcile.score_policy,
            config.reconcile.flag_policy,
        );

        Ok(Self {
            rule_engine: RuleEngine::new(table),
            scorer: HeuristicScorer::new(config.heuristic.clone()),
            reconciler: ScoreReconciler::new(config.reconcile.clone()),
            assessor,
            config,
        })
    }

    /// Configuration (read-only)
    pub fn config(&self) -> &ScamDetectionConfig {
        &self.config
    }

    pub fn rule_engine(&self) -> &RuleEngine {
        &self.rule_engine
    }

    /// Local analysis only: flags and heuristic score
    pub fn heuristic(&self, message: &Message, extra_flags: &[String]) -> HeuristicResult {
        let mut flags = self.rule_engine.detect_flags(message);
        flags.extend(
            extra_flags
                .iter()
                .filter(|f| !f.trim().is_empty())
                .map(|f| DetectedFlag::from_display(f)),
        );
        self.scorer.evaluate(message.as_str(), flags)
    }

    /// Full analysis. Service and parse failures are returned as errors and
    /// no verdict is produced.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<Verdict> {
        let (message, heuristic) = self.prepare(request)?;
        let external = self.assess(&message, &heuristic, cancel).await?;
        Ok(self.conclude(&heuristic, &external))
    }

    /// Full analysis of typed text, without cancellation
    pub async fn analyze_text(&self, text: &str) -> Result<Verdict> {
        self.analyze(&AnalysisRequest::new(text), &CancellationToken::new())
            .await
    }

    /// Caller-facing analysis. Only empty input is an error; when the
    /// assessment fails the response carries the heuristic result alone.
    pub async fn respond(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResponse> {
        let (message, heuristic) = self.prepare(request)?;
        match self.assess(&message, &heuristic, cancel).await {
            Ok(external) => Ok(AnalysisResponse::from_verdict(
                &self.conclude(&heuristic, &external),
            )),
            Err(e) if e.is_external() => {
                warn!("Falling back to heuristic result: {}", e);
                Ok(AnalysisResponse::service_error(&heuristic))
            }
            Err(e) => Err(e),
        }
    }

    fn prepare(&self, request: &AnalysisRequest) -> Result<(Message, HeuristicResult)> {
        let message = match request.source {
            InputSource::Typed => Message::new(&request.message)?,
            InputSource::Ocr => Message::from_ocr(&request.message)?,
        };
        info!("Analyzing message: {} chars, source={:?}", message.len(), request.source);

        let heuristic = self.heuristic(&message, &request.flags);
        debug!(
            "Heuristic score={} flags={:?}",
            heuristic.score,
            heuristic.flags.to_strings()
        );
        Ok((message, heuristic))
    }

    async fn assess(
        &self,
        message: &Message,
        heuristic: &HeuristicResult,
        cancel: &CancellationToken,
    ) -> Result<ExternalResult> {
        let start = Instant::now();
        let request = AssessmentRequest {
            message,
            flags: &heuristic.flags,
        };
        let timeout = Duration::from_millis(self.config.assessment.timeout_ms);

        let external = assess_bounded(self.assessor.as_ref(), request, timeout, cancel).await?;
        debug!(
            "External score={:?} in {}ms",
            external.score,
            start.elapsed().as_millis()
        );
        Ok(external)
    }

    fn conclude(&self, heuristic: &HeuristicResult, external: &ExternalResult) -> Verdict {
        let verdict = self.reconciler.reconcile(heuristic, external);
        info!(
            "Verdict: {} combined={} heuristic={} external={:?} flags={}",
            verdict.risk_tier,
            verdict.combined_score,
            verdict.heuristic_score,
            verdict.external_score,
            verdict.flags.len()
        );
        verdict
    }
}
