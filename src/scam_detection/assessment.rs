//! External assessment client
//!
//! Asks a text-understanding service for its own view of a message. The
//! service sits behind the [`ExternalAssessor`] trait; the pipeline only ever
//! calls it through [`assess_bounded`], which enforces a timeout and honours
//! caller cancellation. There is exactly one attempt per request.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::scam_detection::config::{AssessmentConfig, HeuristicConfig, ReplyFormat};
use crate::scam_detection::errors::{Result, ScamDetectionError};
use crate::scam_detection::features::PatternCounts;
use crate::scam_detection::message::Message;
use crate::scam_detection::reply::{parse_reply, ExternalResult};
use crate::scam_detection::rules::FlagSet;
use crate::scam_detection::scorer::density_score;

/// What the assessor gets to see
#[derive(Debug, Clone, Copy)]
pub struct AssessmentRequest<'a> {
    pub message: &'a Message,
    /// Flags detected locally
    pub flags: &'a FlagSet,
}

/// External assessor trait
#[async_trait]
pub trait ExternalAssessor: Send + Sync {
    /// Assessor name, for logs
    fn name(&self) -> &str;

    /// Assess one message
    async fn assess(&self, request: AssessmentRequest<'_>) -> Result<ExternalResult>;
}

/// Run one assessment bounded by `timeout`, aborting early if `cancel` fires.
pub async fn assess_bounded(
    assessor: &dyn ExternalAssessor,
    request: AssessmentRequest<'_>,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<ExternalResult> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("Assessment by {} cancelled by caller", assessor.name());
            Err(ScamDetectionError::Cancelled)
        }
        outcome = tokio::time::timeout(timeout, assessor.assess(request)) => match outcome {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = timeout.as_millis() as u64;
                warn!("Assessment by {} timed out after {}ms", assessor.name(), timeout_ms);
                Err(ScamDetectionError::Timeout { timeout_ms })
            }
        }
    }
}

/// Build the prompt sent to the service
pub fn build_prompt(format: ReplyFormat, message: &Message, flags: Option<&FlagSet>) -> String {
    let mut prompt = String::from(
        "You are a cybersecurity AI trained to detect scam messages across all formats \
         including emails, SMS, and DMs.\n\n\
         Your task:\n\
         1. Analyze the message below and identify manipulative, fraudulent, or suspicious content.\n",
    );

    match format {
        ReplyFormat::FreeText => prompt.push_str(
            "2. Return the response in the following format:\n\
             Scam Score: [0-100]\n\
             Explanation: [your reasoning]\n\
             Advice: [guidance for the user]\n",
        ),
        ReplyFormat::Structured => prompt.push_str(
            "2. Return only a JSON object with these fields:\n\
             {\"score\": <integer 0-100>, \"explanation\": \"<your reasoning>\", \
             \"flags\": [\"<red flag>\", ...], \"advice\": \"<guidance for the user>\"}\n",
        ),
    }

    if let Some(flags) = flags.filter(|f| !f.is_empty()) {
        prompt.push_str("\nAutomated checks already flagged:\n");
        for flag in flags {
            prompt.push_str("- ");
            prompt.push_str(&flag.to_string());
            prompt.push('\n');
        }
    }

    prompt.push_str(&format!("\nMessage: \"{}\"\n", message));
    prompt
}

/// HTTP client for the assessment service.
///
/// Sends `{"message": <prompt>}` and reads the model reply from
/// `message.content` in the JSON response.
pub struct HttpAssessmentClient {
    client: reqwest::Client,
    endpoint: String,
    reply_format: ReplyFormat,
    include_flags: bool,
    api_key: Option<SecretString>,
}

impl HttpAssessmentClient {
    /// Create a client from configuration, without a credential
    pub fn new(config: &AssessmentConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(ScamDetectionError::Configuration(
                "assessment endpoint must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ScamDetectionError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            reply_format: config.reply_format,
            include_flags: config.include_flags_in_prompt,
            api_key: None,
        })
    }

    /// Create a client and pick up the credential from the environment
    /// variable named in the configuration, if it is set
    pub fn from_env(config: &AssessmentConfig) -> Result<Self> {
        let client = Self::new(config)?;
        Ok(match std::env::var(&config.api_key_env) {
            Ok(key) if !key.is_empty() => client.with_api_key(SecretString::new(key)),
            _ => {
                debug!("{} not set, calling assessment service without credential", config.api_key_env);
                client
            }
        })
    }

    /// Attach the service credential
    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn reply_format(&self) -> ReplyFormat {
        self.reply_format
    }

    async fn fetch_reply(&self, prompt: String) -> Result<String> {
        let mut request = self.client.post(&self.endpoint).json(&json!({ "message": prompt }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Assessment service returned {}: {} bytes", status, body.len());
            return Err(ScamDetectionError::Service(format!("HTTP {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ScamDetectionError::Service(format!("invalid response body: {}", e)))?;

        Ok(body
            .pointer("/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}

#[async_trait]
impl ExternalAssessor for HttpAssessmentClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn assess(&self, request: AssessmentRequest<'_>) -> Result<ExternalResult> {
        let flags = self.include_flags.then_some(request.flags);
        let prompt = build_prompt(self.reply_format, request.message, flags);

        let reply = self.fetch_reply(prompt).await?;
        debug!("Assessment reply received: {} bytes", reply.len());

        parse_reply(self.reply_format, &reply)
    }
}

/// Offline stand-in for the assessment service.
///
/// Scores by pattern density and writes a canned report as its explanation.
#[derive(Debug, Clone, Default)]
pub struct SimulatedAssessor {
    config: HeuristicConfig,
}

impl SimulatedAssessor {
    pub fn new(config: HeuristicConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, text: &str, flags: &FlagSet) -> u8 {
        density_score(
            &PatternCounts::extract(text),
            flags.len(),
            self.config.pattern_points,
            self.config.density_flag_points,
        )
    }
}

#[async_trait]
impl ExternalAssessor for SimulatedAssessor {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn assess(&self, request: AssessmentRequest<'_>) -> Result<ExternalResult> {
        let score = self.score(request.message.as_str(), request.flags);
        Ok(ExternalResult {
            score: Some(score),
            explanation: simulated_report(score, request.flags),
            flags: None,
        })
    }
}

fn simulated_report(score: u8, flags: &FlagSet) -> String {
    let mut report = String::from("AI SCAM ANALYSIS REPORT\n\n");

    let (banner, summary, advice): (&str, &str, &[&str]) = if score >= 70 {
        (
            "HIGH RISK ASSESSMENT",
            "This message shows multiple indicators of a scam attempt.",
            &[
                "DO NOT click any links or provide personal information",
                "DO NOT respond to this message",
                "Block the sender immediately",
                "Report this as spam/scam to your provider",
            ],
        )
    } else if score >= 40 {
        (
            "MODERATE RISK ASSESSMENT",
            "This message contains some suspicious elements.",
            &[
                "Verify sender identity through official channels",
                "Be cautious with any requested actions",
                "Do not provide sensitive information",
            ],
        )
    } else {
        (
            "LOW RISK ASSESSMENT",
            "This message appears relatively safe.",
            &[
                "Message appears legitimate but stay vigilant",
                "When in doubt, verify through official channels",
            ],
        )
    };

    report.push_str(&format!("{}\n{}\n\nDETECTED ISSUES:\n", banner, summary));
    if flags.is_empty() {
        report.push_str("• No major red flags detected\n");
    } else {
        for flag in flags {
            report.push_str(&format!("• {}\n", flag));
        }
    }

    report.push_str("\nRECOMMENDATIONS:\n");
    for line in advice {
        report.push_str(&format!("• {}\n", line));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scam_detection::rules::RuleEngine;

    struct SlowAssessor;

    #[async_trait]
    impl ExternalAssessor for SlowAssessor {
        fn name(&self) -> &str {
            "slow"
        }

        async fn assess(&self, _request: AssessmentRequest<'_>) -> Result<ExternalResult> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ExternalResult::default())
        }
    }

    #[test]
    fn test_prompt_free_text() {
        let message = Message::new("Claim your prize now").unwrap();
        let flags = RuleEngine::default().detect_flags(&message);
        let prompt = build_prompt(ReplyFormat::FreeText, &message, Some(&flags));

        assert!(prompt.contains("Scam Score: [0-100]"));
        assert!(prompt.contains("- Too good to be true (prize)"));
        assert!(prompt.ends_with("Message: \"Claim your prize now\"\n"));
    }

    #[test]
    fn test_prompt_structured_without_flags() {
        let message = Message::new("hello there").unwrap();
        let prompt = build_prompt(ReplyFormat::Structured, &message, None);

        assert!(prompt.contains("JSON object"));
        assert!(!prompt.contains("Automated checks"));
    }

    #[test]
    fn test_http_client_requires_endpoint() {
        let config = AssessmentConfig {
            endpoint: "  ".to_string(),
            ..AssessmentConfig::default()
        };
        assert!(HttpAssessmentClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_simulated_assessor() {
        let message = Message::new(
            "Your IRS tax refund is pending acceptance. Must accept within 24 hours: http://bit.ly/sdfsdf.",
        )
        .unwrap();
        let flags = RuleEngine::default().detect_flags(&message);
        let assessor = SimulatedAssessor::default();

        let result = assessor
            .assess(AssessmentRequest { message: &message, flags: &flags })
            .await
            .unwrap();

        // 3 pattern hits * 15 + 2 flags * 10
        assert_eq!(result.score, Some(65));
        assert!(result.explanation.contains("MODERATE RISK ASSESSMENT"));
        assert!(result.explanation.contains("• Shortened link (bit.ly)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_timeout() {
        let message = Message::new("hello").unwrap();
        let flags = FlagSet::new();
        let cancel = CancellationToken::new();

        let err = assess_bounded(
            &SlowAssessor,
            AssessmentRequest { message: &message, flags: &flags },
            Duration::from_millis(100),
            &cancel,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ScamDetectionError::Timeout { timeout_ms: 100 }));
    }

    #[tokio::test]
    async fn test_bounded_cancel() {
        let message = Message::new("hello").unwrap();
        let flags = FlagSet::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = assess_bounded(
            &SlowAssessor,
            AssessmentRequest { message: &message, flags: &flags },
            Duration::from_secs(60),
            &cancel,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ScamDetectionError::Cancelled));
    }
}
