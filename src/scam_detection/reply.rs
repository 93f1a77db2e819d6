//! Assessment reply parsing
//!
//! Two reply shapes are understood. Free text degrades to a zero score when
//! the score line is missing; structured replies either parse completely or
//! fail.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scam_detection::config::ReplyFormat;
use crate::scam_detection::errors::{Result, ScamDetectionError};
use crate::scam_detection::rules::{DetectedFlag, FlagSet};
use crate::scam_detection::scorer::MAX_SCORE;

/// Outcome of an external assessment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalResult {
    /// `None` when the service did not supply a score
    pub score: Option<u8>,
    pub explanation: String,
    /// Flags the service raised itself, if it reports any
    pub flags: Option<FlagSet>,
}

/// Parse a reply according to the configured format
pub fn parse_reply(format: ReplyFormat, reply: &str) -> Result<ExternalResult> {
    match format {
        ReplyFormat::FreeText => Ok(parse_free_text(reply)),
        ReplyFormat::Structured => parse_structured(reply),
    }
}

/// Parse a "Scam Score: N" style reply.
///
/// The score is the first integer on the first line mentioning "scam score"
/// (0 if there is none). Everything after the first line is the explanation.
pub fn parse_free_text(reply: &str) -> ExternalResult {
    let lines: Vec<&str> = reply.lines().collect();

    let score = lines
        .iter()
        .find(|line| line.to_lowercase().contains("scam score"))
        .map(|line| first_integer(line))
        .unwrap_or(0);

    let explanation = lines.iter().skip(1).copied().collect::<Vec<_>>().join("\n");

    ExternalResult {
        score: Some(score),
        explanation,
        flags: None,
    }
}

/// First run of ASCII digits, clamped to 100. Overflowing runs count as 0.
fn first_integer(line: &str) -> u8 {
    let digits: String = line
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits
        .parse::<u64>()
        .map(|n| n.min(MAX_SCORE as u64) as u8)
        .unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct StructuredReply {
    #[serde(default, alias = "scam_score", alias = "scamScore")]
    score: Option<f64>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default, alias = "red_flags", alias = "redFlags")]
    flags: Option<Vec<String>>,
    #[serde(default)]
    advice: Option<String>,
}

/// Parse a JSON object reply. No partial result is returned on failure.
pub fn parse_structured(reply: &str) -> Result<ExternalResult> {
    let body = strip_code_fence(reply);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ScamDetectionError::Parse(format!("invalid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(ScamDetectionError::Parse(
            "expected a JSON object".to_string(),
        ));
    }

    let parsed: StructuredReply = serde_json::from_value(value)
        .map_err(|e| ScamDetectionError::Parse(format!("unexpected fields: {}", e)))?;

    let score = match parsed.score {
        Some(raw) if raw.is_finite() => Some(raw.round().clamp(0.0, MAX_SCORE as f64) as u8),
        Some(_) => {
            return Err(ScamDetectionError::Parse("score is not a number".to_string()));
        }
        None => None,
    };

    let mut explanation = parsed.explanation.unwrap_or_default();
    if let Some(advice) = parsed.advice.filter(|a| !a.trim().is_empty()) {
        if !explanation.is_empty() {
            explanation.push_str("\n\n");
        }
        explanation.push_str("Advice: ");
        explanation.push_str(advice.trim());
    }

    let flags = parsed.flags.map(|flags| {
        flags
            .iter()
            .filter(|f| !f.trim().is_empty())
            .map(|f| DetectedFlag::from_display(f))
            .collect::<FlagSet>()
    });

    Ok(ExternalResult {
        score,
        explanation,
        flags,
    })
}

/// Models like to wrap JSON in a ```json fence
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_text_reply() {
        let reply = "Scam Score: 85\nExplanation: Impersonates the IRS.\nAdvice: Delete it.";
        let result = parse_free_text(reply);
        assert_eq!(result.score, Some(85));
        assert_eq!(
            result.explanation,
            "Explanation: Impersonates the IRS.\nAdvice: Delete it."
        );
        assert!(result.flags.is_none());
    }

    #[test]
    fn test_free_text_score_line_not_first() {
        let reply = "Here is my analysis\nscam SCORE - 42/100\nLooks phishy";
        let result = parse_free_text(reply);
        assert_eq!(result.score, Some(42));
        assert_eq!(result.explanation, "scam SCORE - 42/100\nLooks phishy");
    }

    #[test]
    fn test_free_text_degrades_to_zero() {
        assert_eq!(parse_free_text("").score, Some(0));
        assert_eq!(parse_free_text("").explanation, "");
        assert_eq!(parse_free_text("Scam score: unknown").score, Some(0));
        assert_eq!(parse_free_text("no score here\nat all").score, Some(0));
    }

    #[test]
    fn test_free_text_clamps() {
        assert_eq!(parse_free_text("Scam Score: 250").score, Some(100));
        assert_eq!(
            parse_free_text("Scam Score: 99999999999999999999999").score,
            Some(0)
        );
    }

    #[test]
    fn test_structured_reply() {
        let reply = r#"{"score": 91.6, "explanation": "Fake refund", "flags": ["Shortened link (bit.ly)", "Pressure"], "advice": "Ignore it"}"#;
        let result = parse_structured(reply).unwrap();
        assert_eq!(result.score, Some(92));
        assert_eq!(result.explanation, "Fake refund\n\nAdvice: Ignore it");

        let flags = result.flags.unwrap();
        assert_eq!(flags.len(), 2);
        assert!(flags.contains(&DetectedFlag {
            label: "Shortened link".to_string(),
            phrase: Some("bit.ly".to_string()),
        }));
    }

    #[test]
    fn test_structured_aliases_and_fence() {
        let reply = "```json\n{\"scam_score\": 87, \"red_flags\": [\"Unknown sender\"]}\n```";
        let result = parse_structured(reply).unwrap();
        assert_eq!(result.score, Some(87));
        assert_eq!(result.explanation, "");
        assert_eq!(result.flags.unwrap().to_strings(), vec!["Unknown sender"]);
    }

    #[test]
    fn test_structured_missing_score() {
        let result = parse_structured(r#"{"explanation": "unsure"}"#).unwrap();
        assert_eq!(result.score, None);
    }

    #[test]
    fn test_structured_malformed() {
        assert!(matches!(
            parse_structured("Scam Score: 80"),
            Err(ScamDetectionError::Parse(_))
        ));
        assert!(matches!(
            parse_structured("[80, \"bad\"]"),
            Err(ScamDetectionError::Parse(_))
        ));
        assert!(matches!(
            parse_structured(r#"{"score": "high"}"#),
            Err(ScamDetectionError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_reply_dispatch() {
        assert!(parse_reply(ReplyFormat::FreeText, "not json").is_ok());
        assert!(parse_reply(ReplyFormat::Structured, "not json").is_err());
    }
}
