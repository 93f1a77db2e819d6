//! tests/report_tests.rs
//!
//! Risk tiers and the rendered report.

use scambuster::scam_detection::{
    format_report, AnalysisResponse, ExternalResult, HeuristicScorer, RiskTier, RuleEngine,
    ScoreReconciler,
};
use test_case::test_case;

#[test_case(0 => RiskTier::Low)]
#[test_case(29 => RiskTier::Low)]
#[test_case(30 => RiskTier::Medium)]
#[test_case(69 => RiskTier::Medium)]
#[test_case(70 => RiskTier::High)]
#[test_case(100 => RiskTier::High)]
fn tier_for_score(score: u8) -> RiskTier {
    RiskTier::from_score(score)
}

#[test_case(RiskTier::Low, 2, "LOW RISK")]
#[test_case(RiskTier::Medium, 3, "MEDIUM RISK")]
#[test_case(RiskTier::High, 4, "HIGH RISK")]
fn tier_texts(tier: RiskTier, recommendations: usize, label: &str) {
    assert_eq!(tier.recommendations().len(), recommendations);
    assert_eq!(tier.label(), label);
}

#[test]
fn test_full_report_layout() {
    let text =
        "Your IRS tax refund is pending acceptance. Must accept within 24 hours: http://bit.ly/sdfsdf.";
    let flags = RuleEngine::default().detect_in_text(text);
    let heuristic = HeuristicScorer::default().evaluate(text, flags);
    let external = ExternalResult {
        score: Some(90),
        explanation: "Explanation: Classic refund phishing.".to_string(),
        flags: None,
    };

    let verdict = ScoreReconciler::default().reconcile(&heuristic, &external);
    let report = format_report(&verdict);

    let expected = "\
MEDIUM RISK (65/100)
Exercise caution
AI score: 90 | Pattern match: 40

RED FLAGS (2):
• Shortened link (bit.ly)
• Authority impersonation (IRS/tax refund) (tax refund)

ANALYSIS:
Explanation: Classic refund phishing.

RECOMMENDATIONS:
• Verify sender identity through official channels
• Be cautious with any requested actions
• Do not provide sensitive information
";
    pretty_assertions::assert_eq!(report, expected);
    assert_eq!(format_report(&verdict), report);

    let response = AnalysisResponse::from_verdict(&verdict);
    assert_eq!(response.combined_score, Some(65));
    assert_eq!(response.ai_score, Some(90));
    assert_eq!(response.base_scam_score, 40);
    assert_eq!(response.risk_label.as_deref(), Some("MEDIUM RISK"));
}
