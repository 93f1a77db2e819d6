//! Pattern-density features
//!
//! Counts occurrences of five suspicious pattern classes in a message. Unlike
//! the keyword rules, every occurrence counts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pattern class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternClass {
    /// Pressure and call-to-action words
    Urgency,
    /// Prize and lottery bait
    Prize,
    /// Government, bank and brand names
    Authority,
    /// Raw http(s) links
    Url,
    /// Dollar amounts
    Money,
}

impl PatternClass {
    pub const ALL: [PatternClass; 5] = [
        PatternClass::Urgency,
        PatternClass::Prize,
        PatternClass::Authority,
        PatternClass::Url,
        PatternClass::Money,
    ];

    fn regex(&self) -> &'static Regex {
        match self {
            Self::Urgency => &URGENCY,
            Self::Prize => &PRIZE,
            Self::Authority => &AUTHORITY,
            Self::Url => &URL,
            Self::Money => &MONEY,
        }
    }

    /// Number of non-overlapping matches in `text`
    pub fn count(&self, text: &str) -> usize {
        self.regex().find_iter(text).count()
    }
}

static URGENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(urgent|immediate|expire|suspend|verify|confirm|update|click|act now)\b")
        .expect("urgency pattern")
});
static PRIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(free|prize|winner|congratulations|selected)\b").expect("prize pattern")
});
static AUTHORITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(tax refund|irs|government|bank|paypal|amazon)\b")
        .expect("authority pattern")
});
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://\S+").expect("url pattern"));
static MONEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\d+").expect("money pattern"));

/// Per-class occurrence counts for one message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCounts {
    pub urgency: usize,
    pub prize: usize,
    pub authority: usize,
    pub url: usize,
    pub money: usize,
}

impl PatternCounts {
    pub fn extract(text: &str) -> Self {
        Self {
            urgency: PatternClass::Urgency.count(text),
            prize: PatternClass::Prize.count(text),
            authority: PatternClass::Authority.count(text),
            url: PatternClass::Url.count(text),
            money: PatternClass::Money.count(text),
        }
    }

    pub fn get(&self, class: PatternClass) -> usize {
        match class {
            PatternClass::Urgency => self.urgency,
            PatternClass::Prize => self.prize,
            PatternClass::Authority => self.authority,
            PatternClass::Url => self.url,
            PatternClass::Money => self.money,
        }
    }

    pub fn total(&self) -> usize {
        self.urgency + self.prize + self.authority + self.url + self.money
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_every_occurrence() {
        let counts = PatternCounts::extract("Click now. CLICK again, click!");
        assert_eq!(counts.urgency, 3);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_word_boundaries() {
        // "expired" and "freedom" are not whole-word matches
        let counts = PatternCounts::extract("expired freedom");
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_url_and_money() {
        let counts =
            PatternCounts::extract("Claim $500 at https://win.example/x or http://bit.ly/abc for $20");
        assert_eq!(counts.url, 2);
        assert_eq!(counts.money, 2);
    }

    #[test]
    fn test_irs_scenario() {
        let counts = PatternCounts::extract(
            "Your IRS tax refund is pending acceptance. Must accept within 24 hours: http://bit.ly/sdfsdf.",
        );
        assert_eq!(counts.authority, 2);
        assert_eq!(counts.url, 1);
        assert_eq!(counts.get(PatternClass::Urgency), 0);
    }
}
