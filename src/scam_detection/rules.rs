//! Keyword rule engine
//!
//! Matches a fixed lexicon of suspicious phrases against a message and
//! reports each matching rule once.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::scam_detection::config::RuleConfig;
use crate::scam_detection::errors::{Result, ScamDetectionError};
use crate::scam_detection::message::Message;

/// Label of the structural all-caps rule
pub const ALL_CAPS_LABEL: &str = "All caps - aggressive tone";

/// A phrase rule: lowercase phrase and the category it signals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagRule {
    pub phrase: String,
    pub label: String,
}

impl FlagRule {
    pub fn new(phrase: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            label: label.into(),
        }
    }

    /// Phrases are matched against lowercased text, so they must be
    /// lowercase themselves
    pub fn validate(&self) -> Result<()> {
        if self.phrase.is_empty() {
            return Err(ScamDetectionError::Configuration(format!(
                "rule '{}' has an empty phrase",
                self.label
            )));
        }
        if self.phrase != self.phrase.to_lowercase() {
            return Err(ScamDetectionError::Configuration(format!(
                "rule phrase '{}' must be lowercase",
                self.phrase
            )));
        }
        if self.label.trim().is_empty() {
            return Err(ScamDetectionError::Configuration(format!(
                "rule '{}' has an empty label",
                self.phrase
            )));
        }
        Ok(())
    }
}

/// A red flag raised for a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetectedFlag {
    pub label: String,
    /// Phrase that triggered the flag; structural flags have none
    pub phrase: Option<String>,
}

impl DetectedFlag {
    pub fn from_rule(rule: &FlagRule) -> Self {
        Self {
            label: rule.label.clone(),
            phrase: Some(rule.phrase.clone()),
        }
    }

    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            phrase: None,
        }
    }

    /// Inverse of `Display`: "Label (phrase)" splits at the last " (".
    /// Anything else becomes a label-only flag.
    pub fn from_display(s: &str) -> Self {
        let s = s.trim();
        if let Some(inner) = s.strip_suffix(')') {
            if let Some(idx) = inner.rfind(" (") {
                let label = inner[..idx].trim();
                let phrase = inner[idx + 2..].trim();
                if !label.is_empty() && !phrase.is_empty() {
                    return Self {
                        label: label.to_string(),
                        phrase: Some(phrase.to_string()),
                    };
                }
            }
        }
        Self::labelled(s)
    }
}

impl fmt::Display for DetectedFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.phrase {
            Some(phrase) => write!(f, "{} ({})", self.label, phrase),
            None => f.write_str(&self.label),
        }
    }
}

impl FromStr for DetectedFlag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_display(s))
    }
}

/// Insertion-ordered set of flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DetectedFlag>", into = "Vec<DetectedFlag>")]
pub struct FlagSet {
    flags: Vec<DetectedFlag>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless an equal flag is already present; returns whether it was added
    pub fn insert(&mut self, flag: DetectedFlag) -> bool {
        if self.flags.contains(&flag) {
            return false;
        }
        self.flags.push(flag);
        true
    }

    pub fn extend<I: IntoIterator<Item = DetectedFlag>>(&mut self, flags: I) {
        for flag in flags {
            self.insert(flag);
        }
    }

    pub fn contains(&self, flag: &DetectedFlag) -> bool {
        self.flags.contains(flag)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectedFlag> {
        self.flags.iter()
    }

    /// Display strings in order
    pub fn to_strings(&self) -> Vec<String> {
        self.flags.iter().map(ToString::to_string).collect()
    }
}

impl FromIterator<DetectedFlag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = DetectedFlag>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl From<Vec<DetectedFlag>> for FlagSet {
    fn from(flags: Vec<DetectedFlag>) -> Self {
        flags.into_iter().collect()
    }
}

impl From<FlagSet> for Vec<DetectedFlag> {
    fn from(set: FlagSet) -> Self {
        set.flags
    }
}

impl<'a> IntoIterator for &'a FlagSet {
    type Item = &'a DetectedFlag;
    type IntoIter = std::slice::Iter<'a, DetectedFlag>;

    fn into_iter(self) -> Self::IntoIter {
        self.flags.iter()
    }
}

/// Validated, read-only rule table
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<FlagRule>,
    all_caps_min_len: usize,
}

impl RuleTable {
    pub fn from_config(config: &RuleConfig) -> Result<Self> {
        for rule in &config.flag_rules {
            rule.validate()?;
        }
        Ok(Self {
            rules: config.flag_rules.clone(),
            all_caps_min_len: config.all_caps_min_len,
        })
    }

    pub fn rules(&self) -> &[FlagRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        let config = RuleConfig::default();
        Self {
            rules: config.flag_rules,
            all_caps_min_len: config.all_caps_min_len,
        }
    }
}

/// Rule engine evaluating messages against a shared rule table
#[derive(Debug, Clone)]
pub struct RuleEngine {
    table: Arc<RuleTable>,
}

impl RuleEngine {
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Detect red flags in a message
    pub fn detect_flags(&self, message: &Message) -> FlagSet {
        self.detect_in_text(message.as_str())
    }

    /// Detect red flags in already-normalized text. Empty text yields no flags.
    pub fn detect_in_text(&self, text: &str) -> FlagSet {
        let mut flags = FlagSet::new();
        let lower = text.to_lowercase();

        for rule in &self.table.rules {
            if lower.contains(&rule.phrase) {
                flags.insert(DetectedFlag::from_rule(rule));
            }
        }

        if is_all_caps(text, self.table.all_caps_min_len) {
            flags.insert(DetectedFlag::labelled(ALL_CAPS_LABEL));
        }

        flags
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(Arc::new(RuleTable::default()))
    }
}

fn is_all_caps(text: &str, min_len: usize) -> bool {
    text.chars().count() > min_len && text == text.to_uppercase()
}
