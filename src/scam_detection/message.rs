//! Normalized input message

use std::fmt;

use crate::scam_detection::errors::{Result, ScamDetectionError};

/// OCR output of this many chars or fewer is not worth analyzing
pub const MIN_OCR_TEXT_LEN: usize = 5;

/// A message ready for analysis: trimmed, with internal whitespace collapsed.
///
/// Construction is the only place normalization happens; everything
/// downstream reads the normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
}

impl Message {
    /// Normalize typed or pasted text
    pub fn new(raw: &str) -> Result<Self> {
        let text = normalize(raw);
        if text.is_empty() {
            return Err(ScamDetectionError::InputEmpty);
        }
        Ok(Self { text })
    }

    /// Normalize text extracted from a screenshot.
    ///
    /// OCR on an unreadable image tends to return a few stray glyphs, so short
    /// output is rejected rather than scored.
    pub fn from_ocr(raw: &str) -> Result<Self> {
        let text = normalize(raw);
        if text.is_empty() {
            return Err(ScamDetectionError::InputEmpty);
        }
        let len = text.chars().count();
        if len <= MIN_OCR_TEXT_LEN {
            return Err(ScamDetectionError::InsufficientText {
                len,
                min: MIN_OCR_TEXT_LEN,
            });
        }
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for Message {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
