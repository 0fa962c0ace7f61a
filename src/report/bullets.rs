//! Splitting free-text clinical fields into bullet points.

use serde::{Deserialize, Serialize};

/// How a free-text field is broken into bullets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletStyle {
    /// One bullet per non-blank line. Punctuation inside a line is kept.
    #[default]
    Lines,
    /// Historical behaviour kept for byte-compatible documents: the first
    /// delimiter present among newline, period, comma and semicolon (in that
    /// order) splits the whole text.
    Legacy,
}

const LEGACY_DELIMITERS: [char; 4] = ['\n', '.', ',', ';'];

impl BulletStyle {
    pub fn from_legacy_flag(legacy: bool) -> Self {
        if legacy {
            BulletStyle::Legacy
        } else {
            BulletStyle::Lines
        }
    }

    /// Split `text` into trimmed, non-empty bullets. Blank text yields none.
    pub fn split(self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        match self {
            BulletStyle::Lines => split_on(text, '\n'),
            BulletStyle::Legacy => split_legacy(text),
        }
    }
}

fn split_legacy(text: &str) -> Vec<String> {
    let parts = LEGACY_DELIMITERS
        .iter()
        .find(|d| text.contains(**d))
        .map(|d| split_on(text, *d))
        .unwrap_or_default();

    // Nothing but delimiters: the raw text becomes the only bullet.
    if parts.is_empty() {
        vec![text.to_string()]
    } else {
        parts
    }
}

fn split_on(text: &str, delimiter: char) -> Vec<String> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
