//! Topic kind classification.
//!
//! Legacy sources carry no explicit marker for alphabet/pronunciation
//! topics, so the kind is inferred from the native-language topic name. The
//! whole policy lives here; replacing it with explicit metadata only touches
//! [`classify_topic`] and [`infer_kind`].

use serde::{Deserialize, Serialize};

use crate::domain::TopicKind;
use crate::error::PackError;

use super::text::is_placeholder;

/// Sorbian written standard the pack targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Upper Sorbian
    #[default]
    Hsb,
    /// Lower Sorbian
    Dsb,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Hsb => write!(f, "hsb"),
            Dialect::Dsb => write!(f, "dsb"),
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hsb" | "upper" | "obersorbisch" => Ok(Dialect::Hsb),
            "dsb" | "lower" | "niedersorbisch" => Ok(Dialect::Dsb),
            other => Err(PackError::parse("dialect", format!("unknown dialect '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Alphabet,
    Pronunciation,
}

const ALPHABET_KEYWORDS: &[&str] = &["alphabet", "alfabet", "abc"];
const PRONUNCIATION_KEYWORDS: &[&str] = &["aussprache", "pronunciation", "wurjekowanje"];

fn marker(name_native: &str) -> Option<Marker> {
    let lower = name_native.to_lowercase();
    if ALPHABET_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Some(Marker::Alphabet)
    } else if PRONUNCIATION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Some(Marker::Pronunciation)
    } else {
        None
    }
}

fn synthesized_name(marker: Marker, dialect: Dialect) -> &'static str {
    match (marker, dialect) {
        (Marker::Alphabet, Dialect::Hsb) => "Alfabet",
        (Marker::Alphabet, Dialect::Dsb) => "Alfabet",
        (Marker::Pronunciation, Dialect::Hsb) => "Wurjekowanje",
        (Marker::Pronunciation, Dialect::Dsb) => "Wugronjenje",
    }
}

/// Kind inferred from a topic's native-language name
pub fn infer_kind(name_native: &str) -> TopicKind {
    match marker(name_native) {
        Some(_) => TopicKind::Alphabet,
        None => TopicKind::Normal,
    }
}

/// Kind plus the target-language name to store.
///
/// When the topic is an alphabet/pronunciation topic and the legacy source
/// left the Sorbian name blank or as a placeholder, the name comes from the
/// dialect table.
pub fn classify_topic(name_native: &str, name_sorbian: &str, dialect: Dialect) -> (TopicKind, String) {
    match marker(name_native) {
        Some(m) if is_placeholder(name_sorbian) => {
            (TopicKind::Alphabet, synthesized_name(m, dialect).to_string())
        }
        Some(_) => (TopicKind::Alphabet, name_sorbian.to_string()),
        None => (TopicKind::Normal, name_sorbian.to_string()),
    }
}
