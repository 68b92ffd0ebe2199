//! Canonical learning records.
//!
//! These are produced once per conversion run, written to the pack database,
//! and read back unchanged by the runtime loader.

use serde::{Deserialize, Serialize};

use crate::error::PackError;

/// Which learning module a topic belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TopicType {
    Vocabulary,
    Phrases,
    HundredSeconds,
}

impl TopicType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicType::Vocabulary => "vocabulary",
            TopicType::Phrases => "phrases",
            TopicType::HundredSeconds => "hundredSeconds",
        }
    }
}

impl std::fmt::Display for TopicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TopicType {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vocabulary" => Ok(TopicType::Vocabulary),
            "phrases" => Ok(TopicType::Phrases),
            "hundredSeconds" | "hundred_seconds" => Ok(TopicType::HundredSeconds),
            other => Err(PackError::parse("topics.type", format!("unknown topic type '{}'", other))),
        }
    }
}

/// Display classification of a topic; affects presentation only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TopicKind {
    #[default]
    Normal,
    Alphabet,
}

impl TopicKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicKind::Normal => "normal",
            TopicKind::Alphabet => "alphabet",
        }
    }

    /// Lenient parse used when reading stored packs; unknown values are normal
    pub fn from_stored(s: &str) -> Self {
        match s {
            "alphabet" => TopicKind::Alphabet,
            _ => TopicKind::Normal,
        }
    }
}

/// Whether a phrase row is an exercise or a visual divider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhraseType {
    #[default]
    Normal,
    Separator,
}

impl PhraseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhraseType::Normal => "normal",
            PhraseType::Separator => "separator",
        }
    }

    pub fn from_stored(s: &str) -> Self {
        match s {
            "separator" => PhraseType::Separator,
            _ => PhraseType::Normal,
        }
    }
}

/// One learning unit grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub topic_type: TopicType,
    pub kind: TopicKind,
    pub name_native: String,
    pub name_sorbian: String,
    pub ord: i64,
    /// Logical asset name of the topic icon
    pub icon: Option<String>,
    /// Logical asset name of the introductory audio
    pub audio_intro: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabItem {
    pub id: String,
    pub topic_id: String,
    /// Unique within the topic
    pub ord: i64,
    pub native: String,
    pub sorbian: String,
    pub image: Option<String>,
    pub audio_sorbian: Option<String>,
    /// Excluded from assignment exercises
    pub ignore_assign: bool,
    /// Excluded from writing exercises
    pub ignore_write: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhraseItem {
    pub id: String,
    pub topic_id: String,
    pub ord: i64,
    pub native: String,
    pub sorbian: String,
    pub audio_native: Option<String>,
    pub audio_sorbian: Option<String>,
    #[serde(rename = "type")]
    pub item_type: PhraseType,
    pub info_text: Option<String>,
}

/// A standalone "hundred seconds" listening item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HundredSecItem {
    pub id: String,
    pub ord: i64,
    pub name: String,
    pub audio: String,
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_type_from_str() {
        assert_eq!("vocabulary".parse::<TopicType>().unwrap(), TopicType::Vocabulary);
        assert_eq!(
            "hundred_seconds".parse::<TopicType>().unwrap(),
            TopicType::HundredSeconds
        );
        assert_eq!(
            TopicType::HundredSeconds.as_str().parse::<TopicType>().unwrap(),
            TopicType::HundredSeconds
        );
        assert!("grammar".parse::<TopicType>().is_err());
    }

    #[test]
    fn test_phrase_type_json_shape() {
        let phrase = PhraseItem {
            id: "p_1".to_string(),
            topic_id: "t_1".to_string(),
            ord: 2,
            native: "Abend".to_string(),
            sorbian: "Wječor".to_string(),
            audio_native: None,
            audio_sorbian: None,
            item_type: PhraseType::Separator,
            info_text: None,
        };

        let json = serde_json::to_value(&phrase).unwrap();
        assert_eq!(json["type"], "separator");
        assert_eq!(json["topicId"], "t_1");
    }

    #[test]
    fn test_stored_values_are_lenient() {
        assert_eq!(TopicKind::from_stored("alphabet"), TopicKind::Alphabet);
        assert_eq!(TopicKind::from_stored(""), TopicKind::Normal);
        assert_eq!(PhraseType::from_stored("divider"), PhraseType::Normal);
    }
}
