//! Loaded pack content and the read API the app layers use.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{HundredSecItem, Modules, PhraseItem, Topic, TopicType, VocabItem};

/// Everything read from one pack's content database
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackContent {
    pub pack_id: String,
    /// Flags from the pack manifest
    pub modules: Modules,
    /// All topics in stored order
    pub topics: Vec<Topic>,
    pub vocabulary_by_topic: BTreeMap<String, Vec<VocabItem>>,
    pub phrases_by_topic: BTreeMap<String, Vec<PhraseItem>>,
    pub hundred_seconds: Vec<HundredSecItem>,
}

impl PackContent {
    /// Topics of one module, in stored order
    pub fn topics_of_type(&self, topic_type: TopicType) -> Vec<&Topic> {
        self.topics
            .iter()
            .filter(|t| t.topic_type == topic_type)
            .collect()
    }

    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    /// Vocabulary of a topic; empty for unknown ids
    pub fn vocabulary_for(&self, topic_id: &str) -> &[VocabItem] {
        self.vocabulary_by_topic
            .get(topic_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Phrases of a topic; empty for unknown ids
    pub fn phrases_for(&self, topic_id: &str) -> &[PhraseItem] {
        self.phrases_by_topic
            .get(topic_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn hundred_seconds(&self) -> &[HundredSecItem] {
        &self.hundred_seconds
    }

    pub fn modules(&self) -> Modules {
        self.modules
    }

    pub fn vocabulary_count(&self) -> usize {
        self.vocabulary_by_topic.values().map(Vec::len).sum()
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases_by_topic.values().map(Vec::len).sum()
    }
}
