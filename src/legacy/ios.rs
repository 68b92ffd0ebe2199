//! iOS-style topic-per-file layout (English/Sorbian).
//!
//! Every `topicN.xml` holds one phrase list:
//!
//! ```xml
//! <topic>
//!   <topicNameEnglish>..</topicNameEnglish>
//!   <topicNameSorbian>..</topicNameSorbian>
//!   <topicSoundSorbian>..</topicSoundSorbian>
//!   <phrases>
//!     <phrase type="separator|normal">
//!       <englishText/><sorbianText/><englishSound/><sorbianSound/><infoText/>
//!     </phrase>
//!   </phrases>
//! </topic>
//! ```
//!
//! Sound files sit next to the topic files. There is no vocabulary or
//! hundred-seconds module in this layout.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::assets::{AssetCategory, AssetManifest};
use crate::domain::{OccurrenceCounter, PhraseItem, PhraseType, Topic, TopicKind, TopicType};
use crate::error::{PackError, Result};

use super::text::{self, normalize_text};
use super::xml::{self, XmlElement};
use super::{item_id, topic_id, AssetRoots, LegacyContent, LegacyParser, SourceLayout};

const TOPIC_NATIVE: &[&str] = &["topicNameEnglish", "nameEnglish"];
const TOPIC_SORBIAN: &[&str] = &["topicNameSorbian", "nameSorbian"];
const TOPIC_SOUND: &[&str] = &["topicSoundSorbian", "soundSorbian"];

const NATIVE: &[&str] = &["englishText", "en"];
const SORBIAN: &[&str] = &["sorbianText", "hsb", "dsb"];
const SOUND_NATIVE: &[&str] = &["englishSound", "audio_en"];
const SOUND_SORBIAN: &[&str] = &["sorbianSound", "audio"];

/// True for `topic<digits>.xml`, case-insensitive
fn is_topic_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower
        .strip_prefix("topic")
        .and_then(|rest| rest.strip_suffix(".xml"))
        .map(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Numbered topic files directly under the root, in numeric order
pub fn topic_files(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(root).map_err(|source| PackError::LegacyRead {
        path: root.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_topic_file(&text::file_name(&path)) {
            files.push(path);
        }
    }

    text::sort_by_numeric_token(&mut files);
    Ok(files)
}

pub struct IosTopicPerFile {
    root: PathBuf,
    roots: AssetRoots,
}

impl IosTopicPerFile {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            roots: AssetRoots::ios(root),
        }
    }

    fn phrases(
        &self,
        doc: &XmlElement,
        topic_id: &str,
        assets: &mut AssetManifest,
    ) -> Vec<PhraseItem> {
        let mut ids = OccurrenceCounter::new();
        let mut items = Vec::new();

        for phrase in doc.items("phrases", &["phrase", "item", "separator"]) {
            let separator =
                phrase.name == "separator" || phrase.attr("type") == Some("separator");
            let item_type = if separator {
                PhraseType::Separator
            } else {
                PhraseType::Normal
            };
            let native = normalize_text(phrase.value_any(NATIVE).unwrap_or_default());
            let sorbian = normalize_text(phrase.value_any(SORBIAN).unwrap_or_default());
            let info_text = phrase
                .value_any(&["infoText", "info"])
                .map(normalize_text)
                .filter(|t| !t.is_empty());

            items.push(PhraseItem {
                id: item_id(&mut ids, "p", topic_id, item_type.as_str(), &native, &sorbian),
                topic_id: topic_id.to_string(),
                ord: items.len() as i64 + 1,
                audio_native: self.roots.resolve(
                    assets,
                    phrase.value_any(SOUND_NATIVE),
                    AssetCategory::Audio,
                ),
                audio_sorbian: self.roots.resolve(
                    assets,
                    phrase.value_any(SOUND_SORBIAN),
                    AssetCategory::Audio,
                ),
                item_type,
                info_text,
                native,
                sorbian,
            });
        }

        items
    }
}

impl LegacyParser for IosTopicPerFile {
    fn layout(&self) -> SourceLayout {
        SourceLayout::IosTopicPerFile
    }

    fn parse(&self, assets: &mut AssetManifest) -> Result<LegacyContent> {
        let mut content = LegacyContent::default();
        let mut topic_ids = OccurrenceCounter::new();

        for (i, path) in topic_files(&self.root)?.into_iter().enumerate() {
            debug!(file = %path.display(), "Converting topic file");
            let doc = xml::parse_file(&path)?;

            let ord = i as i64 + 1;
            let mut name_native = normalize_text(doc.value_any(TOPIC_NATIVE).unwrap_or_default());
            if name_native.is_empty() {
                name_native = format!("Topic {}", ord);
            }
            let name_sorbian = normalize_text(doc.value_any(TOPIC_SORBIAN).unwrap_or_default());
            let id = topic_id(&mut topic_ids, TopicType::Phrases, &name_native, &name_sorbian);

            let items = self.phrases(&doc, &id, assets);
            content.phrases_by_topic.insert(id.clone(), items);
            content.topics.push(Topic {
                id,
                topic_type: TopicType::Phrases,
                kind: TopicKind::Normal,
                ord,
                icon: self.roots.resolve(assets, doc.value_any(&["icon"]), AssetCategory::Icon),
                audio_intro: self
                    .roots
                    .resolve(assets, doc.value_any(TOPIC_SOUND), AssetCategory::Audio),
                name_native,
                name_sorbian,
            });
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_topic_file() {
        assert!(is_topic_file("topic1.xml"));
        assert!(is_topic_file("Topic12.XML"));
        assert!(!is_topic_file("topic.xml"));
        assert!(!is_topic_file("topic1a.xml"));
        assert!(!is_topic_file("vocabulary1.xml"));
    }

    #[test]
    fn test_parse_ios_tree() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::write(
            root.join("topic10.xml"),
            r#"<topic nameEnglish="Weather">
                 <topicNameSorbian>Wjedro</topicNameSorbian>
                 <phrases/>
               </topic>"#,
        )
        .unwrap();
        std::fs::write(
            root.join("topic2.xml"),
            r#"<topic>
                 <topicNameEnglish>Greetings</topicNameEnglish>
                 <topicNameSorbian>Postrowy</topicNameSorbian>
                 <topicSoundSorbian>postrowy_intro</topicSoundSorbian>
                 <phrases>
                   <phrase type="normal">
                     <englishText>Hello</englishText>
                     <sorbianText>Witaj</sorbianText>
                     <englishSound>hello_en</englishSound>
                     <sorbianSound>witaj.mp3</sorbianSound>
                   </phrase>
                   <phrase type="separator"><englishText>Evening</englishText></phrase>
                   <phrase>
                     <englishText>Good   evening</englishText>
                     <sorbianText>Dobry wječor</sorbianText>
                     <sorbianSound>missing</sorbianSound>
                     <infoText>polite</infoText>
                   </phrase>
                 </phrases>
               </topic>"#,
        )
        .unwrap();
        std::fs::write(root.join("witaj.mp3"), "mp3").unwrap();
        std::fs::write(root.join("hello_en.mp3"), "mp3").unwrap();
        std::fs::write(root.join("postrowy_intro.mp3"), "mp3").unwrap();

        let parser = IosTopicPerFile::new(root);
        let mut assets = AssetManifest::new();
        let content = parser.parse(&mut assets).unwrap();

        assert_eq!(content.topics.len(), 2);
        let greetings = &content.topics[0];
        assert_eq!(greetings.name_native, "Greetings");
        assert_eq!(greetings.name_sorbian, "Postrowy");
        assert_eq!(greetings.audio_intro.as_deref(), Some("audio/postrowy_intro.mp3"));
        assert_eq!(content.topics[1].name_native, "Weather");
        assert_eq!(content.topics[1].name_sorbian, "Wjedro");
        assert!(content.vocabulary_by_topic.is_empty());
        assert!(content.hundred_seconds.is_empty());

        let phrases = &content.phrases_by_topic[&greetings.id];
        assert_eq!(phrases.len(), 3);
        assert_eq!(phrases[0].native, "Hello");
        assert_eq!(phrases[0].audio_native.as_deref(), Some("audio/hello_en.mp3"));
        assert_eq!(phrases[0].audio_sorbian.as_deref(), Some("audio/witaj.mp3"));
        assert_eq!(phrases[1].item_type, PhraseType::Separator);
        assert_eq!(phrases[2].native, "Good evening");
        assert_eq!(phrases[2].audio_sorbian, None);
        assert_eq!(phrases[2].info_text.as_deref(), Some("polite"));
    }

    #[test]
    fn test_unnamed_topic_gets_placeholder() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("topic1.xml"),
            "<topic><phrases><phrase><englishText>Yes</englishText></phrase></phrases></topic>",
        )
        .unwrap();

        let content = IosTopicPerFile::new(temp.path())
            .parse(&mut AssetManifest::new())
            .unwrap();
        assert_eq!(content.topics[0].name_native, "Topic 1");
        assert_eq!(content.phrases_by_topic[&content.topics[0].id].len(), 1);
    }
}
