//! Android-style multi-file layout (German/Sorbian).
//!
//! Vocabulary topics carry their data in attributes:
//!
//! ```xml
//! <topic nameGerman=".." nameSorbian=".." soundSorbian=".." icon="..">
//!   <vocabulary>
//!     <vocable textGerman=".." textSorbian=".." soundSorbian=".." img=".."
//!              ignoreAssign="true" ignoreWrite="false"/>
//!   </vocabulary>
//! </topic>
//! ```
//!
//! Phrase topics mostly use child elements (`topicNameGerman`,
//! `topicNameSorbian`, `topicSoundSorbian`, or the attribute forms) and
//! `<phrases><phrase type=".."><germanText/><sorbianText/><germanSound/>
//! <sorbianSound/><infoText/></phrase></phrases>`. The optional
//! `in_hundred_seconds.xml` holds `<inHundredSeconds><item><name/><sound/>
//! <image/></item></inHundredSeconds>`. Sound references are bare names
//! without extension.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::assets::{AssetCategory, AssetManifest};
use crate::domain::{
    stable_id, HundredSecItem, OccurrenceCounter, PhraseItem, PhraseType, Topic, TopicKind,
    TopicType, VocabItem,
};
use crate::error::Result;

use super::text::{normalize_text, parse_bool};
use super::xml::{self, XmlElement};
use super::{item_id, topic_id, xml_files, AssetRoots, LegacyContent, LegacyParser, SourceLayout};

const TOPIC_NATIVE: &[&str] = &["topicNameGerman", "nameGerman", "name_de"];
const TOPIC_SORBIAN: &[&str] = &["topicNameSorbian", "nameSorbian", "name_hsb", "name_dsb"];
const TOPIC_SOUND: &[&str] = &["topicSoundSorbian", "soundSorbian", "audio"];

const VOCAB_NATIVE: &[&str] = &["textGerman", "de"];
const VOCAB_SORBIAN: &[&str] = &["textSorbian", "hsb", "dsb"];

const PHRASE_NATIVE: &[&str] = &["germanText", "de"];
const PHRASE_SORBIAN: &[&str] = &["sorbianText", "hsb", "dsb"];
const PHRASE_SOUND_NATIVE: &[&str] = &["germanSound", "audio_de"];
const PHRASE_SOUND_SORBIAN: &[&str] = &["sorbianSound", "audio_hsb", "audio_dsb"];

const HUNDRED_FILES: &[&str] = &[
    "in_hundred_seconds.xml",
    "hundred_seconds.xml",
    "hundredseconds.xml",
];

/// Read a field from a child element or attribute and normalize it
fn field(el: &XmlElement, names: &[&str]) -> String {
    normalize_text(el.value_any(names).unwrap_or_default())
}

pub struct AndroidMultiFile {
    root: PathBuf,
    roots: AssetRoots,
}

impl AndroidMultiFile {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            roots: AssetRoots::android(root),
        }
    }

    fn topic(
        &self,
        el: &XmlElement,
        topic_type: TopicType,
        ord: i64,
        ids: &mut OccurrenceCounter,
        assets: &mut AssetManifest,
    ) -> Topic {
        let mut name_native = field(el, TOPIC_NATIVE);
        if name_native.is_empty() {
            name_native = match topic_type {
                TopicType::Phrases => format!("Phrases {}", ord),
                _ => format!("Vocabulary {}", ord),
            };
            debug!(name = %name_native, "Topic has no German name, using placeholder");
        }
        let name_sorbian = field(el, TOPIC_SORBIAN);

        Topic {
            id: topic_id(ids, topic_type, &name_native, &name_sorbian),
            topic_type,
            kind: TopicKind::Normal,
            ord,
            icon: self
                .roots
                .resolve(assets, el.value_any(&["icon"]), AssetCategory::Icon),
            audio_intro: self
                .roots
                .resolve(assets, el.value_any(TOPIC_SOUND), AssetCategory::Audio),
            name_native,
            name_sorbian,
        }
    }

    fn vocabulary(
        &self,
        el: &XmlElement,
        topic_id: &str,
        assets: &mut AssetManifest,
    ) -> Vec<VocabItem> {
        let mut ids = OccurrenceCounter::new();
        let mut items = Vec::new();

        for vocable in el.items("vocabulary", &["vocable"]) {
            let native = field(vocable, VOCAB_NATIVE);
            let sorbian = field(vocable, VOCAB_SORBIAN);

            items.push(VocabItem {
                id: item_id(&mut ids, "v", topic_id, "vocabulary", &native, &sorbian),
                topic_id: topic_id.to_string(),
                ord: items.len() as i64 + 1,
                image: self.roots.resolve(
                    assets,
                    vocable.value_any(&["img", "image"]),
                    AssetCategory::Image,
                ),
                audio_sorbian: self.roots.resolve(
                    assets,
                    vocable.value_any(&["soundSorbian", "audio"]),
                    AssetCategory::Audio,
                ),
                ignore_assign: parse_bool(vocable.value_any(&["ignoreAssign", "ignore_assign"])),
                ignore_write: parse_bool(vocable.value_any(&["ignoreWrite", "ignore_write"])),
                native,
                sorbian,
            });
        }

        items
    }

    fn phrases(
        &self,
        el: &XmlElement,
        topic_id: &str,
        assets: &mut AssetManifest,
    ) -> Vec<PhraseItem> {
        let mut ids = OccurrenceCounter::new();
        let mut items = Vec::new();

        for phrase in el.items("phrases", &["phrase", "separator"]) {
            let separator =
                phrase.name == "separator" || phrase.attr("type") == Some("separator");
            let item_type = if separator {
                PhraseType::Separator
            } else {
                PhraseType::Normal
            };
            let native = field(phrase, PHRASE_NATIVE);
            let sorbian = field(phrase, PHRASE_SORBIAN);
            let info_text = Some(field(phrase, &["infoText", "info"])).filter(|t| !t.is_empty());

            items.push(PhraseItem {
                id: item_id(&mut ids, "p", topic_id, item_type.as_str(), &native, &sorbian),
                topic_id: topic_id.to_string(),
                ord: items.len() as i64 + 1,
                audio_native: self.roots.resolve(
                    assets,
                    phrase.value_any(PHRASE_SOUND_NATIVE),
                    AssetCategory::Audio,
                ),
                audio_sorbian: self.roots.resolve(
                    assets,
                    phrase.value_any(PHRASE_SOUND_SORBIAN),
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

    /// Hundred-seconds slides.
    ///
    /// Audio is mandatory in the schema, so an item whose sound cannot be
    /// found keeps its logical name (`audio/<sound>.mp3`) rather than being
    /// dropped. An item without `<image>` picks up `hundredsec_slide_<n>`
    /// (jpg, then png) when such a drawable exists.
    fn hundred_seconds(&self, assets: &mut AssetManifest) -> Result<Vec<HundredSecItem>> {
        let Some(path) = HUNDRED_FILES
            .iter()
            .map(|name| self.root.join(name))
            .find(|p| p.is_file())
        else {
            warn!(root = %self.root.display(), "No hundred-seconds file, module left empty");
            return Ok(Vec::new());
        };

        let doc = xml::parse_file(&path)?;
        let mut ids = OccurrenceCounter::new();
        let mut items = Vec::new();

        let entries = doc
            .children
            .iter()
            .filter(|c| matches!(c.name.as_str(), "item" | "entry"));
        for (i, item) in entries.enumerate() {
            let position = i + 1;
            let mut name = field(item, &["name"]);
            if name.is_empty() {
                name = format!("Hundred {}", position);
            }

            let audio = self
                .roots
                .resolve_or_logical(
                    assets,
                    item.value_any(&["sound", "audio"]),
                    AssetCategory::Audio,
                )
                .unwrap_or_default();
            if audio.is_empty() {
                warn!(item = %name, "Hundred-seconds item has no sound reference");
            }

            let image = match item.value_any(&["image"]).filter(|i| !i.trim().is_empty()) {
                Some(image) => self.roots.resolve(assets, Some(image), AssetCategory::Hundred),
                None => self.roots.find_conventional(
                    assets,
                    &[
                        format!("hundredsec_slide_{}.jpg", position),
                        format!("hundredsec_slide_{}.png", position),
                    ],
                    AssetCategory::Hundred,
                ),
            };

            let index = ids.next(&[&name]).to_string();
            items.push(HundredSecItem {
                id: stable_id("h", &[TopicType::HundredSeconds.as_str(), &name, &index]),
                ord: position as i64,
                image,
                name,
                audio,
            });
        }

        Ok(items)
    }
}

/// `<topic>` elements of a document; a document without any is one topic
fn topic_elements(doc: &XmlElement) -> Vec<&XmlElement> {
    let topics = doc.self_or_children(&["topic"]);
    if topics.is_empty() {
        vec![doc]
    } else {
        topics
    }
}

impl LegacyParser for AndroidMultiFile {
    fn layout(&self) -> SourceLayout {
        SourceLayout::AndroidMultiFile
    }

    fn parse(&self, assets: &mut AssetManifest) -> Result<LegacyContent> {
        let mut content = LegacyContent::default();
        let mut topic_ids = OccurrenceCounter::new();
        let mut ord = 0;

        for path in xml_files(&self.root.join("vocabulary"))? {
            debug!(file = %path.display(), "Converting vocabulary file");
            let doc = xml::parse_file(&path)?;
            for el in topic_elements(&doc) {
                ord += 1;
                let topic = self.topic(el, TopicType::Vocabulary, ord, &mut topic_ids, assets);
                let items = self.vocabulary(el, &topic.id, assets);
                content.vocabulary_by_topic.insert(topic.id.clone(), items);
                content.topics.push(topic);
            }
        }

        for path in xml_files(&self.root.join("phrases"))? {
            debug!(file = %path.display(), "Converting phrase file");
            let doc = xml::parse_file(&path)?;
            for el in topic_elements(&doc) {
                ord += 1;
                let topic = self.topic(el, TopicType::Phrases, ord, &mut topic_ids, assets);
                let items = self.phrases(el, &topic.id, assets);
                content.phrases_by_topic.insert(topic.id.clone(), items);
                content.topics.push(topic);
            }
        }

        content.hundred_seconds = self.hundred_seconds(assets)?;
        Ok(content)
    }
}
