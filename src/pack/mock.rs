//! Built-in fixture pack used as the development fallback.
//!
//! The records are fixed; media is picked up from an optional asset
//! directory (`<dir>/audio`, `<dir>/images` or `<dir>` itself). Without one
//! the pack carries text only.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::assets::AssetManifest;
use crate::domain::{
    stable_id, HundredSecItem, OccurrenceCounter, PhraseItem, PhraseType, Topic, TopicKind,
    TopicType, VocabItem,
};
use crate::error::Result;
use crate::legacy::{item_id, topic_id, ContentOrigin, ConversionResult};

use super::builder::{BuiltPack, PackBuilder, PackMetadata};

pub const MOCK_PACK_ID: &str = "mock-pack";

/// (German, Sorbian, image, audio)
const VOCABULARY: &[(&str, &str, &str, &str)] = &[
    ("Guten Morgen!", "Dobre ranje!", "Fotolia_46575927_S.jpg", "voc_snd_01_01s.mp3"),
    ("Guten Tag!", "Dobry dźeń!", "Fotolia_35730691_S.jpg", "voc_snd_01_02s.mp3"),
];

/// (German, Sorbian, German audio, Sorbian audio)
const PHRASES: &[(&str, &str, &str, &str)] = &[
    ("Wie geht es dir?", "Kak so maš?", "phr_01_01_de.mp3", "phr_01_01_sb.mp3"),
    ("Mir geht es gut.", "Mě so dobre dari.", "phr_01_02_de.mp3", "phr_01_02_sb.mp3"),
];

/// (name, audio, image)
const HUNDRED_SECONDS: &[(&str, &str, &str)] =
    &[("Budyšin", "hundred_01.mp3", "hundredsec_slide_1.jpg")];

pub fn mock_metadata() -> PackMetadata {
    PackMetadata::new(MOCK_PACK_ID)
        .with_display_name("Mock Pack")
        .with_content_version("mock-0.0.1")
}

/// Resolves fixture media against the optional asset directory
struct MockAssets {
    manifest: AssetManifest,
    roots: Option<Vec<PathBuf>>,
}

impl MockAssets {
    fn new(asset_dir: Option<&Path>) -> Self {
        Self {
            manifest: AssetManifest::new(),
            roots: asset_dir
                .map(|dir| vec![dir.join("audio"), dir.join("images"), dir.to_path_buf()]),
        }
    }

    fn resolve(&mut self, namespace: &str, file_name: &str) -> Option<String> {
        let roots = self.roots.as_ref()?;
        let logical_name = format!("{}/{}", namespace, file_name);
        self.manifest
            .resolve(&logical_name, roots)
            .map(|entry| entry.logical_name.clone())
    }
}

/// The fixture records as a conversion result
pub fn mock_content(asset_dir: Option<&Path>) -> ConversionResult {
    let mut assets = MockAssets::new(asset_dir);
    let mut topic_ids = OccurrenceCounter::new();

    let vocab_topic = Topic {
        id: topic_id(
            &mut topic_ids,
            TopicType::Vocabulary,
            "Begrüßung und Verabschiedung",
            "Postrowjenje a rozžohnowanje",
        ),
        topic_type: TopicType::Vocabulary,
        kind: TopicKind::Normal,
        name_native: "Begrüßung und Verabschiedung".to_string(),
        name_sorbian: "Postrowjenje a rozžohnowanje".to_string(),
        ord: 1,
        icon: assets.resolve("icons", "lektion1.png"),
        audio_intro: None,
    };

    let mut ids = OccurrenceCounter::new();
    let vocabulary: Vec<VocabItem> = VOCABULARY
        .iter()
        .enumerate()
        .map(|(i, (native, sorbian, image, audio))| VocabItem {
            id: item_id(&mut ids, "v", &vocab_topic.id, "vocabulary", native, sorbian),
            topic_id: vocab_topic.id.clone(),
            ord: i as i64 + 1,
            native: native.to_string(),
            sorbian: sorbian.to_string(),
            image: assets.resolve("images", image),
            audio_sorbian: assets.resolve("audio", audio),
            ignore_assign: false,
            ignore_write: false,
        })
        .collect();

    let phrase_topic = Topic {
        id: topic_id(&mut topic_ids, TopicType::Phrases, "Alltagssätze", "Wšědne sady"),
        topic_type: TopicType::Phrases,
        kind: TopicKind::Normal,
        name_native: "Alltagssätze".to_string(),
        name_sorbian: "Wšědne sady".to_string(),
        ord: 2,
        icon: None,
        audio_intro: None,
    };

    let mut ids = OccurrenceCounter::new();
    let phrases: Vec<PhraseItem> = PHRASES
        .iter()
        .enumerate()
        .map(|(i, (native, sorbian, audio_native, audio_sorbian))| PhraseItem {
            id: item_id(
                &mut ids,
                "p",
                &phrase_topic.id,
                PhraseType::Normal.as_str(),
                native,
                sorbian,
            ),
            topic_id: phrase_topic.id.clone(),
            ord: i as i64 + 1,
            native: native.to_string(),
            sorbian: sorbian.to_string(),
            audio_native: assets.resolve("audio", audio_native),
            audio_sorbian: assets.resolve("audio", audio_sorbian),
            item_type: PhraseType::Normal,
            info_text: None,
        })
        .collect();

    let mut ids = OccurrenceCounter::new();
    let hundred_seconds: Vec<HundredSecItem> = HUNDRED_SECONDS
        .iter()
        .enumerate()
        .map(|(i, &(name, audio, image))| {
            let index = ids.next(&[name]).to_string();
            HundredSecItem {
                id: stable_id("h", &[TopicType::HundredSeconds.as_str(), name, &index]),
                ord: i as i64 + 1,
                name: name.to_string(),
                audio: assets
                    .resolve("audio", audio)
                    .unwrap_or_else(|| format!("audio/{}", audio)),
                image: assets.resolve("hundred", image),
            }
        })
        .collect();

    debug!(assets = assets.manifest.len(), "Mock content assembled");

    let mut vocabulary_by_topic = BTreeMap::new();
    vocabulary_by_topic.insert(vocab_topic.id.clone(), vocabulary);
    let mut phrases_by_topic = BTreeMap::new();
    phrases_by_topic.insert(phrase_topic.id.clone(), phrases);

    ConversionResult {
        origin: ContentOrigin::Fixture,
        topics: vec![vocab_topic, phrase_topic],
        vocabulary_by_topic,
        phrases_by_topic,
        hundred_seconds,
        assets: assets.manifest,
    }
}

/// Build the mock pack into `output_dir`
pub fn build_mock_pack(output_dir: &Path, asset_dir: Option<&Path>) -> Result<BuiltPack> {
    PackBuilder::new(output_dir).build(&mock_content(asset_dir), &mock_metadata())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PackManifest;
    use tempfile::TempDir;

    #[test]
    fn test_mock_content_without_assets() {
        let content = mock_content(None);

        assert_eq!(content.origin, ContentOrigin::Fixture);
        assert_eq!(content.topics.len(), 2);
        assert_eq!(content.vocabulary_count(), 2);
        assert_eq!(content.phrase_count(), 2);
        assert_eq!(content.hundred_seconds.len(), 1);
        assert_eq!(content.hundred_seconds[0].audio, "audio/hundred_01.mp3");
        assert!(content.assets.is_empty());
        assert!(content.unresolved_assets().is_empty());

        let modules = content.modules();
        assert!(modules.vocabulary && modules.phrases && modules.hundred_seconds);
    }

    #[test]
    fn test_build_mock_pack_with_assets() {
        let assets = TempDir::new().unwrap();
        std::fs::create_dir_all(assets.path().join("audio")).unwrap();
        std::fs::create_dir_all(assets.path().join("images")).unwrap();
        std::fs::write(assets.path().join("audio/voc_snd_01_01s.mp3"), "mp3").unwrap();
        std::fs::write(assets.path().join("images/Fotolia_46575927_S.jpg"), "jpg").unwrap();

        let out = TempDir::new().unwrap();
        let built = build_mock_pack(out.path(), Some(assets.path())).unwrap();

        assert_eq!(built.archive, out.path().join("mock-pack.zip"));
        assert!(out.path().join("mock-pack-hash.sha256").is_file());
        assert_eq!(built.report.assets_copied, 2);
        assert!(built.pack_dir.join("audio/voc_snd_01_01s.mp3").is_file());

        let manifest = PackManifest::load(&built.pack_dir).unwrap();
        assert_eq!(manifest.pack_id, MOCK_PACK_ID);
        assert_eq!(manifest.display_name, "Mock Pack");
        assert_eq!(manifest.content_version, "mock-0.0.1");
    }
}
