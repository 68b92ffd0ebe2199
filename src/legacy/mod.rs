//! Conversion of legacy XML content into canonical records.
//!
//! Two incompatible legacy layouts exist:
//!
//! ```text
//! Android multi-file                     iOS topic-per-file
//! <app>/
//! ├── res/raw, res/drawable*             <root>/
//! └── <root>/                            ├── topic1.xml
//!     ├── vocabulary/*.xml               ├── topic2.xml
//!     ├── vocabulary/images, icons       └── *.mp3
//!     ├── phrases/*.xml
//!     └── in_hundred_seconds.xml (optional)
//! ```
//!
//! [`detect_layout`] inspects the structure and returns a [`SourceLayout`];
//! each variant owns one [`LegacyParser`]. [`convert`] runs the parser and
//! applies the topic kind policy afterwards.

pub mod android;
pub mod ios;
pub mod kind;
pub mod text;
pub mod xml;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::assets::{AssetCategory, AssetManifest};
use crate::domain::{
    stable_id, HundredSecItem, Modules, OccurrenceCounter, PhraseItem, Topic, TopicType, VocabItem,
};
use crate::error::{PackError, Result};

pub use android::AndroidMultiFile;
pub use ios::IosTopicPerFile;
pub use kind::{classify_topic, infer_kind, Dialect};

/// Recognized legacy source layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLayout {
    /// Separate vocabulary/phrases/hundred-seconds files, German/Sorbian
    AndroidMultiFile,
    /// One flat phrase list per `topicN.xml`, English/Sorbian
    IosTopicPerFile,
}

impl std::fmt::Display for SourceLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLayout::AndroidMultiFile => write!(f, "android-multi-file"),
            SourceLayout::IosTopicPerFile => write!(f, "ios-topic-per-file"),
        }
    }
}

/// Where the records of a [`ConversionResult`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentOrigin {
    Legacy(SourceLayout),
    /// Built-in fixture records (the development mock pack)
    Fixture,
}

impl std::fmt::Display for ContentOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentOrigin::Legacy(layout) => write!(f, "{}", layout),
            ContentOrigin::Fixture => write!(f, "fixture"),
        }
    }
}

/// Inspect a legacy root and decide which layout it uses
pub fn detect_layout(root: &Path) -> Result<SourceLayout> {
    if !root.is_dir() {
        return Err(PackError::LegacyRead {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    if root.join("phrases").is_dir() {
        return Ok(SourceLayout::AndroidMultiFile);
    }

    if !ios::topic_files(root)?.is_empty() {
        return Ok(SourceLayout::IosTopicPerFile);
    }

    Err(PackError::UnsupportedLayout {
        root: root.to_path_buf(),
    })
}

/// Records produced by one layout parser
#[derive(Debug, Default)]
pub struct LegacyContent {
    pub topics: Vec<Topic>,
    pub vocabulary_by_topic: BTreeMap<String, Vec<VocabItem>>,
    pub phrases_by_topic: BTreeMap<String, Vec<PhraseItem>>,
    pub hundred_seconds: Vec<HundredSecItem>,
}

/// One legacy layout's parse routine
pub trait LegacyParser {
    fn layout(&self) -> SourceLayout;

    /// Parse every source file, registering referenced media in `assets`
    fn parse(&self, assets: &mut AssetManifest) -> Result<LegacyContent>;
}

/// Source directories searched per asset category, in priority order
#[derive(Debug, Clone, Default)]
pub struct AssetRoots {
    audio: Vec<PathBuf>,
    images: Vec<PathBuf>,
    icons: Vec<PathBuf>,
    hundred: Vec<PathBuf>,
}

impl AssetRoots {
    /// Roots for the Android layout.
    ///
    /// The legacy content folder sits next to the app's `res/` directory,
    /// so audio comes from `<root>/../res/raw` and hundred-seconds slides
    /// from `<root>/../res/drawable`. Vocabulary images and icons live under
    /// `vocabulary/`. Roots inside `<root>` are fallbacks; drawable density
    /// variants are searched highest density first.
    pub fn android(root: &Path) -> Self {
        let app_res = root.join("..").join("res");
        let own_res = root.join("res");
        let vocabulary = root.join("vocabulary");

        let mut drawables = drawable_dirs(&app_res);
        drawables.extend(drawable_dirs(&own_res));

        let audio = vec![
            app_res.join("raw"),
            own_res.join("raw"),
            root.join("audio"),
            root.join("sounds"),
            root.to_path_buf(),
        ];

        let mut images = vec![vocabulary.join("images"), root.join("images")];
        images.extend(drawables.iter().cloned());

        let mut icons = vec![vocabulary.join("icons"), root.join("icons")];
        icons.extend(drawables.iter().cloned());

        let mut hundred = vec![app_res.join("drawable"), root.join("hundred")];
        hundred.extend(drawables);

        Self {
            audio,
            images,
            icons,
            hundred,
        }
    }

    /// Roots for the iOS layout; sounds sit next to the topic files
    pub fn ios(root: &Path) -> Self {
        Self {
            audio: vec![root.to_path_buf(), root.join("audio"), root.join("sounds")],
            images: vec![root.join("images"), root.to_path_buf()],
            icons: vec![root.join("icons"), root.join("images"), root.to_path_buf()],
            hundred: Vec::new(),
        }
    }

    pub fn for_category(&self, category: AssetCategory) -> &[PathBuf] {
        match category {
            AssetCategory::Audio => &self.audio,
            AssetCategory::Image => &self.images,
            AssetCategory::Icon => &self.icons,
            AssetCategory::Hundred => &self.hundred,
        }
    }

    /// Resolve a raw legacy reference to a logical asset name.
    ///
    /// Blank and placeholder references yield `None` silently; references
    /// that cannot be found are logged by the manifest and yield `None`.
    pub fn resolve(
        &self,
        assets: &mut AssetManifest,
        raw: Option<&str>,
        category: AssetCategory,
    ) -> Option<String> {
        let raw = raw.filter(|r| !text::is_placeholder(r))?;
        let candidates = text::asset_candidates(raw, category);
        assets.resolve_first(&candidates, self.for_category(category))
    }

    /// Resolve like [`resolve`](Self::resolve), but keep the primary logical
    /// name when nothing is found. For fields that cannot be left empty.
    pub fn resolve_or_logical(
        &self,
        assets: &mut AssetManifest,
        raw: Option<&str>,
        category: AssetCategory,
    ) -> Option<String> {
        let raw = raw.filter(|r| !text::is_placeholder(r))?;
        let candidates = text::asset_candidates(raw, category);
        let primary = candidates.first().cloned();
        assets
            .resolve_first(&candidates, self.for_category(category))
            .or(primary)
    }

    /// First conventional name that exists, looked up without warnings
    pub fn find_conventional(
        &self,
        assets: &mut AssetManifest,
        names: &[String],
        category: AssetCategory,
    ) -> Option<String> {
        let candidates: Vec<String> = names
            .iter()
            .flat_map(|name| text::asset_candidates(name, category))
            .collect();
        assets.find_first(&candidates, self.for_category(category))
    }
}

const DENSITY_ORDER: &[&str] = &["xxxhdpi", "xxhdpi", "xhdpi", "hdpi", "mdpi", "ldpi"];

/// `res/drawable*` directories, densest variant first, plain `drawable` last
fn drawable_dirs(res: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/drawable*", glob::Pattern::escape(&res.to_string_lossy()));
    let mut dirs: Vec<PathBuf> = glob::glob(&pattern)
        .map(|paths| paths.filter_map(|p| p.ok()).filter(|p| p.is_dir()).collect())
        .unwrap_or_default();

    dirs.sort_by_key(|dir| {
        let name = text::file_name(dir);
        let rank = DENSITY_ORDER
            .iter()
            .position(|d| name.ends_with(&format!("-{}", d)))
            .unwrap_or(DENSITY_ORDER.len());
        (rank, name)
    });
    dirs
}

/// XML files directly inside a directory, sorted by numeric token
pub(crate) fn xml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| PackError::LegacyRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_xml = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("xml"))
            .unwrap_or(false);
        if is_xml && path.is_file() {
            files.push(path);
        }
    }

    text::sort_by_numeric_token(&mut files);
    Ok(files)
}

/// Topic id from its type and names; `counter` disambiguates same-named topics
pub(crate) fn topic_id(
    counter: &mut OccurrenceCounter,
    topic_type: TopicType,
    name_native: &str,
    name_sorbian: &str,
) -> String {
    let index = counter
        .next(&[topic_type.as_str(), name_native, name_sorbian])
        .to_string();
    stable_id("t", &[topic_type.as_str(), name_native, name_sorbian, &index])
}

/// Item id from the owning topic, record type and texts
pub(crate) fn item_id(
    counter: &mut OccurrenceCounter,
    prefix: &str,
    topic_id: &str,
    record_type: &str,
    native: &str,
    sorbian: &str,
) -> String {
    let index = counter.next(&[record_type, native, sorbian]).to_string();
    stable_id(prefix, &[topic_id, record_type, native, sorbian, &index])
}

/// Options for a conversion run
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub dialect: Dialect,
}

/// Everything one conversion run produces
#[derive(Debug)]
pub struct ConversionResult {
    pub origin: ContentOrigin,
    pub topics: Vec<Topic>,
    pub vocabulary_by_topic: BTreeMap<String, Vec<VocabItem>>,
    pub phrases_by_topic: BTreeMap<String, Vec<PhraseItem>>,
    pub hundred_seconds: Vec<HundredSecItem>,
    pub assets: AssetManifest,
}

impl ConversionResult {
    pub fn vocabulary_count(&self) -> usize {
        self.vocabulary_by_topic.values().map(Vec::len).sum()
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases_by_topic.values().map(Vec::len).sum()
    }

    /// Module availability: a module is present when its collection is non-empty
    pub fn modules(&self) -> Modules {
        Modules {
            vocabulary: self.vocabulary_count() > 0,
            phrases: self.phrase_count() > 0,
            hundred_seconds: !self.hundred_seconds.is_empty(),
        }
    }

    /// Logical names that were referenced but not found
    pub fn unresolved_assets(&self) -> &BTreeSet<String> {
        self.assets.unresolved()
    }
}

fn parser_for(layout: SourceLayout, root: &Path) -> Box<dyn LegacyParser> {
    match layout {
        SourceLayout::AndroidMultiFile => Box::new(AndroidMultiFile::new(root)),
        SourceLayout::IosTopicPerFile => Box::new(IosTopicPerFile::new(root)),
    }
}

/// Convert a legacy source tree into canonical records
#[instrument(skip(root, options), fields(root = %root.display()))]
pub fn convert(root: &Path, options: ConvertOptions) -> Result<ConversionResult> {
    let parser = parser_for(detect_layout(root)?, root);
    let layout = parser.layout();
    info!(%layout, "Detected legacy layout");

    let mut assets = AssetManifest::new();
    let mut content = parser.parse(&mut assets)?;

    for topic in &mut content.topics {
        let (kind, name_sorbian) =
            classify_topic(&topic.name_native, &topic.name_sorbian, options.dialect);
        if kind != topic.kind {
            debug!(topic = %topic.name_native, kind = kind.as_str(), "Classified topic");
        }
        topic.kind = kind;
        topic.name_sorbian = name_sorbian;
    }

    let result = ConversionResult {
        origin: ContentOrigin::Legacy(layout),
        topics: content.topics,
        vocabulary_by_topic: content.vocabulary_by_topic,
        phrases_by_topic: content.phrases_by_topic,
        hundred_seconds: content.hundred_seconds,
        assets,
    };

    info!(
        topics = result.topics.len(),
        vocabulary = result.vocabulary_count(),
        phrases = result.phrase_count(),
        hundred_seconds = result.hundred_seconds.len(),
        assets = result.assets.len(),
        unresolved = result.unresolved_assets().len(),
        "Conversion complete"
    );

    Ok(result)
}
