//! Logical asset name resolution and deduplication.
//!
//! A logical name is namespaced by category (`audio/mama.mp3`,
//! `images/mother.png`, `icons/family.png`, `hundred/market.png`). The
//! manifest only records where each asset was found; copying happens once,
//! at build time, from the recorded source path.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

/// Category of a media asset, which fixes its namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    Audio,
    Image,
    Icon,
    Hundred,
}

impl AssetCategory {
    pub fn namespace(&self) -> &'static str {
        match self {
            AssetCategory::Audio => "audio",
            AssetCategory::Image => "images",
            AssetCategory::Icon => "icons",
            AssetCategory::Hundred => "hundred",
        }
    }

    /// Extensions tried when a legacy reference omits one
    pub fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            AssetCategory::Audio => &["mp3", "ogg", "m4a", "wav"],
            AssetCategory::Image | AssetCategory::Icon | AssetCategory::Hundred => {
                &["png", "jpg", "jpeg", "webp"]
            }
        }
    }
}

/// One resolved asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetEntry {
    pub logical_name: String,
    /// Absolute location in the legacy source tree
    pub source: PathBuf,
    pub bytes: u64,
    /// Location relative to the pack directory
    pub relative_path: String,
}

/// Registry of every asset referenced by one conversion run
#[derive(Debug, Default)]
pub struct AssetManifest {
    entries: BTreeMap<String, AssetEntry>,
    unresolved: BTreeSet<String>,
}

impl AssetManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a logical name against candidate source roots, in order.
    ///
    /// Already registered names are returned from the cache without touching
    /// the filesystem. When no root holds a regular file at the de-namespaced
    /// path, a warning is logged and `None` is returned; the caller leaves
    /// the referencing field unset.
    pub fn resolve(&mut self, logical_name: &str, roots: &[PathBuf]) -> Option<&AssetEntry> {
        if self.lookup(logical_name, roots) {
            return self.entries.get(logical_name);
        }

        warn!(logical_name, "Asset not found in any source root");
        self.unresolved.insert(logical_name.to_string());
        None
    }

    /// Resolve the first of several spellings of the same reference.
    ///
    /// Used for legacy references without an extension, where each default
    /// extension is a candidate. Logs a single warning when none resolves.
    pub fn resolve_first(&mut self, candidates: &[String], roots: &[PathBuf]) -> Option<String> {
        if let Some(found) = self.find_first(candidates, roots) {
            return Some(found);
        }

        let first = candidates.first()?;
        warn!(logical_name = %first, "Asset not found in any source root");
        self.unresolved.insert(first.clone());
        None
    }

    /// Like [`resolve_first`](Self::resolve_first), but a miss is neither
    /// logged nor recorded as unresolved. For optional conventional names.
    pub fn find_first(&mut self, candidates: &[String], roots: &[PathBuf]) -> Option<String> {
        candidates
            .iter()
            .find(|candidate| self.lookup(candidate, roots))
            .cloned()
    }

    /// Look up without logging; true when the name is (now) registered
    fn lookup(&mut self, logical_name: &str, roots: &[PathBuf]) -> bool {
        if self.entries.contains_key(logical_name) {
            return true;
        }

        let relative = denamespace(logical_name);
        if relative.is_empty() {
            return false;
        }

        for root in roots {
            let path = root.join(relative);
            let Ok(metadata) = std::fs::metadata(&path) else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            debug!(logical_name, source = %path.display(), "Resolved asset");
            let source = path.canonicalize().unwrap_or(path);
            self.entries.insert(
                logical_name.to_string(),
                AssetEntry {
                    logical_name: logical_name.to_string(),
                    source,
                    bytes: metadata.len(),
                    relative_path: output_path(logical_name),
                },
            );
            return true;
        }

        false
    }

    pub fn get(&self, logical_name: &str) -> Option<&AssetEntry> {
        self.entries.get(logical_name)
    }

    /// All entries, ordered by logical name
    pub fn entries(&self) -> impl Iterator<Item = &AssetEntry> {
        self.entries.values()
    }

    /// Logical names that could not be resolved
    pub fn unresolved(&self) -> &BTreeSet<String> {
        &self.unresolved
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total bytes of all resolved assets
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|e| e.bytes).sum()
    }
}

/// Strip the namespace segment: `hundred/drawable-hdpi/x.png` -> `drawable-hdpi/x.png`
fn denamespace(logical_name: &str) -> &str {
    match logical_name.split_once('/') {
        Some((_, rest)) => rest,
        None => logical_name,
    }
}

/// Pack-relative output path: the namespace plus the file name, with any
/// intermediate source directories (`drawable-xhdpi/` and the like) dropped.
pub fn output_path(logical_name: &str) -> String {
    let file_name = Path::new(logical_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match logical_name.split_once('/') {
        Some((namespace, _)) => format!("{}/{}", namespace, file_name),
        None => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &[u8]) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_output_path_flattens_variants() {
        assert_eq!(output_path("hundred/drawable-hdpi/market.png"), "hundred/market.png");
        assert_eq!(output_path("audio/mama.mp3"), "audio/mama.mp3");
        assert_eq!(output_path("loose.png"), "loose.png");
    }

    #[test]
    fn test_resolve_searches_roots_in_order() {
        let temp = TempDir::new().unwrap();
        let raw = temp.path().join("res/raw");
        let audio = temp.path().join("audio");
        write(&raw, "mama.mp3", b"first");
        write(&audio, "mama.mp3", b"second root");

        let mut manifest = AssetManifest::new();
        let entry = manifest
            .resolve("audio/mama.mp3", &[raw.clone(), audio.clone()])
            .unwrap();

        assert!(entry.source.ends_with("res/raw/mama.mp3"));
        assert_eq!(entry.bytes, 5);
        assert_eq!(entry.relative_path, "audio/mama.mp3");
    }

    #[test]
    fn test_resolve_is_cached() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "mama.mp3", b"abc");
        let roots = vec![temp.path().to_path_buf()];

        let mut manifest = AssetManifest::new();
        let first = manifest.resolve("audio/mama.mp3", &roots).cloned().unwrap();

        // Removing the file must not matter once registered
        std::fs::remove_file(temp.path().join("mama.mp3")).unwrap();
        let second = manifest.resolve("audio/mama.mp3", &roots).cloned().unwrap();

        assert_eq!(first, second);
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn test_missing_asset_is_recorded() {
        let temp = TempDir::new().unwrap();
        let mut manifest = AssetManifest::new();

        assert!(manifest
            .resolve("audio/missing.mp3", &[temp.path().to_path_buf()])
            .is_none());
        assert!(manifest.unresolved().contains("audio/missing.mp3"));
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_directories_are_not_assets() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("mama.mp3")).unwrap();

        let mut manifest = AssetManifest::new();
        assert!(manifest
            .resolve("audio/mama.mp3", &[temp.path().to_path_buf()])
            .is_none());
    }

    #[test]
    fn test_resolve_first_candidate() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "mama.ogg", b"ogg");
        let roots = vec![temp.path().to_path_buf()];

        let mut manifest = AssetManifest::new();
        let candidates = vec!["audio/mama.mp3".to_string(), "audio/mama.ogg".to_string()];

        assert_eq!(
            manifest.resolve_first(&candidates, &roots),
            Some("audio/mama.ogg".to_string())
        );
        assert!(manifest.unresolved().is_empty());
    }

    #[test]
    fn test_find_first_miss_is_silent() {
        let temp = TempDir::new().unwrap();
        let roots = vec![temp.path().to_path_buf()];
        let candidates = vec!["hundred/hundredsec_slide_1.jpg".to_string()];

        let mut manifest = AssetManifest::new();
        assert_eq!(manifest.find_first(&candidates, &roots), None);
        assert!(manifest.unresolved().is_empty());
    }
}
