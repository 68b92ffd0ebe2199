//! Assemble a content pack from a conversion result.
//!
//! Output layout for pack id `t1` under `<out>`:
//!
//! ```text
//! <out>/
//! ├── t1/
//! │   ├── pack.json
//! │   ├── content.db
//! │   ├── audio/… images/… icons/… hundred/…
//! ├── t1.zip              (single root entry: t1/)
//! └── t1-hash.sha256      (hex digest of t1.zip + newline)
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::assets::AssetEntry;
use crate::domain::{PackManifest, PhraseItem, VocabItem, DEFAULT_CONTENT_FILE};
use crate::error::{PackError, Result};
use crate::legacy::ConversionResult;

use super::archive::{self, archive_file_name, hash_file_name};
use super::schema;

/// Identity written into `pack.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackMetadata {
    pub pack_id: String,
    pub display_name: String,
    pub content_version: String,
}

impl PackMetadata {
    /// Metadata whose display name defaults to the pack id
    pub fn new(pack_id: impl Into<String>) -> Self {
        let pack_id = pack_id.into();
        Self {
            display_name: pack_id.clone(),
            pack_id,
            content_version: "1".to_string(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_content_version(mut self, content_version: impl Into<String>) -> Self {
        self.content_version = content_version.into();
        self
    }
}

/// Pack ids become directory and file names, so they are kept to a safe alphabet
pub fn validate_pack_id(pack_id: &str) -> Result<()> {
    let valid = !pack_id.is_empty()
        && !pack_id.starts_with('.')
        && pack_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(PackError::InvalidPackId(pack_id.to_string()))
    }
}

/// An asset that was resolved during conversion but could not be copied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetCopyFailure {
    pub logical_name: String,
    pub reason: String,
}

/// Counts of what went into a pack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub topics: usize,
    pub vocabulary: usize,
    pub phrases: usize,
    pub hundred_seconds: usize,
    pub assets_copied: usize,
    pub bytes_copied: u64,
    pub copy_failures: Vec<AssetCopyFailure>,
}

/// Durable artifacts of one build
#[derive(Debug, Clone)]
pub struct BuiltPack {
    pub pack_dir: PathBuf,
    pub archive: PathBuf,
    pub hash_file: PathBuf,
    pub hash: String,
    pub report: BuildReport,
}

/// Writes packs into one output directory
#[derive(Debug, Clone)]
pub struct PackBuilder {
    output_dir: PathBuf,
}

impl PackBuilder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build the pack directory, archive and hash sidecar.
    ///
    /// An existing pack directory of the same id is replaced. Assets that
    /// fail to copy are reported in [`BuildReport::copy_failures`] and left
    /// out of the `assets` table; they never fail the build.
    #[instrument(skip(self, conversion, metadata), fields(pack_id = %metadata.pack_id))]
    pub fn build(&self, conversion: &ConversionResult, metadata: &PackMetadata) -> Result<BuiltPack> {
        validate_pack_id(&metadata.pack_id)?;

        let pack_dir = self.output_dir.join(&metadata.pack_id);
        if pack_dir.exists() {
            debug!(path = %pack_dir.display(), "Replacing existing pack directory");
            std::fs::remove_dir_all(&pack_dir)?;
        }
        std::fs::create_dir_all(&pack_dir)?;

        let mut report = BuildReport {
            topics: conversion.topics.len(),
            vocabulary: conversion.vocabulary_count(),
            phrases: conversion.phrase_count(),
            hundred_seconds: conversion.hundred_seconds.len(),
            ..BuildReport::default()
        };

        let copied = copy_assets(conversion.assets.entries(), &pack_dir, &mut report);
        write_database(conversion, &copied, &pack_dir.join(DEFAULT_CONTENT_FILE))?;

        let manifest = PackManifest {
            pack_id: metadata.pack_id.clone(),
            display_name: metadata.display_name.clone(),
            content_version: metadata.content_version.clone(),
            modules: conversion.modules(),
            content_file: DEFAULT_CONTENT_FILE.to_string(),
        };
        manifest.save(&pack_dir)?;

        let archive = self.output_dir.join(archive_file_name(&metadata.pack_id));
        if archive.exists() {
            std::fs::remove_file(&archive)?;
        }
        archive::zip_directory(&pack_dir, &metadata.pack_id, &archive)?;

        let hash = archive::sha256_file(&archive)?;
        let hash_file = self.output_dir.join(hash_file_name(&metadata.pack_id));
        archive::write_hash_file(&hash_file, &hash)?;

        info!(
            archive = %archive.display(),
            hash = %hash,
            topics = report.topics,
            assets = report.assets_copied,
            copy_failures = report.copy_failures.len(),
            "Pack built"
        );

        Ok(BuiltPack {
            pack_dir,
            archive,
            hash_file,
            hash,
            report,
        })
    }
}

/// Copy every entry once; collect failures and continue
fn copy_assets<'a>(
    entries: impl Iterator<Item = &'a AssetEntry>,
    pack_dir: &Path,
    report: &mut BuildReport,
) -> Vec<&'a AssetEntry> {
    let mut copied = Vec::new();
    let mut claimed: HashMap<&str, &str> = HashMap::new();

    for entry in entries {
        if let Some(owner) = claimed.get(entry.relative_path.as_str()) {
            let reason = format!("output path '{}' already taken by '{}'", entry.relative_path, owner);
            warn!(logical_name = %entry.logical_name, %reason, "Asset copy skipped");
            report.copy_failures.push(AssetCopyFailure {
                logical_name: entry.logical_name.clone(),
                reason,
            });
            continue;
        }

        match copy_asset(entry, pack_dir) {
            Ok(bytes) => {
                claimed.insert(&entry.relative_path, &entry.logical_name);
                report.assets_copied += 1;
                report.bytes_copied += bytes;
                copied.push(entry);
            }
            Err(e) => {
                warn!(
                    logical_name = %entry.logical_name,
                    source = %entry.source.display(),
                    error = %e,
                    "Asset copy failed"
                );
                report.copy_failures.push(AssetCopyFailure {
                    logical_name: entry.logical_name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    copied
}

fn copy_asset(entry: &AssetEntry, pack_dir: &Path) -> std::io::Result<u64> {
    let target = pack_dir.join(&entry.relative_path);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(&entry.source, &target)
}

fn write_database(conversion: &ConversionResult, copied: &[&AssetEntry], path: &Path) -> Result<()> {
    let mut conn = Connection::open(path)?;
    schema::create_schema(&conn)?;

    let vocabulary: Vec<&VocabItem> = conversion
        .topics
        .iter()
        .filter_map(|t| conversion.vocabulary_by_topic.get(&t.id))
        .flatten()
        .collect();
    let phrases: Vec<&PhraseItem> = conversion
        .topics
        .iter()
        .filter_map(|t| conversion.phrases_by_topic.get(&t.id))
        .flatten()
        .collect();

    schema::insert_topics(&mut conn, &conversion.topics, &vocabulary, &phrases)?;
    schema::insert_hundred_seconds(&mut conn, &conversion.hundred_seconds)?;
    schema::insert_assets(&mut conn, copied.iter().copied())?;

    conn.close().map_err(|(_, e)| PackError::Database(e))?;
    debug!(path = %path.display(), "Wrote content database");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::{convert, ConvertOptions};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn legacy_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(
            root,
            "vocabulary/topic_1.xml",
            r#"<topic name_de="Familie" name_hsb="Swójba">
                 <vocable de="Mutter" hsb="mać" audio="mama.mp3"/>
                 <vocable de="Mama" hsb="mama" audio="mama.mp3"/>
               </topic>"#,
        );
        write(
            root,
            "phrases/topic_1.xml",
            r#"<topic name_de="Begrüßung" name_hsb="Postrow">
                 <phrase de="Hallo" hsb="Witaj"/>
               </topic>"#,
        );
        write(root, "res/raw/mama.mp3", "mp3-bytes");
        temp
    }

    #[test]
    fn test_validate_pack_id() {
        assert!(validate_pack_id("t1").is_ok());
        assert!(validate_pack_id("hsb-main_2").is_ok());
        assert!(validate_pack_id("").is_err());
        assert!(validate_pack_id("../evil").is_err());
        assert!(validate_pack_id(".hidden").is_err());
        assert!(validate_pack_id("with space").is_err());
    }

    #[test]
    fn test_build_writes_all_artifacts() {
        let legacy = legacy_tree();
        let out = TempDir::new().unwrap();
        let conversion = convert(legacy.path(), ConvertOptions::default()).unwrap();

        let built = PackBuilder::new(out.path())
            .build(&conversion, &PackMetadata::new("t1").with_display_name("Test"))
            .unwrap();

        assert_eq!(built.pack_dir, out.path().join("t1"));
        assert!(built.pack_dir.join("content.db").is_file());
        assert!(built.pack_dir.join("audio/mama.mp3").is_file());
        assert!(out.path().join("t1.zip").is_file());
        assert_eq!(
            std::fs::read_to_string(out.path().join("t1-hash.sha256")).unwrap(),
            format!("{}\n", built.hash)
        );

        let manifest = PackManifest::load(&built.pack_dir).unwrap();
        assert_eq!(manifest.display_name, "Test");
        assert!(manifest.modules.vocabulary);
        assert!(manifest.modules.phrases);
        assert!(!manifest.modules.hundred_seconds);

        assert_eq!(built.report.topics, 2);
        assert_eq!(built.report.vocabulary, 2);
        assert_eq!(built.report.phrases, 1);
        assert_eq!(built.report.assets_copied, 1);
        assert!(built.report.copy_failures.is_empty());
    }

    #[test]
    fn test_copy_failure_does_not_abort_build() {
        let legacy = legacy_tree();
        let out = TempDir::new().unwrap();
        let conversion = convert(legacy.path(), ConvertOptions::default()).unwrap();

        // Source vanishes between conversion and build
        std::fs::remove_file(legacy.path().join("res/raw/mama.mp3")).unwrap();

        let built = PackBuilder::new(out.path())
            .build(&conversion, &PackMetadata::new("t1"))
            .unwrap();

        assert_eq!(built.report.assets_copied, 0);
        assert_eq!(built.report.copy_failures.len(), 1);
        assert_eq!(built.report.copy_failures[0].logical_name, "audio/mama.mp3");

        let conn = Connection::open(built.pack_dir.join("content.db")).unwrap();
        let assets: i64 = conn
            .query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))
            .unwrap();
        assert_eq!(assets, 0);
    }

    #[test]
    fn test_rebuild_replaces_pack_dir() {
        let legacy = legacy_tree();
        let out = TempDir::new().unwrap();
        let conversion = convert(legacy.path(), ConvertOptions::default()).unwrap();
        let builder = PackBuilder::new(out.path());

        let first = builder.build(&conversion, &PackMetadata::new("t1")).unwrap();
        std::fs::write(first.pack_dir.join("stale.txt"), "old").unwrap();

        let second = builder.build(&conversion, &PackMetadata::new("t1")).unwrap();
        assert!(!second.pack_dir.join("stale.txt").exists());
        assert_eq!(first.hash, second.hash);
    }

    #[test]
    fn test_invalid_pack_id_is_rejected() {
        let legacy = legacy_tree();
        let out = TempDir::new().unwrap();
        let conversion = convert(legacy.path(), ConvertOptions::default()).unwrap();

        let result = PackBuilder::new(out.path()).build(&conversion, &PackMetadata::new("a/b"));
        assert!(matches!(result, Err(PackError::InvalidPackId(_))));
    }
}
