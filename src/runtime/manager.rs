//! Pack discovery, activation and asset URI resolution.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::domain::{Modules, PackManifest, MANIFEST_FILE};
use crate::error::{PackError, Result};

use super::content::PackContent;
use super::loader;

/// One discovered pack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackSummary {
    pub pack_id: String,
    pub display_name: String,
    pub content_version: String,
    pub modules: Modules,
    pub content_file: String,
    pub dir: PathBuf,
}

impl PackSummary {
    fn from_manifest(manifest: PackManifest, dir: PathBuf) -> Self {
        Self {
            pack_id: manifest.pack_id,
            display_name: manifest.display_name,
            content_version: manifest.content_version,
            modules: manifest.modules,
            content_file: manifest.content_file,
            dir,
        }
    }

    pub fn content_path(&self) -> PathBuf {
        self.dir.join(&self.content_file)
    }
}

/// Packs found by scanning pack directories once
#[derive(Debug, Clone, Default)]
pub struct PackIndex {
    packs: Vec<PackSummary>,
}

impl PackIndex {
    /// Scan each directory's immediate subdirectories for `pack.json`.
    ///
    /// Directories are scanned in order and a later pack with the same id
    /// replaces an earlier one, so pass read-only bundled locations before
    /// provisioned ones. Missing directories and unreadable manifests are
    /// skipped.
    #[instrument(skip(dirs))]
    pub fn scan(dirs: &[PathBuf]) -> Self {
        let mut index = Self::default();

        for dir in dirs {
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "Pack directory not readable, skipping");
                    continue;
                }
            };

            let mut candidates: Vec<PathBuf> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir() && !is_hidden(p) && p.join(MANIFEST_FILE).exists())
                .collect();
            candidates.sort();

            for pack_dir in candidates {
                match PackManifest::load(&pack_dir) {
                    Ok(manifest) => index.insert(PackSummary::from_manifest(manifest, pack_dir)),
                    Err(e) => warn!(
                        dir = %pack_dir.display(),
                        error = %e,
                        "Skipping pack with unreadable manifest"
                    ),
                }
            }
        }

        debug!(packs = index.packs.len(), "Pack scan complete");
        index
    }

    fn insert(&mut self, summary: PackSummary) {
        match self.packs.iter_mut().find(|p| p.pack_id == summary.pack_id) {
            Some(existing) => {
                debug!(
                    pack_id = %summary.pack_id,
                    dir = %summary.dir.display(),
                    "Pack overrides earlier location"
                );
                *existing = summary;
            }
            None => self.packs.push(summary),
        }
    }

    pub fn packs(&self) -> &[PackSummary] {
        &self.packs
    }

    pub fn get(&self, pack_id: &str) -> Option<&PackSummary> {
        self.packs.iter().find(|p| p.pack_id == pack_id)
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

#[derive(Debug)]
struct ActivePack {
    summary: PackSummary,
    asset_paths: HashMap<String, String>,
}

/// Read-side access to discovered packs
#[derive(Debug)]
pub struct PackManager {
    index: PackIndex,
    active: Option<ActivePack>,
}

impl PackManager {
    pub fn new(index: PackIndex) -> Self {
        Self {
            index,
            active: None,
        }
    }

    pub fn index(&self) -> &PackIndex {
        &self.index
    }

    pub fn list_available_packs(&self) -> &[PackSummary] {
        self.index.packs()
    }

    /// Select the pack asset URIs resolve against.
    ///
    /// An unknown id clears the active pack and returns `false`.
    pub fn activate_pack(&mut self, pack_id: &str) -> bool {
        let Some(summary) = self.index.get(pack_id).cloned() else {
            warn!(pack_id, "Cannot activate unknown pack");
            self.active = None;
            return false;
        };

        let asset_paths = loader::open_read_only(&summary.content_path())
            .and_then(|conn| loader::read_asset_paths(&conn))
            .unwrap_or_else(|e| {
                warn!(pack_id, error = %e, "Asset table unavailable, resolving logical names directly");
                HashMap::new()
            });

        info!(pack_id, dir = %summary.dir.display(), "Activated pack");
        self.active = Some(ActivePack {
            summary,
            asset_paths,
        });
        true
    }

    pub fn active_pack(&self) -> Option<&PackSummary> {
        self.active.as_ref().map(|a| &a.summary)
    }

    /// Module flags of the active pack; all off when none is active
    pub fn modules(&self) -> Modules {
        self.active_pack().map(|p| p.modules).unwrap_or_default()
    }

    /// Read all content of a discovered pack
    #[instrument(skip(self))]
    pub fn load_pack_content(&self, pack_id: &str) -> Result<PackContent> {
        let summary = self
            .index
            .get(pack_id)
            .ok_or_else(|| PackError::UnknownPack(pack_id.to_string()))?;
        loader::load_content(&summary.pack_id, &summary.content_path(), summary.modules)
    }

    /// `file://` URI of an asset in the active pack, if the file exists
    pub fn resolve_asset_uri(&self, logical_name: &str) -> Option<Url> {
        let Some(active) = &self.active else {
            debug!(logical_name, "No active pack, asset not resolved");
            return None;
        };

        let relative = active
            .asset_paths
            .get(logical_name)
            .map(String::as_str)
            .unwrap_or(logical_name);

        if !is_contained(relative) {
            warn!(logical_name, "Asset path escapes the pack directory");
            return None;
        }

        let path = active.summary.dir.join(relative);
        let resolved = match path.canonicalize() {
            Ok(resolved) if resolved.is_file() => resolved,
            _ => {
                warn!(logical_name, path = %path.display(), "Asset missing from active pack");
                return None;
            }
        };

        Url::from_file_path(&resolved).ok()
    }
}

/// Relative path with only normal components
fn is_contained(relative: &str) -> bool {
    !relative.is_empty()
        && Path::new(relative)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_pack(root: &Path, dir_name: &str, pack_id: &str, display_name: &str) -> PathBuf {
        let dir = root.join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();
        PackManifest {
            pack_id: pack_id.to_string(),
            display_name: display_name.to_string(),
            content_version: "1".to_string(),
            modules: Modules {
                vocabulary: true,
                phrases: false,
                hundred_seconds: false,
            },
            content_file: "content.db".to_string(),
        }
        .save(&dir)
        .unwrap();
        dir
    }

    #[test]
    fn test_scan_skips_bad_manifests() {
        let temp = TempDir::new().unwrap();
        write_pack(temp.path(), "good", "good", "Good");
        let bad = temp.path().join("bad");
        std::fs::create_dir_all(&bad).unwrap();
        std::fs::write(bad.join(MANIFEST_FILE), "{ not json").unwrap();
        std::fs::create_dir_all(temp.path().join("empty")).unwrap();

        let index = PackIndex::scan(&[temp.path().to_path_buf(), temp.path().join("missing")]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.packs()[0].pack_id, "good");
    }

    #[test]
    fn test_later_directory_wins() {
        let bundled = TempDir::new().unwrap();
        let provisioned = TempDir::new().unwrap();
        write_pack(bundled.path(), "main", "main", "Bundled");
        write_pack(provisioned.path(), "main", "main", "Provisioned");

        let index = PackIndex::scan(&[
            bundled.path().to_path_buf(),
            provisioned.path().to_path_buf(),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("main").unwrap().display_name, "Provisioned");
    }

    #[test]
    fn test_activate_and_resolve() {
        let temp = TempDir::new().unwrap();
        let dir = write_pack(temp.path(), "p1", "p1", "P1");
        std::fs::create_dir_all(dir.join("audio")).unwrap();
        std::fs::write(dir.join("audio/mama.mp3"), "mp3").unwrap();

        let mut manager = PackManager::new(PackIndex::scan(&[temp.path().to_path_buf()]));
        assert!(manager.resolve_asset_uri("audio/mama.mp3").is_none());

        assert!(manager.activate_pack("p1"));
        assert!(manager.modules().vocabulary);

        let uri = manager.resolve_asset_uri("audio/mama.mp3").unwrap();
        assert_eq!(uri.scheme(), "file");
        assert!(uri.path().ends_with("/audio/mama.mp3"));

        assert!(manager.resolve_asset_uri("audio/missing.mp3").is_none());
        assert!(manager.resolve_asset_uri("../p1/audio/mama.mp3").is_none());
    }

    #[test]
    fn test_unknown_pack_clears_active() {
        let temp = TempDir::new().unwrap();
        write_pack(temp.path(), "p1", "p1", "P1");

        let mut manager = PackManager::new(PackIndex::scan(&[temp.path().to_path_buf()]));
        assert!(manager.activate_pack("p1"));
        assert!(!manager.activate_pack("nope"));
        assert!(manager.active_pack().is_none());
        assert_eq!(manager.modules(), Modules::default());
        assert!(matches!(
            manager.load_pack_content("nope"),
            Err(PackError::UnknownPack(_))
        ));
    }
}
