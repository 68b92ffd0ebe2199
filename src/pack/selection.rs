//! Catalog of known packs and selection of the one bundled as main pack.
//!
//! Selecting a pack copies its archive and sidecar into the bundle
//! directory under fixed names and records the choice:
//!
//! ```text
//! <bundled>/
//! ├── active-pack.zip
//! ├── active-pack-hash.sha256
//! └── pack-selection.json      {"mainPackId": "<pack id>"}
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PackError, Result};

use super::archive::{archive_file_name, hash_file_name};
use super::builder::validate_pack_id;

/// File stem of the selected archive in the bundle directory
pub const ACTIVE_PACK: &str = "active-pack";

/// Records which pack `active-pack.zip` holds
pub const SELECTION_FILE: &str = "pack-selection.json";

/// Contents of `pack-selection.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackSelection {
    pub main_pack_id: String,
}

impl PackSelection {
    pub fn path(bundled_dir: &Path) -> PathBuf {
        bundled_dir.join(SELECTION_FILE)
    }

    /// Load the selection; `None` when nothing was selected yet
    pub fn load(bundled_dir: &Path) -> Result<Option<Self>> {
        let path = Self::path(bundled_dir);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, bundled_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(bundled_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::path(bundled_dir), content)?;
        Ok(())
    }
}

/// One known pack and where its build output lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub pack_id: String,
    pub label: String,
    pub archive: PathBuf,
    pub hash_file: PathBuf,
}

impl CatalogEntry {
    /// Entry whose archive and sidecar sit in `dir` under their default names
    pub fn in_dir(dir: &Path, pack_id: &str, label: &str) -> Self {
        Self {
            pack_id: pack_id.to_string(),
            label: label.to_string(),
            archive: dir.join(archive_file_name(pack_id)),
            hash_file: dir.join(hash_file_name(pack_id)),
        }
    }
}

/// Ordered list of known packs; the first one is the default
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackCatalog {
    entries: Vec<CatalogEntry>,
}

impl PackCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, pack_id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.pack_id == pack_id)
    }

    pub fn default_pack(&self) -> Option<&CatalogEntry> {
        self.entries.first()
    }

    /// Copy the archive and sidecar of `pack_id` into `bundled_dir` as the
    /// active pack and record the selection
    pub fn select(&self, pack_id: &str, bundled_dir: &Path) -> Result<PackSelection> {
        validate_pack_id(pack_id)?;
        let entry = self.get(pack_id).ok_or_else(|| {
            let known: Vec<&str> = self.entries.iter().map(|e| e.pack_id.as_str()).collect();
            PackError::UnknownPack(format!("{} (known packs: {})", pack_id, known.join(", ")))
        })?;

        std::fs::create_dir_all(bundled_dir)?;
        std::fs::copy(&entry.archive, bundled_dir.join(archive_file_name(ACTIVE_PACK)))?;
        std::fs::copy(&entry.hash_file, bundled_dir.join(hash_file_name(ACTIVE_PACK)))?;

        let selection = PackSelection {
            main_pack_id: entry.pack_id.clone(),
        };
        selection.save(bundled_dir)?;

        info!(pack_id = %entry.pack_id, label = %entry.label, "Activated pack");
        Ok(selection)
    }
}
