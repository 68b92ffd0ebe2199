//! Hash-gated extraction of bundled pack archives into writable storage.
//!
//! ```text
//! <packs_root>/
//! ├── .provision.lock          exclusive lock held while extracting
//! ├── .staging-<pack_id>/      extraction in progress
//! └── <pack_id>/
//!     ├── .content-hash        written last; equals the archive's SHA-256
//!     ├── pack.json
//!     └── content.db, audio/, images/, ...
//! ```
//!
//! A pack directory only ever appears through a rename of a fully extracted
//! staging directory whose marker is already in place, so readers never see
//! a half-extracted pack.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, info, instrument};

use crate::error::{PackError, Result};
use crate::pack::{archive, validate_pack_id, PackSelection, ACTIVE_PACK};

/// Marker file holding the hash of the archive a pack was extracted from
pub const HASH_MARKER: &str = ".content-hash";

/// Lock file under the packs root
pub const LOCK_FILE: &str = ".provision.lock";

/// Location of one bundled archive and its sidecar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledPack {
    pub pack_id: String,
    pub archive: PathBuf,
    pub hash_file: PathBuf,
}

impl BundledPack {
    /// `<dir>/<pack_id>.zip` with `<dir>/<pack_id>-hash.sha256`
    pub fn in_dir(dir: &Path, pack_id: &str) -> Self {
        Self {
            pack_id: pack_id.to_string(),
            archive: dir.join(archive::archive_file_name(pack_id)),
            hash_file: dir.join(archive::hash_file_name(pack_id)),
        }
    }

    /// The main pack in a bundle directory.
    ///
    /// `<pack_id>.zip` wins when present. Otherwise the active pack is used
    /// if `pack-selection.json` names `pack_id`.
    pub fn main_in_dir(dir: &Path, pack_id: &str) -> Result<Self> {
        let own = Self::in_dir(dir, pack_id);
        if own.archive.exists() {
            return Ok(own);
        }

        match PackSelection::load(dir)? {
            Some(selection) if selection.main_pack_id == pack_id => {
                debug!(pack_id, "Using selected active pack");
                Ok(Self {
                    pack_id: pack_id.to_string(),
                    archive: dir.join(archive::archive_file_name(ACTIVE_PACK)),
                    hash_file: dir.join(archive::hash_file_name(ACTIVE_PACK)),
                })
            }
            _ => Ok(own),
        }
    }
}

/// Extracts bundled archives below one writable root
#[derive(Debug, Clone)]
pub struct PackProvisioner {
    packs_root: PathBuf,
}

impl PackProvisioner {
    pub fn new(packs_root: impl Into<PathBuf>) -> Self {
        Self {
            packs_root: packs_root.into(),
        }
    }

    pub fn packs_root(&self) -> &Path {
        &self.packs_root
    }

    pub fn pack_dir(&self, pack_id: &str) -> PathBuf {
        self.packs_root.join(pack_id)
    }

    /// Hash recorded by the last successful extraction, if any
    pub fn installed_hash(&self, pack_id: &str) -> Option<String> {
        std::fs::read_to_string(self.pack_dir(pack_id).join(HASH_MARKER))
            .ok()
            .map(|s| s.trim().to_string())
    }

    fn is_current(&self, pack_id: &str, expected: &str) -> bool {
        self.installed_hash(pack_id).as_deref() == Some(expected)
    }

    /// Ensure `pack_id` is extracted from `archive`.
    ///
    /// Returns `false` without touching the filesystem when the installed
    /// marker already equals the expected hash, `true` after a fresh
    /// extraction.
    #[instrument(skip(self, archive, hash_file))]
    pub fn provision(&self, pack_id: &str, archive: &Path, hash_file: &Path) -> Result<bool> {
        validate_pack_id(pack_id)?;
        let expected = archive::read_hash_file(hash_file)?;

        if self.is_current(pack_id, &expected) {
            debug!("Pack already provisioned, skipping extraction");
            return Ok(false);
        }

        std::fs::create_dir_all(&self.packs_root)?;
        let _lock = self.lock()?;

        // Another process may have finished while we waited
        if self.is_current(pack_id, &expected) {
            debug!("Pack provisioned concurrently, skipping extraction");
            return Ok(false);
        }

        if !archive.is_file() {
            return Err(PackError::extraction(
                pack_id,
                format!("archive not found: {}", archive.display()),
            ));
        }

        let actual = archive::sha256_file(archive)?;
        if actual != expected {
            return Err(PackError::HashMismatch { expected, actual });
        }

        let staging = self.packs_root.join(format!(".staging-{}", pack_id));
        if staging.exists() {
            std::fs::remove_dir_all(&staging)?;
        }
        std::fs::create_dir_all(&staging)?;

        let files = match archive::extract_archive(archive, &staging, pack_id) {
            Ok(files) => files,
            Err(e) => {
                let _ = std::fs::remove_dir_all(&staging);
                return Err(e);
            }
        };
        std::fs::write(staging.join(HASH_MARKER), format!("{}\n", expected))?;

        let pack_dir = self.pack_dir(pack_id);
        if pack_dir.exists() {
            std::fs::remove_dir_all(&pack_dir)?;
        }
        std::fs::rename(&staging, &pack_dir)?;

        info!(files, path = %pack_dir.display(), "Pack provisioned");
        Ok(true)
    }

    /// Provision from a [`BundledPack`]
    pub fn provision_bundle(&self, bundle: &BundledPack) -> Result<bool> {
        self.provision(&bundle.pack_id, &bundle.archive, &bundle.hash_file)
    }

    /// Exclusive lock released when the returned file is dropped
    fn lock(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.packs_root.join(LOCK_FILE))?;
        file.lock_exclusive()?;
        Ok(file)
    }
}
