//! Canonical paths for contentpack storage.
//!
//! Single source of truth - import this instead of hardcoding paths.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use contentpack::config::paths;
//!
//! let packs = paths::packs_dir()?;
//! let main = paths::bundled_archive("main")?;
//! ```
//!
//! ## Path Ownership
//!
//! | Location | Owner | Purpose |
//! |----------|-------|---------|
//! | `bundled_dir()` | build output, read-only at runtime | `<id>.zip` + `<id>-hash.sha256` |
//! | `packs_dir()` | PackProvisioner | Extracted packs |
//! | `provision_lock()` | PackProvisioner | Single-writer lock |

use std::path::PathBuf;

use anyhow::Result;

use crate::pack::{archive_file_name, hash_file_name};
use crate::runtime::provisioner::LOCK_FILE;

/// Writable document storage
pub fn home() -> Result<PathBuf> {
    Ok(crate::config::config()?.home.clone())
}

/// Provisioned packs (`<home>/packs`)
pub fn packs_dir() -> Result<PathBuf> {
    Ok(home()?.join("packs"))
}

/// Read-only bundled archives
pub fn bundled_dir() -> Result<PathBuf> {
    Ok(crate::config::config()?.bundled.clone())
}

pub fn bundled_archive(pack_id: &str) -> Result<PathBuf> {
    Ok(bundled_dir()?.join(archive_file_name(pack_id)))
}

pub fn bundled_hash(pack_id: &str) -> Result<PathBuf> {
    Ok(bundled_dir()?.join(hash_file_name(pack_id)))
}

/// Lock file guarding extraction into `packs_dir()`
pub fn provision_lock() -> Result<PathBuf> {
    Ok(packs_dir()?.join(LOCK_FILE))
}
