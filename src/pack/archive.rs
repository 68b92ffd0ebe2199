//! Pack archives and their SHA-256 sidecar files.
//!
//! An archive holds exactly one top-level directory named after the pack.
//! Entries are written in sorted order with fixed timestamps, so rebuilding
//! unchanged content reproduces the same bytes and therefore the same hash.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{PackError, Result};

/// `<pack_id>.zip`
pub fn archive_file_name(pack_id: &str) -> String {
    format!("{}.zip", pack_id)
}

/// `<pack_id>-hash.sha256`
pub fn hash_file_name(pack_id: &str) -> String {
    format!("{}-hash.sha256", pack_id)
}

/// Zip `source_dir` under a single `root_name/` prefix. Returns the number
/// of file entries written.
pub fn zip_directory(source_dir: &Path, root_name: &str, destination: &Path) -> Result<usize> {
    let fixed_time = DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0)
        .map_err(|e| PackError::Io(std::io::Error::other(e.to_string())))?;
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(fixed_time)
        .unix_permissions(0o644);

    let file = File::create(destination)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let mut count = 0;

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| PackError::Io(std::io::Error::other(e.to_string())))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| PackError::Io(std::io::Error::other(e.to_string())))?;
        let name = archive_entry_name(root_name, relative);

        zip.start_file(name, options)?;
        let mut source = File::open(entry.path())?;
        std::io::copy(&mut source, &mut zip)?;
        count += 1;
    }

    zip.finish()?.flush()?;
    debug!(archive = %destination.display(), entries = count, "Wrote pack archive");
    Ok(count)
}

/// Forward-slash entry name regardless of platform separator
fn archive_entry_name(root_name: &str, relative: &Path) -> String {
    let mut name = root_name.to_string();
    for component in relative.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}

/// Lowercase hex SHA-256 of a file's bytes
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Write the sidecar: hex digest followed by a newline
pub fn write_hash_file(path: &Path, hash: &str) -> Result<()> {
    std::fs::write(path, format!("{}\n", hash))?;
    Ok(())
}

/// Read a sidecar; a missing, empty or non-hex file is `HashUnavailable`
pub fn read_hash_file(path: &Path) -> Result<String> {
    let unavailable = |reason: String| PackError::HashUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
    let hash = content.trim().to_ascii_lowercase();

    if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(unavailable(format!("not a SHA-256 digest: '{}'", hash)));
    }
    Ok(hash)
}

/// Extract every file entry into `destination`, stripping the archive's
/// single root directory. Returns the number of files written.
pub fn extract_archive(archive: &Path, destination: &Path, pack_id: &str) -> Result<usize> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;
    let mut root: Option<PathBuf> = None;
    let mut count = 0;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let Some(enclosed) = entry.enclosed_name() else {
            return Err(PackError::extraction(
                pack_id,
                format!("unsafe entry path '{}'", entry.name()),
            ));
        };

        let mut components = enclosed.components();
        let Some(Component::Normal(first)) = components.next() else {
            return Err(PackError::extraction(
                pack_id,
                format!("entry '{}' has no root directory", entry.name()),
            ));
        };
        match &root {
            None => root = Some(PathBuf::from(first)),
            Some(existing) if existing.as_os_str() == first => {}
            Some(existing) => {
                return Err(PackError::extraction(
                    pack_id,
                    format!(
                        "archive has more than one root ('{}' and '{}')",
                        existing.display(),
                        first.to_string_lossy()
                    ),
                ))
            }
        }

        let relative = components.as_path();
        if relative.as_os_str().is_empty() {
            return Err(PackError::extraction(
                pack_id,
                format!("file entry '{}' outside the root directory", entry.name()),
            ));
        }

        let target = destination.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&target)?);
        std::io::copy(&mut entry, &mut out)?;
        out.flush()?;
        count += 1;
    }

    if let Some(root) = root.filter(|r| r.as_os_str() != pack_id) {
        debug!(pack_id, root = %root.display(), "Archive root differs from pack id");
    }

    Ok(count)
}
