//! Error taxonomy for conversion, packaging and provisioning.
//!
//! Per-item problems (an asset that cannot be found or copied) are never
//! represented here: they are logged and collected into reports. Everything
//! in [`PackError`] is structural and propagates to the immediate caller.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result type
pub type Result<T, E = PackError> = std::result::Result<T, E>;

/// Structural failures of the content-pack pipeline
#[derive(Debug, Error)]
pub enum PackError {
    /// No recognizable legacy structure below the source root
    #[error("Unsupported legacy layout at {}: expected a phrases/ directory or topicN.xml files", .root.display())]
    UnsupportedLayout { root: PathBuf },

    #[error("Failed to read legacy source {}: {source}", .path.display())]
    LegacyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed legacy XML in {}: {message}", .path.display())]
    LegacyParse { path: PathBuf, message: String },

    /// pack.json missing, unreadable or not valid JSON
    #[error("Failed to read pack manifest {}: {message}", .path.display())]
    ManifestRead { path: PathBuf, message: String },

    #[error("Pack hash unavailable at {}: {reason}", .path.display())]
    HashUnavailable { path: PathBuf, reason: String },

    #[error("Archive hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("Failed to extract pack '{pack_id}': {message}")]
    Extraction { pack_id: String, message: String },

    #[error("Content database missing: {}", .path.display())]
    ContentDatabaseMissing { path: PathBuf },

    #[error("Unknown pack: {0}")]
    UnknownPack(String),

    /// Pack ids name directories and archive files
    #[error("Invalid pack id '{0}': use ASCII letters, digits, '-', '_' or '.', not starting with '.'")]
    InvalidPackId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PackError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        PackError::LegacyParse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn extraction(pack_id: &str, message: impl std::fmt::Display) -> Self {
        PackError::Extraction {
            pack_id: pack_id.to_string(),
            message: message.to_string(),
        }
    }
}
