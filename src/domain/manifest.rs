//! The `pack.json` manifest at the root of every pack directory.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PackError, Result};

/// File name of the manifest inside a pack directory
pub const MANIFEST_FILE: &str = "pack.json";

/// Default content database file name
pub const DEFAULT_CONTENT_FILE: &str = "content.db";

/// Per-pack module availability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modules {
    pub vocabulary: bool,
    pub phrases: bool,
    pub hundred_seconds: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackManifest {
    pub pack_id: String,
    pub display_name: String,
    pub content_version: String,
    pub modules: Modules,
    #[serde(default = "default_content_file")]
    pub content_file: String,
}

fn default_content_file() -> String {
    DEFAULT_CONTENT_FILE.to_string()
}

impl PackManifest {
    /// Read and parse `pack.json` from a pack directory
    pub fn load(pack_dir: &Path) -> Result<Self> {
        let path = pack_dir.join(MANIFEST_FILE);

        let content = std::fs::read_to_string(&path).map_err(|e| PackError::ManifestRead {
            path: path.clone(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| PackError::ManifestRead {
            path,
            message: e.to_string(),
        })
    }

    /// Write `pack.json` into a pack directory
    pub fn save(&self, pack_dir: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(pack_dir.join(MANIFEST_FILE), format!("{}\n", content))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_json_schema() {
        let manifest = PackManifest {
            pack_id: "hsb".to_string(),
            display_name: "Hornjoserbšćina".to_string(),
            content_version: "3".to_string(),
            modules: Modules {
                vocabulary: true,
                phrases: true,
                hundred_seconds: false,
            },
            content_file: DEFAULT_CONTENT_FILE.to_string(),
        };

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["packId"], "hsb");
        assert_eq!(json["contentVersion"], "3");
        assert_eq!(json["modules"]["hundredSeconds"], false);
        assert_eq!(json["contentFile"], "content.db");
    }

    #[test]
    fn test_content_file_defaults() {
        let json = r#"{
            "packId": "old",
            "displayName": "Old pack",
            "contentVersion": "1",
            "modules": { "vocabulary": true, "phrases": false, "hundredSeconds": false }
        }"#;

        let manifest: PackManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.content_file, "content.db");
    }

    #[test]
    fn test_load_malformed_manifest() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(MANIFEST_FILE), "{ not json").unwrap();

        let result = PackManifest::load(temp.path());
        assert!(matches!(result, Err(PackError::ManifestRead { .. })));
    }
}
