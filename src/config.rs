//! Configuration for contentpack paths and runtime defaults.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (CONTENTPACK_HOME, CONTENTPACK_BUNDLED, CONTENTPACK_PROFILE)
//! 2. Config file (.contentpack/config.yaml)
//! 3. Defaults (<data dir>/contentpack)
//!
//! Config file discovery:
//! - Searches current directory and parents for .contentpack/config.yaml
//! - Paths in the config file are relative to the project root (the parent
//!   of .contentpack/)
//!
//! The `catalog` section lists the packs `contentpack select` can activate.
//! Without it, the three standard packs are expected in
//! `<home>/converted-packs`.
//!
//! Only the CLI reads configuration. Library components take explicit paths.

pub mod paths;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::legacy::Dialect;
use crate::pack::{CatalogEntry, PackCatalog, MOCK_PACK_ID};
use crate::runtime::RuntimeProfile;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const ENV_HOME: &str = "CONTENTPACK_HOME";
pub const ENV_BUNDLED: &str = "CONTENTPACK_BUNDLED";
pub const ENV_PROFILE: &str = "CONTENTPACK_PROFILE";

const CONFIG_DIR: &str = ".contentpack";
const CONFIG_FILE: &str = "config.yaml";

/// Main pack used when neither config nor selection names one
pub const DEFAULT_MAIN_PACK: &str = "de-hsb-pack";

/// Packs known without a `catalog` section, default first
const DEFAULT_CATALOG: &[(&str, &str)] = &[
    ("de-hsb-pack", "Obersorbisch"),
    ("de-dsb-pack", "Niedersorbisch"),
    ("main-english-pack", "English → Obersorbisch"),
];

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Writable document storage; provisioned packs live below it
    pub home: Option<String>,
    /// Read-only directory of bundled archives
    pub bundled: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    pub profile: Option<RuntimeProfile>,
    pub main_pack: Option<String>,
    pub mock_pack: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildConfig {
    pub display_name: Option<String>,
    pub content_version: Option<String>,
    pub dialect: Option<Dialect>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding the built archives (default `<home>/converted-packs`)
    pub source_dir: Option<String>,
    /// Replaces the default pack list when present
    pub packs: Option<Vec<CatalogPackConfig>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPackConfig {
    pub pack_id: String,
    pub label: Option<String>,
    /// Archive path (default `<source_dir>/<pack_id>.zip`)
    pub archive: Option<String>,
    /// Sidecar path (default `<source_dir>/<pack_id>-hash.sha256`)
    pub hash: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub home: PathBuf,
    pub bundled: PathBuf,
    pub profile: RuntimeProfile,
    pub main_pack: String,
    pub mock_pack: String,
    pub build: BuildSettings,
    pub catalog: PackCatalog,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Defaults for `contentpack build` arguments
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Falls back to the pack id when unset
    pub display_name: Option<String>,
    pub content_version: String,
    pub dialect: Dialect,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            display_name: None,
            content_version: "1".to_string(),
            dialect: Dialect::default(),
        }
    }
}

/// Environment overrides, captured once so resolution stays testable
#[derive(Debug, Clone, Default)]
struct EnvOverrides {
    home: Option<String>,
    bundled: Option<String>,
    profile: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            home: std::env::var(ENV_HOME).ok(),
            bundled: std::env::var(ENV_BUNDLED).ok(),
            profile: std::env::var(ENV_PROFILE).ok(),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn resolve_catalog(catalog: &CatalogConfig, base_dir: &Path, home: &Path) -> PackCatalog {
    let source_dir = match &catalog.source_dir {
        Some(dir) => resolve_path(base_dir, dir),
        None => home.join("converted-packs"),
    };

    let entries = match &catalog.packs {
        Some(packs) => packs
            .iter()
            .map(|pack| {
                let label = pack.label.as_deref().unwrap_or(&pack.pack_id);
                let mut entry = CatalogEntry::in_dir(&source_dir, &pack.pack_id, label);
                if let Some(archive) = &pack.archive {
                    entry.archive = resolve_path(base_dir, archive);
                }
                if let Some(hash) = &pack.hash {
                    entry.hash_file = resolve_path(base_dir, hash);
                }
                entry
            })
            .collect(),
        None => DEFAULT_CATALOG
            .iter()
            .map(|(pack_id, label)| CatalogEntry::in_dir(&source_dir, pack_id, label))
            .collect(),
    };

    PackCatalog::new(entries)
}

fn default_home() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join("contentpack"))
        .or_else(|| dirs::home_dir().map(|h| h.join(".contentpack")))
        .context("Failed to determine a data directory")
}

/// Merge env overrides, an optional config file and defaults
fn resolve(
    file: Option<(&Path, ConfigFile)>,
    env: &EnvOverrides,
    default_home: PathBuf,
) -> Result<ResolvedConfig> {
    let (config_file, config) = match file {
        Some((path, config)) => (Some(path.to_path_buf()), Some(config)),
        None => (None, None),
    };

    // Project root is the parent of .contentpack/
    let base_dir = config_file
        .as_deref()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .unwrap_or(Path::new("."));

    let home = match (&env.home, config.as_ref().and_then(|c| c.paths.home.as_ref())) {
        (Some(env_home), _) => PathBuf::from(env_home),
        (None, Some(home)) => resolve_path(base_dir, home),
        (None, None) => default_home,
    };

    let bundled = match (&env.bundled, config.as_ref().and_then(|c| c.paths.bundled.as_ref())) {
        (Some(env_bundled), _) => PathBuf::from(env_bundled),
        (None, Some(bundled)) => resolve_path(base_dir, bundled),
        (None, None) => home.join("bundled"),
    };

    let profile = match &env.profile {
        Some(value) => value
            .parse::<RuntimeProfile>()
            .map_err(|e| anyhow::anyhow!("{}: {}", ENV_PROFILE, e))?,
        None => config
            .as_ref()
            .and_then(|c| c.runtime.profile)
            .unwrap_or_default(),
    };

    let runtime = config.as_ref().map(|c| c.runtime.clone()).unwrap_or_default();
    let catalog = resolve_catalog(
        &config.as_ref().map(|c| c.catalog.clone()).unwrap_or_default(),
        base_dir,
        &home,
    );
    let build = config.map(|c| c.build).unwrap_or_default();
    let defaults = BuildSettings::default();

    Ok(ResolvedConfig {
        home,
        bundled,
        profile,
        main_pack: runtime
            .main_pack
            .unwrap_or_else(|| DEFAULT_MAIN_PACK.to_string()),
        mock_pack: runtime
            .mock_pack
            .unwrap_or_else(|| MOCK_PACK_ID.to_string()),
        build: BuildSettings {
            display_name: build.display_name,
            content_version: build.content_version.unwrap_or(defaults.content_version),
            dialect: build.dialect.unwrap_or(defaults.dialect),
        },
        catalog,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let env = EnvOverrides::from_env();
    let config_path = find_config_file();

    let file = match &config_path {
        Some(path) => Some((path.as_path(), load_config_file(path)?)),
        None => None,
    };

    resolve(file, &env, default_home()?)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
