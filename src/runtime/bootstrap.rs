//! One-shot startup: provision, index, activate, load.
//!
//! The caller gets either a ready [`Bootstrapped`] value or a
//! [`BootstrapError`] naming every pack that was tried and why it failed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::error::PackError;

use super::content::PackContent;
use super::manager::{PackIndex, PackManager};
use super::provisioner::{BundledPack, PackProvisioner};

/// Runtime configuration flavour; only development may fall back to the mock pack
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeProfile {
    Development,
    #[default]
    Production,
}

impl RuntimeProfile {
    pub fn allows_fallback(&self) -> bool {
        matches!(self, RuntimeProfile::Development)
    }
}

impl std::fmt::Display for RuntimeProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeProfile::Development => write!(f, "development"),
            RuntimeProfile::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for RuntimeProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(RuntimeProfile::Development),
            "production" | "prod" => Ok(RuntimeProfile::Production),
            other => Err(format!(
                "unknown profile '{}': expected development or production",
                other
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Main pack '{pack_id}' unavailable: {source}")]
    MainPackUnavailable {
        pack_id: String,
        #[source]
        source: PackError,
    },

    #[error("Main pack '{main_id}' unavailable ({main}); mock pack '{mock_id}' unavailable ({mock})")]
    NoPackAvailable {
        main_id: String,
        main: PackError,
        mock_id: String,
        mock: PackError,
    },

    /// Provisioned, but no scanned directory holds a readable manifest for it
    #[error("Pack '{0}' was provisioned but not found by the pack scan")]
    NotIndexed(String),

    #[error("Failed to load pack '{pack_id}': {source}")]
    Load {
        pack_id: String,
        #[source]
        source: PackError,
    },
}

/// Which pack ended up provisioned and whether it was extracted this time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOutcome {
    pub pack_id: String,
    pub extracted: bool,
    /// Why the main pack was not used, when the mock pack was
    pub fallback_reason: Option<String>,
}

impl ProvisionOutcome {
    pub fn used_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Provision `main`; in development, fall back to `mock` when that fails
pub fn provision_with_fallback(
    provisioner: &PackProvisioner,
    main: &BundledPack,
    mock: &BundledPack,
    profile: RuntimeProfile,
) -> Result<ProvisionOutcome, BootstrapError> {
    let main_error = match provisioner.provision_bundle(main) {
        Ok(extracted) => {
            return Ok(ProvisionOutcome {
                pack_id: main.pack_id.clone(),
                extracted,
                fallback_reason: None,
            })
        }
        Err(e) => e,
    };

    if !profile.allows_fallback() {
        return Err(BootstrapError::MainPackUnavailable {
            pack_id: main.pack_id.clone(),
            source: main_error,
        });
    }

    warn!(
        main = %main.pack_id,
        mock = %mock.pack_id,
        error = %main_error,
        "Main pack unavailable, falling back to mock pack"
    );

    match provisioner.provision_bundle(mock) {
        Ok(extracted) => Ok(ProvisionOutcome {
            pack_id: mock.pack_id.clone(),
            extracted,
            fallback_reason: Some(main_error.to_string()),
        }),
        Err(mock_error) => Err(BootstrapError::NoPackAvailable {
            main_id: main.pack_id.clone(),
            main: main_error,
            mock_id: mock.pack_id.clone(),
            mock: mock_error,
        }),
    }
}

/// Inputs for [`bootstrap`]
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Read-only directory with `<id>.zip` archives and their sidecars, or
    /// the selected `active-pack.zip`
    pub bundled_dir: PathBuf,
    /// Writable directory packs are extracted into
    pub packs_dir: PathBuf,
    pub profile: RuntimeProfile,
    pub main_pack: String,
    pub mock_pack: String,
}

/// A provisioned, activated and loaded pack
#[derive(Debug)]
pub struct Bootstrapped {
    pub manager: PackManager,
    pub content: PackContent,
    pub outcome: ProvisionOutcome,
}

/// Provision, scan, activate and load the startup pack
#[instrument(skip(options), fields(profile = %options.profile, main = %options.main_pack))]
pub fn bootstrap(options: &BootstrapOptions) -> Result<Bootstrapped, BootstrapError> {
    let provisioner = PackProvisioner::new(&options.packs_dir);
    let main = BundledPack::main_in_dir(&options.bundled_dir, &options.main_pack)
        .unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable pack selection");
            BundledPack::in_dir(&options.bundled_dir, &options.main_pack)
        });
    let mock = BundledPack::in_dir(&options.bundled_dir, &options.mock_pack);

    let outcome = provision_with_fallback(&provisioner, &main, &mock, options.profile)?;

    let index = PackIndex::scan(&[options.bundled_dir.clone(), options.packs_dir.clone()]);
    let mut manager = PackManager::new(index);
    if !manager.activate_pack(&outcome.pack_id) {
        return Err(BootstrapError::NotIndexed(outcome.pack_id));
    }

    let content = manager
        .load_pack_content(&outcome.pack_id)
        .map_err(|source| BootstrapError::Load {
            pack_id: outcome.pack_id.clone(),
            source,
        })?;

    info!(
        pack_id = %outcome.pack_id,
        extracted = outcome.extracted,
        fallback = outcome.used_fallback(),
        topics = content.topics.len(),
        "Bootstrap complete"
    );

    Ok(Bootstrapped {
        manager,
        content,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parsing() {
        assert_eq!("dev".parse::<RuntimeProfile>().unwrap(), RuntimeProfile::Development);
        assert_eq!("Production".parse::<RuntimeProfile>().unwrap(), RuntimeProfile::Production);
        assert!("staging".parse::<RuntimeProfile>().is_err());
        assert_eq!(RuntimeProfile::default(), RuntimeProfile::Production);
        assert!(RuntimeProfile::Development.allows_fallback());
        assert!(!RuntimeProfile::Production.allows_fallback());
    }
}
