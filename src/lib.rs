//! contentpack - Build and provision language-learning content packs
//!
//! Legacy XML content from older app generations is converted once, at build
//! time, into a self-contained pack (SQLite database, media assets and a
//! `pack.json` manifest), zipped and hash-addressed. At runtime the pack is
//! verified, extracted into writable storage and read back.
//!
//! # Architecture
//!
//! The system is a two-phase pipeline:
//! - Build: legacy tree → [`legacy::convert`] → [`pack::PackBuilder`] → `<id>.zip` + `<id>-hash.sha256`
//! - Runtime: [`runtime::PackProvisioner`] → [`runtime::PackIndex`] → [`runtime::PackManager`]
//!
//! Extraction is gated by the archive hash, so repeated provisioning of an
//! unchanged archive is a no-op.
//!
//! # Modules
//!
//! - `domain`: Canonical records, stable ids, the pack manifest
//! - `assets`: Logical asset names and their resolution
//! - `legacy`: Layout detection and the two legacy parsers
//! - `pack`: Database schema, archive and hash, the builder, mock pack and pack selection
//! - `runtime`: Provisioning, discovery, loading, bootstrap
//! - `config`: Layered configuration for the CLI
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Build a pack from a legacy tree
//! contentpack build ./legacy ./out hsb "Hornjoserbšćina" 3
//!
//! # Check the archive against its sidecar
//! contentpack verify ./out/hsb.zip
//!
//! # Build the development fallback and activate a catalog pack
//! contentpack build-mock
//! contentpack select de-hsb-pack
//!
//! # Provision into local storage and list installed packs
//! contentpack provision --bundle-dir ./out --pack-id hsb
//! contentpack packs
//! ```

pub mod assets;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod legacy;
pub mod pack;
pub mod runtime;

// Re-export main types at crate root for convenience
pub use assets::{AssetEntry, AssetManifest};
pub use domain::{
    HundredSecItem, Modules, PackManifest, PhraseItem, PhraseType, Topic, TopicKind, TopicType,
    VocabItem,
};
pub use error::{PackError, Result};
pub use legacy::{convert, ContentOrigin, ConversionResult, ConvertOptions, Dialect, SourceLayout};
pub use pack::{BuildReport, BuiltPack, PackBuilder, PackMetadata};
pub use runtime::{
    bootstrap, BootstrapError, BootstrapOptions, Bootstrapped, BundledPack, PackContent,
    PackIndex, PackManager, PackProvisioner, PackSummary, ProvisionOutcome, RuntimeProfile,
};
