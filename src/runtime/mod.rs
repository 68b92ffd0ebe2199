//! Runtime side of content packs.
//!
//! - [`provisioner`]: verify and extract bundled archives into writable storage
//! - [`manager`]: discover packs, activate one, resolve asset URIs
//! - [`loader`]: schema-tolerant database reads
//! - [`bootstrap`]: the startup sequence tying them together
//!
//! Every entry point does blocking file I/O; async callers should run them
//! on a blocking thread.

pub mod bootstrap;
pub mod content;
pub mod loader;
pub mod manager;
pub mod provisioner;

pub use bootstrap::{
    bootstrap, provision_with_fallback, BootstrapError, BootstrapOptions, Bootstrapped,
    ProvisionOutcome, RuntimeProfile,
};
pub use content::PackContent;
pub use manager::{PackIndex, PackManager, PackSummary};
pub use provisioner::{BundledPack, PackProvisioner, HASH_MARKER};
