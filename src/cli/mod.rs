//! Command-line interface for contentpack.
//!
//! Provides commands for converting legacy content into packs, building the
//! mock pack, choosing the bundled main pack, verifying archives,
//! provisioning packs into local storage and inspecting what is installed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config;
use crate::domain::TopicType;
use crate::legacy::{self, ConvertOptions, Dialect};
use crate::pack::{self, PackBuilder, PackMetadata, PackSelection};
use crate::runtime::{self, BootstrapOptions, PackIndex, PackManager, RuntimeProfile};

/// contentpack - Build and provision language-learning content packs
#[derive(Parser, Debug)]
#[command(name = "contentpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a legacy tree and build a pack archive
    Build {
        /// Legacy source root (Android or iOS layout)
        legacy_root: PathBuf,

        /// Directory receiving <pack-id>/, <pack-id>.zip and <pack-id>-hash.sha256
        output_dir: PathBuf,

        /// Pack id (defaults to the configured main pack)
        pack_id: Option<String>,

        /// Human-readable pack name (defaults to the pack id)
        display_name: Option<String>,

        /// Content version written to pack.json
        content_version: Option<String>,

        /// Sorbian dialect used for synthesized topic names (hsb, dsb)
        #[arg(long)]
        dialect: Option<Dialect>,
    },

    /// Build the built-in mock pack (development fallback)
    BuildMock {
        /// Output directory (defaults to the bundled directory)
        output_dir: Option<PathBuf>,

        /// Directory with audio/ and images/ for the fixture media
        #[arg(long)]
        assets_dir: Option<PathBuf>,
    },

    /// Make a catalog pack the bundled main pack
    Select {
        /// Pack id from the catalog (defaults to the first entry)
        pack_id: Option<String>,

        /// List the catalog and the current selection
        #[arg(short, long)]
        list: bool,

        /// Directory receiving active-pack.zip and pack-selection.json
        #[arg(long, env = "CONTENTPACK_BUNDLED")]
        bundle_dir: Option<PathBuf>,
    },

    /// Convert a legacy tree without writing anything
    Inspect {
        /// Legacy source root
        legacy_root: PathBuf,

        /// Sorbian dialect used for synthesized topic names (hsb, dsb)
        #[arg(long)]
        dialect: Option<Dialect>,
    },

    /// Check an archive against its SHA-256 sidecar
    Verify {
        /// Pack archive (<pack-id>.zip)
        archive: PathBuf,

        /// Sidecar file (defaults to <pack-id>-hash.sha256 next to the archive)
        #[arg(long)]
        hash_file: Option<PathBuf>,
    },

    /// Provision the startup pack into local storage
    Provision {
        /// Directory holding bundled archives
        #[arg(long, env = "CONTENTPACK_BUNDLED")]
        bundle_dir: Option<PathBuf>,

        /// Main pack id
        #[arg(long)]
        pack_id: Option<String>,

        /// Runtime profile (development allows the mock pack fallback)
        #[arg(long, env = "CONTENTPACK_PROFILE")]
        profile: Option<RuntimeProfile>,
    },

    /// List bundled and provisioned packs
    Packs,

    /// Show the content of an installed pack
    Show {
        /// Pack id
        pack_id: String,

        /// List every topic
        #[arg(short, long)]
        topics: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Build {
                legacy_root,
                output_dir,
                pack_id,
                display_name,
                content_version,
                dialect,
            } => {
                build_pack(
                    legacy_root,
                    output_dir,
                    pack_id,
                    display_name,
                    content_version,
                    dialect,
                )
                .await
            }
            Commands::BuildMock {
                output_dir,
                assets_dir,
            } => build_mock(output_dir, assets_dir).await,
            Commands::Select {
                pack_id,
                list,
                bundle_dir,
            } => select_pack(pack_id, list, bundle_dir).await,
            Commands::Inspect {
                legacy_root,
                dialect,
            } => inspect_legacy(legacy_root, dialect).await,
            Commands::Verify { archive, hash_file } => verify_archive(archive, hash_file).await,
            Commands::Provision {
                bundle_dir,
                pack_id,
                profile,
            } => provision(bundle_dir, pack_id, profile).await,
            Commands::Packs => list_packs().await,
            Commands::Show { pack_id, topics } => show_pack(&pack_id, topics).await,
            Commands::Config => show_config().await,
        }
    }
}

/// Run blocking pipeline work off the async runtime
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("Blocking task panicked")?
}

async fn build_pack(
    legacy_root: PathBuf,
    output_dir: PathBuf,
    pack_id: Option<String>,
    display_name: Option<String>,
    content_version: Option<String>,
    dialect: Option<Dialect>,
) -> Result<()> {
    let cfg = config::config()?;
    let pack_id = pack_id.unwrap_or_else(|| cfg.main_pack.clone());
    let metadata = PackMetadata::new(&pack_id)
        .with_display_name(
            display_name
                .or_else(|| cfg.build.display_name.clone())
                .unwrap_or_else(|| pack_id.clone()),
        )
        .with_content_version(content_version.unwrap_or_else(|| cfg.build.content_version.clone()));
    let options = ConvertOptions {
        dialect: dialect.unwrap_or(cfg.build.dialect),
    };

    eprintln!("Converting {}", legacy_root.display());

    let built = blocking(move || {
        let conversion = legacy::convert(&legacy_root, options).context("convert failed")?;
        std::fs::create_dir_all(&output_dir).with_context(|| {
            format!("Failed to create output directory: {}", output_dir.display())
        })?;
        PackBuilder::new(&output_dir)
            .build(&conversion, &metadata)
            .context("build failed")
    })
    .await?;

    print_built(&built);
    Ok(())
}

async fn build_mock(output_dir: Option<PathBuf>, assets_dir: Option<PathBuf>) -> Result<()> {
    let output_dir = match output_dir {
        Some(dir) => dir,
        None => config::paths::bundled_dir()?,
    };

    let built = blocking(move || {
        std::fs::create_dir_all(&output_dir).with_context(|| {
            format!("Failed to create output directory: {}", output_dir.display())
        })?;
        pack::build_mock_pack(&output_dir, assets_dir.as_deref()).context("build failed")
    })
    .await?;

    print_built(&built);
    Ok(())
}

fn print_built(built: &pack::BuiltPack) {
    let report = &built.report;
    println!("Pack directory: {}", built.pack_dir.display());
    println!("Archive:        {}", built.archive.display());
    println!("Hash file:      {}", built.hash_file.display());
    println!("SHA-256:        {}", built.hash);
    println!();
    println!("Topics:          {}", report.topics);
    println!("Vocabulary:      {}", report.vocabulary);
    println!("Phrases:         {}", report.phrases);
    println!("Hundred seconds: {}", report.hundred_seconds);
    println!(
        "Assets copied:   {} ({} bytes)",
        report.assets_copied, report.bytes_copied
    );

    if !report.copy_failures.is_empty() {
        println!("Assets skipped:  {}", report.copy_failures.len());
        for failure in &report.copy_failures {
            println!("  {}: {}", failure.logical_name, failure.reason);
        }
    }
}

async fn select_pack(
    pack_id: Option<String>,
    list: bool,
    bundle_dir: Option<PathBuf>,
) -> Result<()> {
    let cfg = config::config()?;
    let bundle_dir = bundle_dir.unwrap_or_else(|| cfg.bundled.clone());
    let catalog = cfg.catalog.clone();

    if list {
        let current = PackSelection::load(&bundle_dir)?.map(|s| s.main_pack_id);
        println!("{:<3}{:<20} {:<26} {}", "", "PACK", "LABEL", "ARCHIVE");
        println!("{}", "-".repeat(80));
        for entry in catalog.entries() {
            let marker = if current.as_deref() == Some(entry.pack_id.as_str()) {
                "*"
            } else {
                ""
            };
            println!(
                "{:<3}{:<20} {:<26} {}",
                marker,
                entry.pack_id,
                truncate(&entry.label, 26),
                entry.archive.display()
            );
        }
        return Ok(());
    }

    let pack_id = match pack_id {
        Some(id) => id,
        None => catalog
            .default_pack()
            .map(|e| e.pack_id.clone())
            .context("Pack catalog is empty")?,
    };

    let dir = bundle_dir.clone();
    let selection = blocking(move || {
        catalog
            .select(&pack_id, &dir)
            .with_context(|| format!("Failed to select pack: {}", pack_id))
    })
    .await?;

    println!("Main pack: {}", selection.main_pack_id);
    println!(
        "Archive:   {}",
        bundle_dir.join(pack::archive_file_name(pack::ACTIVE_PACK)).display()
    );
    Ok(())
}

/// Main pack id: explicit, else the bundle's selection, else configured
fn main_pack_id(explicit: Option<String>, bundle_dir: &Path, configured: &str) -> Result<String> {
    if let Some(id) = explicit {
        return Ok(id);
    }
    Ok(PackSelection::load(bundle_dir)?
        .map(|s| s.main_pack_id)
        .unwrap_or_else(|| configured.to_string()))
}

async fn inspect_legacy(legacy_root: PathBuf, dialect: Option<Dialect>) -> Result<()> {
    let options = ConvertOptions {
        dialect: dialect.unwrap_or(config::config()?.build.dialect),
    };
    let conversion =
        blocking(move || legacy::convert(&legacy_root, options).context("convert failed")).await?;

    println!("Source: {}", conversion.origin);
    println!();
    println!("{:<20} {:<16} {:<10} {:<30} {:>6}", "ID", "TYPE", "KIND", "NAME", "ITEMS");
    println!("{}", "-".repeat(86));

    for topic in &conversion.topics {
        let items = match topic.topic_type {
            TopicType::Vocabulary => conversion
                .vocabulary_by_topic
                .get(&topic.id)
                .map_or(0, Vec::len),
            TopicType::Phrases => conversion.phrases_by_topic.get(&topic.id).map_or(0, Vec::len),
            TopicType::HundredSeconds => conversion.hundred_seconds.len(),
        };
        let name = format!("{} / {}", topic.name_native, topic.name_sorbian);
        println!(
            "{:<20} {:<16} {:<10} {:<30} {:>6}",
            topic.id,
            topic.topic_type.as_str(),
            topic.kind.as_str(),
            truncate(&name, 30),
            items
        );
    }

    println!();
    println!("Hundred-seconds items: {}", conversion.hundred_seconds.len());
    println!(
        "Assets resolved: {} ({} bytes)",
        conversion.assets.len(),
        conversion.assets.total_bytes()
    );

    let unresolved = conversion.unresolved_assets();
    if !unresolved.is_empty() {
        println!("Unresolved assets: {}", unresolved.len());
        for name in unresolved {
            println!("  {}", name);
        }
    }

    Ok(())
}

/// `<dir>/<stem>-hash.sha256` for `<dir>/<stem>.zip`
fn default_hash_file(archive: &Path) -> PathBuf {
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    archive.with_file_name(pack::hash_file_name(&stem))
}

async fn verify_archive(archive: PathBuf, hash_file: Option<PathBuf>) -> Result<()> {
    let hash_file = hash_file.unwrap_or_else(|| default_hash_file(&archive));

    let (expected, actual) = blocking(move || {
        let expected = pack::read_hash_file(&hash_file)?;
        let actual = pack::sha256_file(&archive)
            .with_context(|| format!("Failed to hash archive: {}", archive.display()))?;
        Ok((expected, actual))
    })
    .await?;

    if expected != actual {
        anyhow::bail!("Hash mismatch: sidecar has {}, archive is {}", expected, actual);
    }

    println!("OK {}", actual);
    Ok(())
}

async fn provision(
    bundle_dir: Option<PathBuf>,
    pack_id: Option<String>,
    profile: Option<RuntimeProfile>,
) -> Result<()> {
    let cfg = config::config()?;
    let bundled_dir = bundle_dir.unwrap_or_else(|| cfg.bundled.clone());
    let options = BootstrapOptions {
        main_pack: main_pack_id(pack_id, &bundled_dir, &cfg.main_pack)?,
        bundled_dir,
        packs_dir: config::paths::packs_dir()?,
        profile: profile.unwrap_or(cfg.profile),
        mock_pack: cfg.mock_pack.clone(),
    };

    let booted = blocking(move || runtime::bootstrap(&options).context("Bootstrap failed")).await?;

    let outcome = &booted.outcome;
    println!("Pack:      {}", outcome.pack_id);
    println!(
        "Extracted: {}",
        if outcome.extracted { "yes" } else { "no (up to date)" }
    );
    if let Some(reason) = &outcome.fallback_reason {
        println!("Fallback:  main pack unavailable: {}", reason);
    }
    if let Some(active) = booted.manager.active_pack() {
        println!("Directory: {}", active.dir.display());
    }
    println!("Topics:    {}", booted.content.topics.len());

    Ok(())
}

fn scan_configured_packs() -> Result<PackIndex> {
    let dirs = vec![config::paths::bundled_dir()?, config::paths::packs_dir()?];
    Ok(PackIndex::scan(&dirs))
}

async fn list_packs() -> Result<()> {
    let index = blocking(scan_configured_packs).await?;

    if index.is_empty() {
        println!("No packs found. Use 'contentpack provision' to install one.");
        return Ok(());
    }

    println!(
        "{:<16} {:<28} {:<8} {:<22} {}",
        "PACK", "NAME", "VERSION", "MODULES", "DIRECTORY"
    );
    println!("{}", "-".repeat(100));

    for summary in index.packs() {
        let mut modules = Vec::new();
        if summary.modules.vocabulary {
            modules.push("vocab");
        }
        if summary.modules.phrases {
            modules.push("phrases");
        }
        if summary.modules.hundred_seconds {
            modules.push("100s");
        }

        println!(
            "{:<16} {:<28} {:<8} {:<22} {}",
            summary.pack_id,
            truncate(&summary.display_name, 28),
            summary.content_version,
            modules.join(","),
            summary.dir.display()
        );
    }

    println!("\nTotal: {} packs", index.len());
    Ok(())
}

async fn show_pack(pack_id: &str, list_topics: bool) -> Result<()> {
    let id = pack_id.to_string();
    let content = blocking(move || {
        let manager = PackManager::new(scan_configured_packs()?);
        manager
            .load_pack_content(&id)
            .with_context(|| format!("Failed to load pack: {}", id))
    })
    .await?;

    let modules = content.modules();
    println!("Pack: {}", content.pack_id);
    println!();
    println!(
        "Vocabulary:      {:<5} {} topics, {} items",
        modules.vocabulary,
        content.topics_of_type(TopicType::Vocabulary).len(),
        content.vocabulary_count()
    );
    println!(
        "Phrases:         {:<5} {} topics, {} items",
        modules.phrases,
        content.topics_of_type(TopicType::Phrases).len(),
        content.phrase_count()
    );
    println!(
        "Hundred seconds: {:<5} {} items",
        modules.hundred_seconds,
        content.hundred_seconds().len()
    );

    if list_topics {
        println!();
        for topic in &content.topics {
            println!(
                "  {:>3}. [{}] {} / {}",
                topic.ord,
                topic.topic_type,
                topic.name_native,
                topic.name_sorbian
            );
        }
    }

    Ok(())
}

async fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("contentpack configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:            {}", config::paths::home()?.display());
    println!("  Bundled:         {}", cfg.bundled.display());
    println!("  Packs:           {}", config::paths::packs_dir()?.display());
    println!("  Provision lock:  {}", config::paths::provision_lock()?.display());
    println!();
    println!("Runtime:");
    println!("  Profile:         {}", cfg.profile);
    println!("  Main pack:       {}", cfg.main_pack);
    println!(
        "    archive:       {}",
        config::paths::bundled_archive(&cfg.main_pack)?.display()
    );
    println!(
        "    hash:          {}",
        config::paths::bundled_hash(&cfg.main_pack)?.display()
    );
    println!("  Mock pack:       {}", cfg.mock_pack);
    println!();
    println!("Catalog:");
    for entry in cfg.catalog.entries() {
        println!("  {:<16} {}", entry.pack_id, entry.archive.display());
    }
    println!();
    println!("Build defaults:");
    println!(
        "  Display name:    {}",
        cfg.build.display_name.as_deref().unwrap_or("(pack id)")
    );
    println!("  Content version: {}", cfg.build.content_version);
    println!("  Dialect:         {}", cfg.build.dialect);

    Ok(())
}

/// Truncate to at most `max` characters, marking the cut with "..."
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
