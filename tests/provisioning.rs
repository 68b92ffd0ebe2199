//! Provisioning Integration Tests
//!
//! Hash-gated extraction, re-extraction on change, the development-only
//! mock fallback, and bootstrapping from a selected catalog pack.

mod common;

use contentpack::pack::{build_mock_pack, CatalogEntry, PackCatalog, MOCK_PACK_ID};
use contentpack::runtime::{provision_with_fallback, HASH_MARKER};
use contentpack::{
    bootstrap, BootstrapError, BootstrapOptions, BundledPack, PackError, PackProvisioner,
    RuntimeProfile,
};
use filetime::FileTime;
use tempfile::TempDir;

#[test]
fn test_second_provision_is_noop() {
    let temp = TempDir::new().unwrap();
    let bundled = common::bundled_pack(&temp, "t1");
    let bundle = BundledPack::in_dir(&bundled, "t1");
    let provisioner = PackProvisioner::new(temp.path().join("packs"));

    assert!(provisioner.provision_bundle(&bundle).unwrap());

    let pack_dir = provisioner.pack_dir("t1");
    let marker = pack_dir.join(HASH_MARKER);
    let before = FileTime::from_last_modification_time(&std::fs::metadata(&marker).unwrap());

    // A file the extraction would have wiped
    std::fs::write(pack_dir.join("sentinel"), "kept").unwrap();

    assert!(!provisioner.provision_bundle(&bundle).unwrap());

    let after = FileTime::from_last_modification_time(&std::fs::metadata(&marker).unwrap());
    assert_eq!(before, after);
    assert!(pack_dir.join("sentinel").is_file());
}

#[test]
fn test_changed_archive_is_reextracted() {
    let temp = TempDir::new().unwrap();
    let legacy = common::android_tree();
    let bundled = temp.path().join("bundled");
    let first = common::build_pack(legacy.path(), &bundled, "t1");

    let provisioner = PackProvisioner::new(temp.path().join("packs"));
    let bundle = BundledPack::in_dir(&bundled, "t1");
    assert!(provisioner.provision_bundle(&bundle).unwrap());
    std::fs::write(provisioner.pack_dir("t1").join("sentinel"), "stale").unwrap();

    // New content, new hash
    common::write(
        legacy.path(),
        "phrases/topic_2.xml",
        r#"<topic nameGerman="Wetter" nameSorbian="Wjedro">
             <phrases>
               <phrase><germanText>Es regnet</germanText><sorbianText>Dešćik</sorbianText></phrase>
             </phrases>
           </topic>"#,
    );
    let second = common::build_pack(legacy.path(), &bundled, "t1");
    assert_ne!(first.hash, second.hash);

    assert!(provisioner.provision_bundle(&bundle).unwrap());
    assert!(!provisioner.pack_dir("t1").join("sentinel").exists());
    assert_eq!(provisioner.installed_hash("t1"), Some(second.hash));
}

#[test]
fn test_missing_hash_file() {
    let temp = TempDir::new().unwrap();
    let bundled = common::bundled_pack(&temp, "t1");
    std::fs::remove_file(bundled.join("t1-hash.sha256")).unwrap();

    let provisioner = PackProvisioner::new(temp.path().join("packs"));
    let result = provisioner.provision_bundle(&BundledPack::in_dir(&bundled, "t1"));

    assert!(matches!(result, Err(PackError::HashUnavailable { .. })));
    assert!(!provisioner.pack_dir("t1").exists());
}

#[test]
fn test_development_falls_back_to_mock() {
    let temp = TempDir::new().unwrap();
    let bundled = common::bundled_pack(&temp, "mock");
    let provisioner = PackProvisioner::new(temp.path().join("packs"));

    let outcome = provision_with_fallback(
        &provisioner,
        &BundledPack::in_dir(&bundled, "main"),
        &BundledPack::in_dir(&bundled, "mock"),
        RuntimeProfile::Development,
    )
    .unwrap();

    assert_eq!(outcome.pack_id, "mock");
    assert!(outcome.extracted);
    assert!(outcome.used_fallback());
}

#[test]
fn test_production_has_no_fallback() {
    let temp = TempDir::new().unwrap();
    let bundled = common::bundled_pack(&temp, "mock");
    let provisioner = PackProvisioner::new(temp.path().join("packs"));

    let result = provision_with_fallback(
        &provisioner,
        &BundledPack::in_dir(&bundled, "main"),
        &BundledPack::in_dir(&bundled, "mock"),
        RuntimeProfile::Production,
    );

    assert!(matches!(
        result,
        Err(BootstrapError::MainPackUnavailable { .. })
    ));
    assert!(!provisioner.pack_dir("mock").exists());
}

#[test]
fn test_no_pack_available_in_development() {
    let temp = TempDir::new().unwrap();
    let bundled = temp.path().join("bundled");
    std::fs::create_dir_all(&bundled).unwrap();

    let options = BootstrapOptions {
        bundled_dir: bundled,
        packs_dir: temp.path().join("packs"),
        profile: RuntimeProfile::Development,
        main_pack: "main".to_string(),
        mock_pack: "mock".to_string(),
    };

    assert!(matches!(
        bootstrap(&options),
        Err(BootstrapError::NoPackAvailable { .. })
    ));
}

#[test]
fn test_bootstrap_loads_main_pack() {
    let temp = TempDir::new().unwrap();
    let bundled = common::bundled_pack(&temp, "main");

    let options = BootstrapOptions {
        bundled_dir: bundled,
        packs_dir: temp.path().join("packs"),
        profile: RuntimeProfile::Production,
        main_pack: "main".to_string(),
        mock_pack: "mock".to_string(),
    };

    let first = bootstrap(&options).unwrap();
    assert_eq!(first.outcome.pack_id, "main");
    assert!(first.outcome.extracted);
    assert!(!first.outcome.used_fallback());
    assert_eq!(first.content.topics.len(), 2);
    assert_eq!(
        first.manager.active_pack().unwrap().dir,
        temp.path().join("packs").join("main")
    );

    let second = bootstrap(&options).unwrap();
    assert!(!second.outcome.extracted);
}

#[test]
fn test_bootstrap_from_selected_pack() {
    let temp = TempDir::new().unwrap();
    let converted = common::bundled_pack(&temp, "de-dsb-pack");
    let catalog = PackCatalog::new(vec![
        CatalogEntry::in_dir(&converted, "de-hsb-pack", "Obersorbisch"),
        CatalogEntry::in_dir(&converted, "de-dsb-pack", "Niedersorbisch"),
    ]);
    let bundled = temp.path().join("app-bundle");
    catalog.select("de-dsb-pack", &bundled).unwrap();
    assert!(!bundled.join("de-dsb-pack.zip").exists());

    let options = BootstrapOptions {
        bundled_dir: bundled,
        packs_dir: temp.path().join("packs"),
        profile: RuntimeProfile::Production,
        main_pack: "de-dsb-pack".to_string(),
        mock_pack: MOCK_PACK_ID.to_string(),
    };

    let booted = bootstrap(&options).unwrap();
    assert_eq!(booted.outcome.pack_id, "de-dsb-pack");
    assert!(booted.outcome.extracted);
    assert_eq!(booted.content.topics.len(), 2);
    assert!(temp.path().join("packs/de-dsb-pack/pack.json").is_file());
}

#[test]
fn test_development_falls_back_to_built_mock_pack() {
    let temp = TempDir::new().unwrap();
    let bundled = temp.path().join("bundled");
    build_mock_pack(&bundled, None).unwrap();

    let options = BootstrapOptions {
        bundled_dir: bundled,
        packs_dir: temp.path().join("packs"),
        profile: RuntimeProfile::Development,
        main_pack: "de-hsb-pack".to_string(),
        mock_pack: MOCK_PACK_ID.to_string(),
    };

    let booted = bootstrap(&options).unwrap();
    assert_eq!(booted.outcome.pack_id, MOCK_PACK_ID);
    assert!(booted.outcome.used_fallback());
    assert_eq!(booted.content.topics.len(), 2);
    assert_eq!(booted.content.vocabulary_count(), 2);
    assert_eq!(booted.content.hundred_seconds().len(), 1);
}
