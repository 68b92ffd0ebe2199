//! Shared fixtures: minimal legacy trees written into temporary directories.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use contentpack::{convert, BuiltPack, ConvertOptions, PackBuilder, PackMetadata};
use tempfile::TempDir;

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// A legacy app checkout: content XML under `<app>/content`, media under
/// `<app>/res/raw` and `<app>/content/vocabulary/{images,icons}`
pub struct LegacyTree {
    temp: TempDir,
    root: PathBuf,
}

impl LegacyTree {
    /// Legacy content root handed to the converter
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Directory holding `res/`
    pub fn app(&self) -> &Path {
        self.temp.path()
    }
}

/// One vocabulary topic (two vocables, the second without a sound) and one
/// phrase topic (a phrase and a separator).
pub fn android_tree() -> LegacyTree {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("content");

    write(
        &root,
        "vocabulary/topic_1.xml",
        r#"<?xml version="1.0" encoding="utf-8"?>
<topic nameGerman="Familie" nameSorbian="Swójba" icon="family.png">
  <vocabulary>
    <vocable textGerman="Mutter" textSorbian="mać" soundSorbian="mama" img="mother.png"/>
    <vocable textGerman="Vater" textSorbian="nan" img="mother.png" ignoreAssign="true"/>
  </vocabulary>
</topic>"#,
    );
    write(
        &root,
        "phrases/topic_1.xml",
        r#"<?xml version="1.0" encoding="utf-8"?>
<topic>
  <topicNameGerman>Begrüßung</topicNameGerman>
  <topicNameSorbian>Postrow</topicNameSorbian>
  <phrases>
    <phrase>
      <germanText>Guten Tag</germanText>
      <sorbianText>Dobry dźeń</sorbianText>
      <sorbianSound>dobry_dzen</sorbianSound>
      <infoText>formell</infoText>
    </phrase>
    <phrase type="separator">
      <germanText>Abschied</germanText>
      <sorbianText>Rozžohnowanje</sorbianText>
    </phrase>
  </phrases>
</topic>"#,
    );

    write(temp.path(), "res/raw/mama.mp3", "mama-audio");
    write(temp.path(), "res/raw/dobry_dzen.mp3", "dobry-dzen-audio");
    write(&root, "vocabulary/icons/family.png", "family-icon");
    write(&root, "vocabulary/images/mother.png", "mother-image");

    LegacyTree { temp, root }
}

/// Convert and build `pack_id` from `legacy` into `out`
pub fn build_pack(legacy: &Path, out: &Path, pack_id: &str) -> BuiltPack {
    let conversion = convert(legacy, ConvertOptions::default()).unwrap();
    PackBuilder::new(out)
        .build(&conversion, &PackMetadata::new(pack_id))
        .unwrap()
}

/// Build a pack into `<bundled>/` and return the bundled dir
pub fn bundled_pack(temp: &TempDir, pack_id: &str) -> PathBuf {
    let legacy = android_tree();
    let bundled = temp.path().join("bundled");
    std::fs::create_dir_all(&bundled).unwrap();
    build_pack(legacy.path(), &bundled, pack_id);
    bundled
}
