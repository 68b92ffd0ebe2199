//! Text and file-name normalization shared by both legacy parsers.

use std::path::{Path, PathBuf};

use crate::assets::AssetCategory;

/// Collapse runs of whitespace to a single space and trim.
///
/// Non-breaking and other fixed-width spaces count as whitespace, and the
/// backslash escapes Android string resources use for quotes are removed.
pub fn normalize_text(text: &str) -> String {
    let cleaned: String = text
        .replace("\\'", "'")
        .replace("\\\"", "\"")
        .chars()
        .map(|c| match c {
            '\u{00a0}' | '\u{2007}' | '\u{202f}' | '\u{feff}' => ' ',
            other => other,
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Legacy sources use `/` or `-` for "intentionally left blank"
pub fn is_placeholder(text: &str) -> bool {
    matches!(text.trim(), "" | "/" | "-")
}

/// Lenient boolean attribute parsing; anything unrecognized is false
pub fn parse_bool(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes")
    )
}

/// First run of ASCII digits in a file name (`topic12.xml` -> 12)
pub fn numeric_token(name: &str) -> Option<u64> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let digits: String = name[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Sort files by the numeric token in their name, lexical order on ties.
/// Names without a number sort after all numbered ones.
pub fn sort_by_numeric_token(paths: &mut [PathBuf]) {
    paths.sort_by_key(|path| {
        let name = file_name(path);
        (numeric_token(&name).unwrap_or(u64::MAX), name)
    });
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Logical asset names to try for a raw legacy media reference.
///
/// Accepts plain file names, relative paths and Android resource references
/// (`@raw/mama`, `@drawable/mother`). Only the file name survives; a
/// reference without extension expands to one candidate per default
/// extension of the category.
pub fn asset_candidates(raw: &str, category: AssetCategory) -> Vec<String> {
    let trimmed = raw.trim();
    let reference = match trimmed.strip_prefix('@') {
        Some(rest) => rest.split_once('/').map(|(_, name)| name).unwrap_or(rest),
        None => trimmed,
    };

    let name = file_name(Path::new(reference));
    if name.is_empty() || name == ".." {
        return Vec::new();
    }

    let namespace = category.namespace();
    if Path::new(&name).extension().is_some() {
        vec![format!("{}/{}", namespace, name)]
    } else {
        category
            .default_extensions()
            .iter()
            .map(|ext| format!("{}/{}.{}", namespace, name, ext))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Dobry \n\t dźeń  "), "Dobry dźeń");
        assert_eq!(normalize_text("Guten\u{00a0}Tag"), "Guten Tag");
        assert_eq!(normalize_text("I\\'m here"), "I'm here");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn test_placeholders() {
        assert!(is_placeholder("/"));
        assert!(is_placeholder("  "));
        assert!(!is_placeholder("Alfabet"));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool(Some("true")));
        assert!(parse_bool(Some(" YES ")));
        assert!(parse_bool(Some("1")));
        assert!(!parse_bool(Some("false")));
        assert!(!parse_bool(Some("maybe")));
        assert!(!parse_bool(None));
    }

    #[test]
    fn test_numeric_sort() {
        let mut paths = vec![
            PathBuf::from("topic10.xml"),
            PathBuf::from("extra.xml"),
            PathBuf::from("topic2.xml"),
            PathBuf::from("b_topic1.xml"),
            PathBuf::from("a_topic1.xml"),
        ];
        sort_by_numeric_token(&mut paths);

        let names: Vec<String> = paths.iter().map(|p| file_name(p)).collect();
        assert_eq!(
            names,
            vec!["a_topic1.xml", "b_topic1.xml", "topic2.xml", "topic10.xml", "extra.xml"]
        );
    }

    #[test]
    fn test_asset_candidates() {
        assert_eq!(
            asset_candidates("mama.mp3", AssetCategory::Audio),
            vec!["audio/mama.mp3"]
        );
        assert_eq!(
            asset_candidates("@drawable/mother", AssetCategory::Image),
            vec![
                "images/mother.png",
                "images/mother.jpg",
                "images/mother.jpeg",
                "images/mother.webp"
            ]
        );
        assert_eq!(
            asset_candidates("res/raw/mama.ogg", AssetCategory::Audio),
            vec!["audio/mama.ogg"]
        );
        assert!(asset_candidates("../", AssetCategory::Audio).is_empty());
    }
}
