//! Determinism Integration Tests
//!
//! Ids and archive bytes depend only on legacy content.

mod common;

use std::collections::BTreeSet;

use contentpack::{convert, ConversionResult, ConvertOptions};
use tempfile::TempDir;

fn all_ids(conversion: &ConversionResult) -> BTreeSet<String> {
    let mut ids: BTreeSet<String> = conversion.topics.iter().map(|t| t.id.clone()).collect();
    ids.extend(conversion.vocabulary_by_topic.values().flatten().map(|v| v.id.clone()));
    ids.extend(conversion.phrases_by_topic.values().flatten().map(|p| p.id.clone()));
    ids.extend(conversion.hundred_seconds.iter().map(|h| h.id.clone()));
    ids
}

#[test]
fn test_conversion_ids_are_stable() {
    let legacy = common::android_tree();
    common::write(
        legacy.path(),
        "in_hundred_seconds.xml",
        r#"<inHundredSeconds><item><name>Markt</name><sound>mama</sound></item></inHundredSeconds>"#,
    );

    let first = convert(legacy.path(), ConvertOptions::default()).unwrap();
    let second = convert(legacy.path(), ConvertOptions::default()).unwrap();

    let ids = all_ids(&first);
    // 2 topics + 2 vocables + 2 phrases + 1 hundred-seconds item
    assert_eq!(ids.len(), 7);
    assert_eq!(ids, all_ids(&second));
    assert!(ids.iter().all(|id| id.len() == 18 && id.as_bytes()[1] == b'_'));
}

#[test]
fn test_ids_survive_a_moved_tree() {
    let first_tree = common::android_tree();
    let second_tree = common::android_tree();

    let first = convert(first_tree.path(), ConvertOptions::default()).unwrap();
    let second = convert(second_tree.path(), ConvertOptions::default()).unwrap();

    assert_eq!(all_ids(&first), all_ids(&second));
}

#[test]
fn test_duplicate_vocables_get_distinct_ids() {
    let legacy = common::android_tree();
    common::write(
        legacy.path(),
        "vocabulary/topic_2.xml",
        r#"<topic nameGerman="Zahlen" nameSorbian="Ličby">
             <vocabulary>
               <vocable textGerman="eins" textSorbian="jedyn"/>
               <vocable textGerman="eins" textSorbian="jedyn"/>
             </vocabulary>
           </topic>"#,
    );

    let conversion = convert(legacy.path(), ConvertOptions::default()).unwrap();
    let numbers = conversion
        .topics
        .iter()
        .find(|t| t.name_native == "Zahlen")
        .unwrap();
    let items = &conversion.vocabulary_by_topic[&numbers.id];

    assert_eq!(items.len(), 2);
    assert_ne!(items[0].id, items[1].id);
}

#[test]
fn test_rebuild_reproduces_archive_hash() {
    let legacy = common::android_tree();
    let first_out = TempDir::new().unwrap();
    let second_out = TempDir::new().unwrap();

    let first = common::build_pack(legacy.path(), first_out.path(), "t1");
    let second = common::build_pack(legacy.path(), second_out.path(), "t1");

    assert_eq!(first.hash, second.hash);
}
