//! Schema-tolerant reading of a pack's content database.
//!
//! Packs outlive the builder that produced them. Before selecting a column
//! added after the first schema (`kind`, item `ord`, `info_text`) the loader
//! checks the table's column list and substitutes a fallback:
//!
//! | Missing column           | Fallback                         |
//! |--------------------------|----------------------------------|
//! | `topics.kind`            | `topic_kind`, else name heuristic |
//! | `ord` (any table)        | insertion order (`rowid`)        |
//! | `phrases.info_text`      | none                             |
//! | `phrases.item_type`      | normal                           |

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, instrument, warn};

use crate::domain::{
    HundredSecItem, Modules, PhraseItem, PhraseType, Topic, TopicKind, TopicType, VocabItem,
};
use crate::error::{PackError, Result};
use crate::legacy::infer_kind;
use crate::pack::schema::table_columns;

use super::content::PackContent;

/// Open a content database read-only; a missing file is `ContentDatabaseMissing`
pub fn open_read_only(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(PackError::ContentDatabaseMissing {
            path: path.to_path_buf(),
        });
    }
    Ok(Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?)
}

/// Load every table of a pack database
#[instrument(skip(db_path, modules), fields(path = %db_path.display()))]
pub fn load_content(pack_id: &str, db_path: &Path, modules: Modules) -> Result<PackContent> {
    let conn = open_read_only(db_path)?;

    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    debug!(schema_version = version, "Opened content database");

    let content = PackContent {
        pack_id: pack_id.to_string(),
        modules,
        topics: load_topics(&conn)?,
        vocabulary_by_topic: load_vocabulary(&conn)?,
        phrases_by_topic: load_phrases(&conn)?,
        hundred_seconds: load_hundred_seconds(&conn)?,
    };

    debug!(
        topics = content.topics.len(),
        vocabulary = content.vocabulary_count(),
        phrases = content.phrase_count(),
        hundred_seconds = content.hundred_seconds.len(),
        "Loaded pack content"
    );
    Ok(content)
}

/// Logical name to pack-relative path, from the `assets` table.
/// Empty when the table does not exist.
pub fn read_asset_paths(conn: &Connection) -> Result<HashMap<String, String>> {
    if Columns::load(conn, "assets")?.is_empty() {
        return Ok(HashMap::new());
    }

    let mut stmt = conn.prepare("SELECT logical_name, relative_path FROM assets")?;
    let paths = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<HashMap<String, String>, _>>()?;
    Ok(paths)
}

/// Column set of one table
struct Columns(HashSet<String>);

impl Columns {
    fn load(conn: &Connection, table: &str) -> Result<Self> {
        Ok(Self(table_columns(conn, table)?))
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The column itself, or a NULL literal when it is absent
    fn or_null<'a>(&self, name: &'a str) -> &'a str {
        if self.0.contains(name) {
            name
        } else {
            "NULL"
        }
    }

    fn first_of<'a>(&self, names: &[&'a str]) -> &'a str {
        names
            .iter()
            .copied()
            .find(|n| self.0.contains(*n))
            .unwrap_or("NULL")
    }

    /// Sequence column, falling back to insertion order
    fn ord(&self) -> &'static str {
        if self.0.contains("ord") {
            "ord"
        } else {
            "rowid"
        }
    }
}

fn load_topics(conn: &Connection) -> Result<Vec<Topic>> {
    let columns = Columns::load(conn, "topics")?;
    let kind = columns.first_of(&["kind", "topic_kind"]);
    if kind == "NULL" {
        debug!("topics table has no kind column, inferring from names");
    }

    let sql = format!(
        "SELECT id, type, {kind}, name_native, name_target, icon, audio_intro, {ord}
         FROM topics ORDER BY {ord}, rowid",
        kind = kind,
        ord = columns.ord(),
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                Topic {
                    id: row.get(0)?,
                    topic_type: TopicType::Vocabulary,
                    kind: TopicKind::Normal,
                    name_native: row.get(3)?,
                    name_sorbian: row.get(4)?,
                    icon: row.get(5)?,
                    audio_intro: row.get(6)?,
                    ord: row.get(7)?,
                },
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut topics = Vec::with_capacity(rows.len());
    for (stored_type, stored_kind, mut topic) in rows {
        let Ok(topic_type) = TopicType::from_str(&stored_type) else {
            warn!(topic_id = %topic.id, stored_type = %stored_type, "Skipping topic of unknown type");
            continue;
        };
        topic.topic_type = topic_type;
        topic.kind = match stored_kind.as_deref().filter(|k| !k.is_empty()) {
            Some(stored) => TopicKind::from_stored(stored),
            None => infer_kind(&topic.name_native),
        };
        topics.push(topic);
    }

    Ok(topics)
}

fn load_vocabulary(conn: &Connection) -> Result<BTreeMap<String, Vec<VocabItem>>> {
    let columns = Columns::load(conn, "vocabulary")?;
    let sql = format!(
        "SELECT id, topic_id, {ord}, native, target, img, audio, ignore_assign, ignore_write
         FROM vocabulary ORDER BY {ord}, rowid",
        ord = columns.ord(),
    );

    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map([], |row| {
            Ok(VocabItem {
                id: row.get(0)?,
                topic_id: row.get(1)?,
                ord: row.get(2)?,
                native: row.get(3)?,
                sorbian: row.get(4)?,
                image: row.get(5)?,
                audio_sorbian: row.get(6)?,
                ignore_assign: row.get::<_, Option<bool>>(7)?.unwrap_or(false),
                ignore_write: row.get::<_, Option<bool>>(8)?.unwrap_or(false),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(group_by_topic(items, |item| &item.topic_id))
}

fn load_phrases(conn: &Connection) -> Result<BTreeMap<String, Vec<PhraseItem>>> {
    let columns = Columns::load(conn, "phrases")?;
    let sql = format!(
        "SELECT id, topic_id, {ord}, native, target, audio_native, audio_target, {item_type}, {info}
         FROM phrases ORDER BY {ord}, rowid",
        ord = columns.ord(),
        item_type = columns.or_null("item_type"),
        info = columns.or_null("info_text"),
    );

    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map([], |row| {
            let item_type: Option<String> = row.get(7)?;
            Ok(PhraseItem {
                id: row.get(0)?,
                topic_id: row.get(1)?,
                ord: row.get(2)?,
                native: row.get(3)?,
                sorbian: row.get(4)?,
                audio_native: row.get(5)?,
                audio_sorbian: row.get(6)?,
                item_type: item_type
                    .as_deref()
                    .map(PhraseType::from_stored)
                    .unwrap_or_default(),
                info_text: row.get(8)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(group_by_topic(items, |item| &item.topic_id))
}

fn load_hundred_seconds(conn: &Connection) -> Result<Vec<HundredSecItem>> {
    let columns = Columns::load(conn, "hundred_seconds")?;
    let sql = format!(
        "SELECT id, {ord}, name, audio, image FROM hundred_seconds ORDER BY {ord}, rowid",
        ord = columns.ord(),
    );

    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map([], |row| {
            Ok(HundredSecItem {
                id: row.get(0)?,
                ord: row.get(1)?,
                name: row.get(2)?,
                audio: row.get(3)?,
                image: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(items)
}

/// Group rows by owning topic, keeping their query order within each group
fn group_by_topic<T>(items: Vec<T>, topic_of: impl Fn(&T) -> &String) -> BTreeMap<String, Vec<T>> {
    let mut grouped: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for item in items {
        grouped.entry(topic_of(&item).clone()).or_default().push(item);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::schema::create_schema;
    use tempfile::TempDir;

    #[test]
    fn test_missing_database() {
        let temp = TempDir::new().unwrap();
        let result = load_content("t1", &temp.path().join("content.db"), Modules::default());
        assert!(matches!(result, Err(PackError::ContentDatabaseMissing { .. })));
    }

    #[test]
    fn test_current_schema_round_trip_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("content.db");
        {
            let conn = Connection::open(&path).unwrap();
            create_schema(&conn).unwrap();
            conn.execute_batch(
                "INSERT INTO topics (id, type, kind, name_native, name_target, ord)
                   VALUES ('t_b', 'phrases', 'normal', 'Begrüßung', 'Postrow', 2),
                          ('t_a', 'vocabulary', 'alphabet', 'Alphabet', 'Alfabet', 1);
                 INSERT INTO vocabulary (id, topic_id, ord, native, target)
                   VALUES ('v_2', 't_a', 2, 'B', 'B'), ('v_1', 't_a', 1, 'A', 'A');
                 INSERT INTO phrases (id, topic_id, ord, native, target, item_type, info_text)
                   VALUES ('p_1', 't_b', 1, 'Hallo', 'Witaj', 'normal', 'informal'),
                          ('p_2', 't_b', 2, 'Abend', '', 'separator', NULL);
                 INSERT INTO hundred_seconds (id, ord, name, audio)
                   VALUES ('h_1', 1, 'Markt', 'audio/markt.mp3');",
            )
            .unwrap();
        }

        let content = load_content("t1", &path, Modules::default()).unwrap();
        assert_eq!(content.topics[0].id, "t_a");
        assert_eq!(content.topics[0].kind, TopicKind::Alphabet);
        assert_eq!(content.topics[1].topic_type, TopicType::Phrases);

        let vocab = content.vocabulary_for("t_a");
        assert_eq!(vocab[0].id, "v_1");
        assert_eq!(vocab[1].id, "v_2");

        let phrases = content.phrases_for("t_b");
        assert_eq!(phrases[0].info_text.as_deref(), Some("informal"));
        assert_eq!(phrases[1].item_type, PhraseType::Separator);
        assert_eq!(content.hundred_seconds()[0].audio, "audio/markt.mp3");
    }

    #[test]
    fn test_asset_paths_without_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(read_asset_paths(&conn).unwrap().is_empty());
    }
}
