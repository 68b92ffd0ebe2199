//! Content database schema and record insertion.
//!
//! Column names are part of the runtime contract; later additions (`kind`,
//! `ord` on item tables) are optional for readers so packs built before
//! them stay loadable.

use std::collections::HashSet;

use rusqlite::{params, Connection};
use tracing::debug;

use crate::assets::AssetEntry;
use crate::domain::{HundredSecItem, PhraseItem, Topic, VocabItem};
use crate::error::Result;

/// Stamped into `PRAGMA user_version`
pub const SCHEMA_VERSION: i32 = 2;

/// Create all tables in an empty database
pub fn create_schema(conn: &Connection) -> Result<()> {
    debug!(version = SCHEMA_VERSION, "Creating content schema");

    conn.execute_batch(
        "
        CREATE TABLE topics (
            id TEXT PRIMARY KEY,
            type TEXT NOT NULL CHECK(type IN ('vocabulary', 'phrases', 'hundredSeconds')),
            kind TEXT NOT NULL DEFAULT 'normal',
            name_native TEXT NOT NULL,
            name_target TEXT NOT NULL,
            icon TEXT,
            audio_intro TEXT,
            ord INTEGER NOT NULL
        );

        CREATE INDEX idx_topics_type ON topics(type, ord);

        -- Foreign keys are declared for documentation; enforcement stays off
        CREATE TABLE vocabulary (
            id TEXT PRIMARY KEY,
            topic_id TEXT NOT NULL,
            ord INTEGER NOT NULL,
            native TEXT NOT NULL,
            target TEXT NOT NULL,
            img TEXT,
            audio TEXT,
            ignore_assign INTEGER NOT NULL DEFAULT 0,
            ignore_write INTEGER NOT NULL DEFAULT 0,
            UNIQUE(topic_id, ord),
            FOREIGN KEY (topic_id) REFERENCES topics(id)
        );

        CREATE INDEX idx_vocabulary_topic ON vocabulary(topic_id, ord);

        CREATE TABLE phrases (
            id TEXT PRIMARY KEY,
            topic_id TEXT NOT NULL,
            ord INTEGER NOT NULL,
            native TEXT NOT NULL,
            target TEXT NOT NULL,
            audio_native TEXT,
            audio_target TEXT,
            item_type TEXT NOT NULL DEFAULT 'normal' CHECK(item_type IN ('normal', 'separator')),
            info_text TEXT,
            UNIQUE(topic_id, ord),
            FOREIGN KEY (topic_id) REFERENCES topics(id)
        );

        CREATE INDEX idx_phrases_topic ON phrases(topic_id, ord);

        CREATE TABLE hundred_seconds (
            id TEXT PRIMARY KEY,
            ord INTEGER NOT NULL,
            name TEXT NOT NULL,
            audio TEXT NOT NULL,
            image TEXT
        );

        -- Audit trail of the media copied into the pack
        CREATE TABLE assets (
            logical_name TEXT PRIMARY KEY,
            relative_path TEXT NOT NULL,
            bytes INTEGER NOT NULL
        );
        ",
    )?;

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

/// Insert topics with their vocabulary and phrases as one transaction
pub fn insert_topics(
    conn: &mut Connection,
    topics: &[Topic],
    vocabulary: &[&VocabItem],
    phrases: &[&PhraseItem],
) -> Result<()> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO topics (id, type, kind, name_native, name_target, icon, audio_intro, ord)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for topic in topics {
            stmt.execute(params![
                topic.id,
                topic.topic_type.as_str(),
                topic.kind.as_str(),
                topic.name_native,
                topic.name_sorbian,
                topic.icon,
                topic.audio_intro,
                topic.ord,
            ])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO vocabulary (id, topic_id, ord, native, target, img, audio, ignore_assign, ignore_write)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for item in vocabulary {
            stmt.execute(params![
                item.id,
                item.topic_id,
                item.ord,
                item.native,
                item.sorbian,
                item.image,
                item.audio_sorbian,
                item.ignore_assign,
                item.ignore_write,
            ])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO phrases (id, topic_id, ord, native, target, audio_native, audio_target, item_type, info_text)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for item in phrases {
            stmt.execute(params![
                item.id,
                item.topic_id,
                item.ord,
                item.native,
                item.sorbian,
                item.audio_native,
                item.audio_sorbian,
                item.item_type.as_str(),
                item.info_text,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn insert_hundred_seconds(conn: &mut Connection, items: &[HundredSecItem]) -> Result<()> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO hundred_seconds (id, ord, name, audio, image) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for item in items {
            stmt.execute(params![item.id, item.ord, item.name, item.audio, item.image])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn insert_assets<'a>(
    conn: &mut Connection,
    entries: impl IntoIterator<Item = &'a AssetEntry>,
) -> Result<()> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO assets (logical_name, relative_path, bytes) VALUES (?1, ?2, ?3)",
        )?;
        for entry in entries {
            stmt.execute(params![entry.logical_name, entry.relative_path, entry.bytes as i64])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Column names of a table; empty when the table does not exist
pub fn table_columns(conn: &Connection, table: &str) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<HashSet<_>, _>>()?;
    Ok(columns)
}
