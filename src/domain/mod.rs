//! Domain types for content packs.
//!
//! This module contains the core data structures:
//! - Records: Topics, vocabulary, phrases, hundred-seconds items
//! - Ids: Deterministic identifiers derived from semantic content
//! - Manifest: The pack.json descriptor

pub mod ids;
pub mod manifest;
pub mod records;

// Re-export commonly used types
pub use ids::{stable_id, OccurrenceCounter};
pub use manifest::{Modules, PackManifest, DEFAULT_CONTENT_FILE, MANIFEST_FILE};
pub use records::{HundredSecItem, PhraseItem, PhraseType, Topic, TopicKind, TopicType, VocabItem};
