//! Deterministic record identifiers.
//!
//! An id is `<prefix>_<sha256(tuple)[0:16]>`. The tuple holds only semantic
//! content (owning topic, record type, normalized texts, occurrence index),
//! never row positions, so progress stored against an id survives rebuilds.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

/// Separator between tuple fields; cannot occur in normalized text
const FIELD_SEPARATOR: u8 = 0x1f;

/// Compute a stable id from an ordered semantic tuple
pub fn stable_id(prefix: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update([FIELD_SEPARATOR]);
        }
        hasher.update(part.as_bytes());
    }
    let result = hasher.finalize();

    format!("{}_{}", prefix, hex::encode(&result[..8]))
}

/// Hands out disambiguating indices for repeated text tuples.
///
/// The first occurrence of a tuple gets 0, the next identical one 1, and so
/// on. Unrelated rows do not shift each other's index.
#[derive(Debug, Default)]
pub struct OccurrenceCounter {
    seen: HashMap<Vec<String>, usize>,
}

impl OccurrenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the occurrence index for `key` and record it
    pub fn next(&mut self, key: &[&str]) -> usize {
        let owned: Vec<String> = key.iter().map(|s| s.to_string()).collect();
        let slot = self.seen.entry(owned).or_insert(0);
        let index = *slot;
        *slot += 1;
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_id_deterministic() {
        let id1 = stable_id("v", &["t_abc", "vocab", "Mutter", "mać", "0"]);
        let id2 = stable_id("v", &["t_abc", "vocab", "Mutter", "mać", "0"]);
        let id3 = stable_id("v", &["t_abc", "vocab", "Mutter", "mać", "1"]);

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert!(id1.starts_with("v_"));
        assert_eq!(id1.len(), 2 + 16);
    }

    #[test]
    fn test_field_boundaries_matter() {
        // "ab" + "c" must not collide with "a" + "bc"
        assert_ne!(stable_id("p", &["ab", "c"]), stable_id("p", &["a", "bc"]));
    }

    #[test]
    fn test_occurrence_counter() {
        let mut counter = OccurrenceCounter::new();

        assert_eq!(counter.next(&["Hallo", "Witaj"]), 0);
        assert_eq!(counter.next(&["Tschüss", "Božemje"]), 0);
        assert_eq!(counter.next(&["Hallo", "Witaj"]), 1);
    }
}
