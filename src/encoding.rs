//! Identity encoding between opaque ids and dense model indices.
//!
//! The scoring model only understands dense zero-based indices, while the
//! rest of the system speaks original user and item identifiers. The
//! encoding map holds both directions and the population counts the model's
//! dimensions must match.

use crate::types::RatingRecord;
use std::collections::HashMap;

/// Bidirectional `user id <-> user index` and `item id <-> item index`
/// mapping over one filtered dataset.
///
/// Indices are assigned in first-seen order, so the map depends on the exact
/// row order of the filtered dataset and must be rebuilt, never reused,
/// whenever that dataset changes. Once built the map is immutable and safe
/// to share across concurrent readers.
#[derive(Debug, Clone, Default)]
pub struct EncodingMap {
    user_to_index: HashMap<String, usize>,
    item_to_index: HashMap<String, usize>,
    users: Vec<String>,
    items: Vec<String>,
}

impl EncodingMap {
    pub fn build(records: &[RatingRecord]) -> Self {
        let mut map = Self::default();

        for record in records {
            if !map.user_to_index.contains_key(&record.user_id) {
                map.user_to_index
                    .insert(record.user_id.clone(), map.users.len());
                map.users.push(record.user_id.clone());
            }
            if !map.item_to_index.contains_key(&record.item_id) {
                map.item_to_index
                    .insert(record.item_id.clone(), map.items.len());
                map.items.push(record.item_id.clone());
            }
        }

        tracing::debug!(
            num_users = map.users.len(),
            num_items = map.items.len(),
            "encoding map built"
        );

        map
    }

    /// `None` means the id sits outside the reduced population, a legitimate
    /// lookup result rather than a defect.
    pub fn encode_user(&self, user_id: &str) -> Option<usize> {
        self.user_to_index.get(user_id).copied()
    }

    pub fn encode_item(&self, item_id: &str) -> Option<usize> {
        self.item_to_index.get(item_id).copied()
    }

    pub fn decode_user(&self, index: usize) -> Option<&str> {
        self.users.get(index).map(String::as_str)
    }

    pub fn decode_item(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }
}
