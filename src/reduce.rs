//! Dataset reduction for sparsity control.
//!
//! Cuts the raw rating table down to users and items with enough support
//! before anything is encoded, then applies a seeded shuffle so downstream
//! index assignment is reproducible across runs of the same input.

use crate::types::RatingRecord;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

pub const DEFAULT_MIN_USER_SUPPORT: usize = 10;
pub const DEFAULT_MIN_ITEM_SUPPORT: usize = 20;
pub const DEFAULT_SHUFFLE_SEED: u64 = 42;

/// Filters the raw rating table down to well-supported users and items.
#[derive(Debug, Clone)]
pub struct DatasetReducer {
    min_user_support: usize,
    min_item_support: usize,
    shuffle_seed: u64,
}

impl Default for DatasetReducer {
    fn default() -> Self {
        Self::new(
            DEFAULT_MIN_USER_SUPPORT,
            DEFAULT_MIN_ITEM_SUPPORT,
            DEFAULT_SHUFFLE_SEED,
        )
    }
}

impl DatasetReducer {
    pub fn new(min_user_support: usize, min_item_support: usize, shuffle_seed: u64) -> Self {
        Self {
            min_user_support,
            min_item_support,
            shuffle_seed,
        }
    }

    /// Derive the filtered dataset.
    ///
    /// Rows without a title are dropped first, then rows are retained only
    /// while their user has at least `min_user_support` ratings and their
    /// item at least `min_item_support` ratings. Dropping an item can push a
    /// user back under its threshold (and the other way around), so the
    /// filter repeats until the surviving rows are stable: re-counting the
    /// output never finds a count below threshold.
    ///
    /// An empty result is a legal value; recommendation quality over an
    /// empty dataset is the caller's problem, not an error here.
    pub fn reduce(&self, records: &[RatingRecord]) -> Vec<RatingRecord> {
        let mut kept: Vec<RatingRecord> = records
            .iter()
            .filter(|r| r.has_title())
            .cloned()
            .collect();

        let untitled = records.len() - kept.len();
        if untitled > 0 {
            tracing::debug!(rows = untitled, "dropped rows without item titles");
        }

        loop {
            let user_counts = count_by(&kept, |r| &r.user_id);
            let item_counts = count_by(&kept, |r| &r.item_id);

            let before = kept.len();
            kept.retain(|r| {
                user_counts[r.user_id.as_str()] >= self.min_user_support
                    && item_counts[r.item_id.as_str()] >= self.min_item_support
            });

            if kept.len() == before {
                break;
            }
        }

        let mut rng = StdRng::seed_from_u64(self.shuffle_seed);
        kept.shuffle(&mut rng);

        tracing::debug!(
            input_rows = records.len(),
            kept_rows = kept.len(),
            "dataset reduced"
        );

        kept
    }
}

fn count_by<'a, F>(records: &'a [RatingRecord], key: F) -> HashMap<String, usize>
where
    F: Fn(&'a RatingRecord) -> &'a String,
{
    let mut counts = HashMap::new();
    for record in records {
        *counts.entry(key(record).clone()).or_insert(0) += 1;
    }
    counts
}
