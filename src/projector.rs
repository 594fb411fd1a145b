//! Projection of history and ranked items back to presentable entities.
//!
//! The ranker works on dense indices; the presentation layer wants original
//! identifiers, titles and image references. This step resolves both the
//! user's own top-rated history and the ranked recommendations against the
//! unfiltered source table.

use crate::types::{ItemSummary, RatingRecord, RecommendationResult};
use chrono::Utc;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_TOP_HISTORY_COUNT: usize = 5;

pub struct HistoryProjector;

impl HistoryProjector {
    /// Assemble the final result for one request.
    ///
    /// "Bought" items are the target's filtered rows sorted by rating
    /// descending (stable sort, so equal ratings keep dataset order), cut to
    /// the first `top_history_count` distinct item ids. Recommended items
    /// keep the ranker's order. Metadata comes from the unfiltered source
    /// table; an id with no titled source row is dropped from the result
    /// rather than failing the request.
    pub fn project(
        target_user_id: &str,
        filtered: &[RatingRecord],
        original: &[RatingRecord],
        ranked_item_ids: &[String],
        top_history_count: usize,
    ) -> RecommendationResult {
        let mut history: Vec<&RatingRecord> = filtered
            .iter()
            .filter(|r| r.user_id == target_user_id)
            .collect();
        history.sort_by(|a, b| b.rating.total_cmp(&a.rating));

        let mut seen: HashSet<&str> = HashSet::new();
        let mut bought_ids: Vec<String> = Vec::new();
        for record in &history {
            if seen.insert(record.item_id.as_str()) {
                bought_ids.push(record.item_id.clone());
                if bought_ids.len() == top_history_count {
                    break;
                }
            }
        }

        let metadata = index_metadata(original);
        let bought_items = resolve(&bought_ids, &metadata);
        let recommended_items = resolve(ranked_item_ids, &metadata);

        RecommendationResult {
            bought_items,
            recommended_items,
            generated_at: Utc::now(),
        }
    }
}

/// First titled source row per item id wins; later duplicates are ignored.
fn index_metadata(original: &[RatingRecord]) -> HashMap<&str, &RatingRecord> {
    let mut by_id: HashMap<&str, &RatingRecord> = HashMap::new();
    for record in original {
        if record.has_title() {
            by_id.entry(record.item_id.as_str()).or_insert(record);
        }
    }
    by_id
}

fn resolve(item_ids: &[String], metadata: &HashMap<&str, &RatingRecord>) -> Vec<ItemSummary> {
    item_ids
        .iter()
        .filter_map(|item_id| {
            let Some(record) = metadata.get(item_id.as_str()) else {
                tracing::debug!(item = %item_id, "no presentable metadata, dropped from result");
                return None;
            };
            let title = record.title.clone()?;
            Some(ItemSummary {
                item_id: record.item_id.clone(),
                title,
                image_url: record.image_url.clone(),
            })
        })
        .collect()
}
