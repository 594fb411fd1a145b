//! Candidate generation and top-N ranking.
//!
//! The core inference step: every item the target user has not rated is
//! scored through the model in a single batch, then the highest-scoring N
//! survive. Ordering is fully deterministic: candidates are enumerated in
//! the filtered dataset's first-seen order and the sort is stable, so tied
//! scores keep their enumeration order.

use crate::encoding::EncodingMap;
use crate::error::EngineError;
use crate::model::ScoringModel;
use crate::types::{RatingRecord, ScoredCandidate};
use std::collections::HashSet;

pub const DEFAULT_TOP_N: usize = 10;

pub struct RecommendationRanker;

impl RecommendationRanker {
    /// Ranked item indices for `target_user_id`, best first, at most `top_n`.
    ///
    /// Returns [`EngineError::UnknownUser`] when the user is outside the
    /// reduced population. An empty result is not an error: it means the
    /// user has rated every item the encoding knows about.
    pub fn recommend(
        target_user_id: &str,
        filtered: &[RatingRecord],
        encoding: &EncodingMap,
        model: &dyn ScoringModel,
        top_n: usize,
    ) -> Result<Vec<usize>, EngineError> {
        let user_index = encoding
            .encode_user(target_user_id)
            .ok_or_else(|| EngineError::UnknownUser(target_user_id.to_string()))?;

        Self::ensure_dimensions(encoding, model)?;

        let rated: HashSet<&str> = filtered
            .iter()
            .filter(|r| r.user_id == target_user_id)
            .map(|r| r.item_id.as_str())
            .collect();

        // Distinct unrated items in first-seen order. Intersecting with the
        // encoding map is a no-op while both derive from the same filtered
        // rows; it stays here so the ranker tolerates the two diverging.
        let mut enumerated: HashSet<&str> = HashSet::new();
        let mut candidates: Vec<usize> = Vec::new();
        for record in filtered {
            if rated.contains(record.item_id.as_str()) {
                continue;
            }
            if !enumerated.insert(record.item_id.as_str()) {
                continue;
            }
            if let Some(item_index) = encoding.encode_item(&record.item_id) {
                candidates.push(item_index);
            }
        }

        if candidates.is_empty() {
            tracing::debug!(user = target_user_id, "no unrated items left to rank");
            return Ok(Vec::new());
        }

        let batch: Vec<(usize, usize)> = candidates
            .iter()
            .map(|&item_index| (user_index, item_index))
            .collect();

        let scores = model.predict(&batch)?;
        if scores.len() != batch.len() {
            return Err(EngineError::Scoring {
                expected: batch.len(),
                got: scores.len(),
            });
        }

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .zip(scores)
            .map(|(item_index, score)| ScoredCandidate { item_index, score })
            .collect();

        // sort_by is stable: ties keep candidate enumeration order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_n);

        tracing::debug!(
            user = target_user_id,
            candidates = batch.len(),
            returned = scored.len(),
            "ranked candidates"
        );

        Ok(scored.into_iter().map(|c| c.item_index).collect())
    }

    fn ensure_dimensions(
        encoding: &EncodingMap,
        model: &dyn ScoringModel,
    ) -> Result<(), EngineError> {
        if model.num_users() != encoding.num_users() || model.num_items() != encoding.num_items() {
            return Err(EngineError::ModelDimensionMismatch {
                model_users: model.num_users(),
                model_items: model.num_items(),
                expected_users: encoding.num_users(),
                expected_items: encoding.num_items(),
            });
        }
        Ok(())
    }
}
