//! Rating normalization and train/validation splitting.
//!
//! Raw ratings are rescaled into [0, 1] with the min/max observed over the
//! filtered dataset, matching the bounded output of the scoring model. The
//! split is a plain prefix cut: the row order already carries the reducer's
//! seeded shuffle and must not be randomized a second time.

use crate::encoding::EncodingMap;
use crate::types::{NormalizedSample, RatingBounds, RatingRecord};

pub const DEFAULT_TRAIN_FRACTION: f32 = 0.9;

pub struct RatingNormalizer;

impl RatingNormalizer {
    /// Encode every filtered row and scale its rating.
    ///
    /// Bounds are computed once over the whole filtered dataset. A
    /// degenerate range (one distinct rating value) maps every sample to
    /// 0.5; see [`RatingBounds::normalize`]. Rows whose identifiers are
    /// missing from the map cannot occur when the map was built from the
    /// same dataset, and are skipped if the two ever diverge.
    pub fn normalize(
        records: &[RatingRecord],
        encoding: &EncodingMap,
    ) -> (Vec<NormalizedSample>, RatingBounds) {
        if records.is_empty() {
            return (Vec::new(), RatingBounds { min: 0.0, max: 0.0 });
        }

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for record in records {
            min = min.min(record.rating);
            max = max.max(record.rating);
        }
        let bounds = RatingBounds { min, max };

        if bounds.is_degenerate() {
            tracing::debug!(rating = min, "degenerate rating range, all samples map to 0.5");
        }

        let samples = records
            .iter()
            .filter_map(|record| {
                let user_index = encoding.encode_user(&record.user_id)?;
                let item_index = encoding.encode_item(&record.item_id)?;
                Some(NormalizedSample {
                    user_index,
                    item_index,
                    rating: bounds.normalize(record.rating),
                })
            })
            .collect();

        (samples, bounds)
    }

    /// Prefix split into train and validation partitions.
    ///
    /// The first `train_fraction` of the ordered sequence becomes the train
    /// partition, the remainder validation.
    pub fn split(
        samples: &[NormalizedSample],
        train_fraction: f32,
    ) -> (Vec<NormalizedSample>, Vec<NormalizedSample>) {
        let cut = ((samples.len() as f32) * train_fraction) as usize;
        let cut = cut.min(samples.len());

        (samples[..cut].to_vec(), samples[cut..].to_vec())
    }
}
