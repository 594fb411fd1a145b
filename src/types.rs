//! Core data model for the recommendation pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single user-item rating row from the source table.
///
/// The source table is the truth for presentable metadata: `title` and
/// `image_url` survive reduction untouched and are only consulted again at
/// projection time.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRecord {
    pub user_id: String,
    pub item_id: String,
    pub rating: f32,
    pub title: Option<String>,
    pub image_url: Option<String>,
}

impl RatingRecord {
    pub fn new(
        user_id: impl Into<String>,
        item_id: impl Into<String>,
        rating: f32,
        title: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            rating,
            title: Some(title.into()),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// A record without a title is not recommendable and gets filtered out
    /// before any counting happens.
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Observed rating bounds of one filtered dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingBounds {
    pub min: f32,
    pub max: f32,
}

impl RatingBounds {
    /// A single distinct rating value collapses the range to a point.
    pub fn is_degenerate(&self) -> bool {
        (self.max - self.min).abs() < f32::EPSILON
    }

    /// Scale a raw rating into [0, 1]. A degenerate range maps every rating
    /// to 0.5 instead of dividing by zero.
    pub fn normalize(&self, rating: f32) -> f32 {
        if self.is_degenerate() {
            0.5
        } else {
            (rating - self.min) / (self.max - self.min)
        }
    }

    /// Inverse of [`normalize`](Self::normalize) for non-degenerate ranges.
    pub fn denormalize(&self, value: f32) -> f32 {
        value * (self.max - self.min) + self.min
    }
}

/// Encoded (user, item, rating) triple with the rating scaled into [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedSample {
    pub user_index: usize,
    pub item_index: usize,
    pub rating: f32,
}

/// Candidate item with its raw model score. Transient, produced per request
/// and discarded after ranking.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate {
    pub item_index: usize,
    pub score: f32,
}

/// Presentable item reference resolved from the unfiltered source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub item_id: String,
    pub title: String,
    pub image_url: Option<String>,
}

/// Final output of one recommendation request: the user's top-rated history
/// and the ranked list of unseen items, both in presentation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub bought_items: Vec<ItemSummary>,
    pub recommended_items: Vec<ItemSummary>,
    pub generated_at: DateTime<Utc>,
}
