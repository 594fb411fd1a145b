//! Latent-factor recommendation pipeline.
//!
//! Turns a table of user-item ratings into per-user top-N recommendation
//! lists. The stages, in request order: dataset reduction for sparsity
//! control, dense identity encoding, rating normalization, one batched
//! scoring call through a latent-factor model, ranking, and projection of
//! the result back to presentable items.
//!
//! Training the model is external to this crate; the pipeline consumes
//! trained parameters through [`EmbeddingModel::load`] or any other
//! [`ScoringModel`] implementation.

pub mod encoding;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod projector;
pub mod ranker;
pub mod reduce;
pub mod types;

// Re-export key types
pub use encoding::EncodingMap;
pub use error::EngineError;
pub use model::{EmbeddingModel, ModelParameters, ScoringModel};
pub use normalize::RatingNormalizer;
pub use pipeline::{DatasetSnapshot, RecommendationPipeline, SnapshotStore};
pub use projector::HistoryProjector;
pub use ranker::RecommendationRanker;
pub use reduce::DatasetReducer;
pub use types::*;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum ratings a user needs to survive reduction (default: 10)
    pub min_user_support: usize,
    /// Minimum ratings an item needs to survive reduction (default: 20)
    pub min_item_support: usize,
    /// Prefix fraction of samples assigned to training (default: 0.9)
    pub train_fraction: f32,
    /// Length of the ranked recommendation list (default: 10)
    pub top_n: usize,
    /// Length of the top-rated history list (default: 5)
    pub top_history_count: usize,
    /// Seed of the reducer's deterministic shuffle (default: 42)
    pub shuffle_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_user_support: reduce::DEFAULT_MIN_USER_SUPPORT,
            min_item_support: reduce::DEFAULT_MIN_ITEM_SUPPORT,
            train_fraction: normalize::DEFAULT_TRAIN_FRACTION,
            top_n: ranker::DEFAULT_TOP_N,
            top_history_count: projector::DEFAULT_TOP_HISTORY_COUNT,
            shuffle_seed: reduce::DEFAULT_SHUFFLE_SEED,
        }
    }
}

impl EngineConfig {
    pub fn with_min_user_support(mut self, min_user_support: usize) -> Self {
        self.min_user_support = min_user_support;
        self
    }

    pub fn with_min_item_support(mut self, min_item_support: usize) -> Self {
        self.min_item_support = min_item_support;
        self
    }

    pub fn with_train_fraction(mut self, train_fraction: f32) -> Self {
        self.train_fraction = train_fraction;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_top_history_count(mut self, top_history_count: usize) -> Self {
        self.top_history_count = top_history_count;
        self
    }

    pub fn with_shuffle_seed(mut self, shuffle_seed: u64) -> Self {
        self.shuffle_seed = shuffle_seed;
        self
    }
}

#[cfg(test)]
mod tests;
