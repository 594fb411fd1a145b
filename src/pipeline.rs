//! End-to-end orchestration and dataset snapshots.
//!
//! One snapshot holds everything derived from one version of the rating
//! table: the original rows, the reduced rows, and the encoding map built
//! over them. Requests only ever read a snapshot, so concurrent requests
//! share it without locking; new data swaps in a fresh snapshot while
//! in-flight requests keep the one they started with.

use crate::encoding::EncodingMap;
use crate::error::EngineError;
use crate::model::ScoringModel;
use crate::normalize::RatingNormalizer;
use crate::projector::HistoryProjector;
use crate::ranker::RecommendationRanker;
use crate::reduce::DatasetReducer;
use crate::types::{NormalizedSample, RatingBounds, RatingRecord, RecommendationResult};
use crate::EngineConfig;
use std::sync::{Arc, RwLock};

/// Immutable state derived from one version of the rating table.
///
/// The encoding map is order-dependent, so it is built here, once, from the
/// reduced rows and never reused across dataset versions.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    original: Vec<RatingRecord>,
    filtered: Vec<RatingRecord>,
    encoding: EncodingMap,
}

impl DatasetSnapshot {
    pub fn build(records: Vec<RatingRecord>, config: &EngineConfig) -> Self {
        let reducer = DatasetReducer::new(
            config.min_user_support,
            config.min_item_support,
            config.shuffle_seed,
        );
        let filtered = reducer.reduce(&records);
        let encoding = EncodingMap::build(&filtered);

        tracing::info!(
            source_rows = records.len(),
            filtered_rows = filtered.len(),
            num_users = encoding.num_users(),
            num_items = encoding.num_items(),
            "dataset snapshot built"
        );

        Self {
            original: records,
            filtered,
            encoding,
        }
    }

    /// The unfiltered source table, kept for metadata projection.
    pub fn original(&self) -> &[RatingRecord] {
        &self.original
    }

    pub fn filtered(&self) -> &[RatingRecord] {
        &self.filtered
    }

    pub fn encoding(&self) -> &EncodingMap {
        &self.encoding
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

/// Copy-on-write holder for the active snapshot.
///
/// `current` hands out a cheap `Arc` clone; `replace` swaps the snapshot for
/// subsequent requests while in-flight requests continue against the one
/// they already hold.
pub struct SnapshotStore {
    current: RwLock<Arc<DatasetSnapshot>>,
}

impl SnapshotStore {
    pub fn new(snapshot: DatasetSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn current(&self) -> Arc<DatasetSnapshot> {
        self.current
            .read()
            .expect("snapshot lock poisoned")
            .clone()
    }

    pub fn replace(&self, snapshot: DatasetSnapshot) {
        let mut guard = self.current.write().expect("snapshot lock poisoned");
        *guard = Arc::new(snapshot);
        tracing::info!("dataset snapshot replaced");
    }
}

/// The full request flow: rank unseen items, decode them back to original
/// identifiers, and project history plus recommendations to presentable
/// entities.
pub struct RecommendationPipeline {
    config: EngineConfig,
}

impl RecommendationPipeline {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn recommend(
        &self,
        snapshot: &DatasetSnapshot,
        model: &dyn ScoringModel,
        target_user_id: &str,
    ) -> Result<RecommendationResult, EngineError> {
        let ranked = RecommendationRanker::recommend(
            target_user_id,
            snapshot.filtered(),
            snapshot.encoding(),
            model,
            self.config.top_n,
        )?;

        // Indices came out of the same encoding, so decoding cannot miss.
        let ranked_ids: Vec<String> = ranked
            .iter()
            .filter_map(|&index| snapshot.encoding().decode_item(index))
            .map(str::to_string)
            .collect();

        Ok(HistoryProjector::project(
            target_user_id,
            snapshot.filtered(),
            snapshot.original(),
            &ranked_ids,
            self.config.top_history_count,
        ))
    }

    /// Normalized samples in shuffle order, prefix-split for the external
    /// training run, plus the observed rating bounds.
    pub fn training_samples(
        &self,
        snapshot: &DatasetSnapshot,
    ) -> (Vec<NormalizedSample>, Vec<NormalizedSample>, RatingBounds) {
        let (samples, bounds) = RatingNormalizer::normalize(snapshot.filtered(), snapshot.encoding());
        let (train, validation) = RatingNormalizer::split(&samples, self.config.train_fraction);
        (train, validation, bounds)
    }
}
