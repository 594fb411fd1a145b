//! Scoring model boundary and the latent-factor implementation.
//!
//! [`ScoringModel`] is the seam between the pipeline and whatever produces
//! affinity scores, so the ranking algorithm can be tested against a mock
//! without a trained model. [`EmbeddingModel`] is the production scorer: a
//! learned vector per user and per item, affinity predicted as a sigmoid
//! over their dot product plus both biases. How those weights are learned
//! is out of scope here; they arrive through [`EmbeddingModel::load`].

use crate::encoding::EncodingMap;
use crate::error::EngineError;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Batched scorer for `(user_index, item_index)` pairs.
///
/// One call covers the whole candidate set of a recommendation request:
/// candidate counts run into the thousands and per-pair calls against an
/// accelerator-bound model would multiply latency.
pub trait ScoringModel: Send + Sync {
    fn num_users(&self) -> usize;
    fn num_items(&self) -> usize;

    /// Returns exactly one score per pair, preserving input order.
    fn predict(&self, pairs: &[(usize, usize)]) -> Result<Vec<f32>, EngineError>;
}

/// Persisted weights of a trained embedding model.
///
/// Factor matrices are stored as row-major flat buffers so the file format
/// stays independent of the in-memory representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParameters {
    pub num_users: usize,
    pub num_items: usize,
    pub embedding_size: usize,
    pub user_factors: Vec<f32>,
    pub item_factors: Vec<f32>,
    pub user_bias: Vec<f32>,
    pub item_bias: Vec<f32>,
}

/// Latent-factor scorer: `sigmoid(user . item + user_bias + item_bias)`.
pub struct EmbeddingModel {
    user_factors: Array2<f32>,
    item_factors: Array2<f32>,
    user_bias: Array1<f32>,
    item_bias: Array1<f32>,
}

impl EmbeddingModel {
    pub fn from_parameters(params: ModelParameters) -> Result<Self, EngineError> {
        let ModelParameters {
            num_users,
            num_items,
            embedding_size,
            user_factors,
            item_factors,
            user_bias,
            item_bias,
        } = params;

        if user_bias.len() != num_users {
            return Err(EngineError::ParameterShape(format!(
                "user bias has {} entries for {} users",
                user_bias.len(),
                num_users
            )));
        }
        if item_bias.len() != num_items {
            return Err(EngineError::ParameterShape(format!(
                "item bias has {} entries for {} items",
                item_bias.len(),
                num_items
            )));
        }

        let user_factors = Array2::from_shape_vec((num_users, embedding_size), user_factors)
            .map_err(|e| EngineError::ParameterShape(format!("user factors: {e}")))?;
        let item_factors = Array2::from_shape_vec((num_items, embedding_size), item_factors)
            .map_err(|e| EngineError::ParameterShape(format!("item factors: {e}")))?;

        Ok(Self {
            user_factors,
            item_factors,
            user_bias: Array1::from_vec(user_bias),
            item_bias: Array1::from_vec(item_bias),
        })
    }

    /// Load trained parameters from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let file = File::open(path.as_ref())?;
        let params: ModelParameters = bincode::deserialize_from(BufReader::new(file))?;

        tracing::info!(
            num_users = params.num_users,
            num_items = params.num_items,
            embedding_size = params.embedding_size,
            "model parameters loaded"
        );

        Self::from_parameters(params)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let file = File::create(path.as_ref())?;
        bincode::serialize_into(BufWriter::new(file), &self.to_parameters())?;
        Ok(())
    }

    pub fn to_parameters(&self) -> ModelParameters {
        ModelParameters {
            num_users: self.num_users(),
            num_items: self.num_items(),
            embedding_size: self.embedding_size(),
            user_factors: self.user_factors.iter().copied().collect(),
            item_factors: self.item_factors.iter().copied().collect(),
            user_bias: self.user_bias.to_vec(),
            item_bias: self.item_bias.to_vec(),
        }
    }

    pub fn embedding_size(&self) -> usize {
        self.user_factors.ncols()
    }

    /// Persisted dimensions must agree with the current encoding map before
    /// any scoring happens; truncated or overflowing indices would corrupt
    /// every downstream ranking.
    pub fn ensure_compatible(&self, encoding: &EncodingMap) -> Result<(), EngineError> {
        if self.num_users() != encoding.num_users() || self.num_items() != encoding.num_items() {
            return Err(EngineError::ModelDimensionMismatch {
                model_users: self.num_users(),
                model_items: self.num_items(),
                expected_users: encoding.num_users(),
                expected_items: encoding.num_items(),
            });
        }
        Ok(())
    }
}

impl ScoringModel for EmbeddingModel {
    fn num_users(&self) -> usize {
        self.user_factors.nrows()
    }

    fn num_items(&self) -> usize {
        self.item_factors.nrows()
    }

    fn predict(&self, pairs: &[(usize, usize)]) -> Result<Vec<f32>, EngineError> {
        let mut scores = Vec::with_capacity(pairs.len());

        for &(user, item) in pairs {
            if user >= self.num_users() || item >= self.num_items() {
                return Err(EngineError::IndexOutOfRange { user, item });
            }

            let dot = self.user_factors.row(user).dot(&self.item_factors.row(item));
            scores.push(sigmoid(dot + self.user_bias[user] + self.item_bias[item]));
        }

        Ok(scores)
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
