//! Error taxonomy for the recommendation pipeline.
//!
//! Only anomalies that would otherwise produce silently wrong answers are
//! surfaced as errors. Data-shape anomalies found during reduction or
//! encoding are recovered by filtering, and "no candidates left" is an
//! ordinary empty result, not a failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The target user is absent from the reduced population. Distinct from
    /// a known user whose candidate set is empty, which is a value.
    #[error("user '{0}' is not part of the reduced rating population")]
    UnknownUser(String),

    /// Persisted model dimensions disagree with the current encoding map.
    /// Scoring with mismatched dimensions would truncate or overflow
    /// indices, so the pipeline aborts before the model is ever invoked.
    #[error(
        "model dimensions ({model_users} users, {model_items} items) do not match \
         the encoding map ({expected_users} users, {expected_items} items)"
    )]
    ModelDimensionMismatch {
        model_users: usize,
        model_items: usize,
        expected_users: usize,
        expected_items: usize,
    },

    /// An encoded index fell outside the model's weight tables.
    #[error("pair (user {user}, item {item}) is outside the model's dimensions")]
    IndexOutOfRange { user: usize, item: usize },

    /// The scoring model broke the batch contract.
    #[error("scoring model returned {got} scores for a batch of {expected} pairs")]
    Scoring { expected: usize, got: usize },

    #[error("i/o failure on model parameter file")]
    ParameterIo(#[from] std::io::Error),

    #[error("model parameter file could not be decoded")]
    ParameterDecode(#[from] bincode::Error),

    /// Decoded parameters are internally inconsistent (buffer lengths do not
    /// match the declared dimensions).
    #[error("model parameters are inconsistent: {0}")]
    ParameterShape(String),
}
