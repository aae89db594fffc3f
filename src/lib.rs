#![deny(missing_docs)]
//! # recoeval
//!
//! `recoeval` implements the offline evaluation loop for recommender models
//! trained on user-item interaction logs: splitting interactions into
//! train/validation/test partitions, generating negative samples for
//! implicit-feedback training, scoring the full user×item grid with a model,
//! and measuring the resulting rankings against held-out ground truth.
//!
//! ## Example
//!
//! ```rust
//! # extern crate recoeval;
//! use recoeval::data::{GroupBy, Interaction, Interactions, Prediction};
//! use recoeval::evaluation::ranking_metrics;
//! use recoeval::split::chrono_split;
//!
//! let data = Interactions::from(vec![
//!     Interaction::new(0, 0, 5.0, 1),
//!     Interaction::new(0, 1, 4.0, 2),
//!     Interaction::new(0, 2, 3.0, 3),
//!     Interaction::new(0, 3, 1.0, 4),
//! ]);
//!
//! let splits = chrono_split(&data, &[0.5, 0.5], GroupBy::User).unwrap();
//! let (train, test) = (&splits[0], &splits[1]);
//! println!("Train: {}, test: {}", train.len(), test.len());
//!
//! let predictions = vec![
//!     Prediction::new(0, 3, 0.9),
//!     Prediction::new(0, 2, 0.8),
//!     Prediction::new(0, 0, 0.1),
//! ];
//!
//! let metrics = ranking_metrics(test.data(), &predictions, 2).unwrap();
//! println!("{}", metrics);
//! assert_eq!(metrics.recall, 1.0);
//! ```
#[macro_use]
extern crate serde_derive;

#[macro_use]
extern crate failure;
#[macro_use]
extern crate tracing;

extern crate csv;
extern crate itertools;
extern crate rand;
extern crate rand_xorshift;
extern crate rayon;
extern crate serde;

#[cfg(test)]
#[macro_use]
extern crate proptest;

pub mod candidates;
pub mod data;
pub mod datasets;
pub mod encoding;
pub mod evaluation;
pub mod predict;
pub mod ranking;
pub mod sampling;
pub mod similarity;
pub mod split;

/// Alias for user indices.
pub type UserId = usize;
/// Alias for item indices.
pub type ItemId = usize;
/// Alias for timestamps.
pub type Timestamp = usize;
/// Alias for explicit ratings and model scores.
pub type Rating = f32;

/// Prediction error types.
#[derive(Debug, Fail)]
pub enum PredictionError {
    /// Failed prediction due to numerical issues.
    #[fail(display = "Invalid prediction value: non-finite or not a number.")]
    InvalidPredictionValue,
    /// The model returned a different number of scores than pairs requested.
    #[fail(display = "Expected {} predictions, got {}.", expected, actual)]
    LengthMismatch {
        /// Number of (user, item) pairs passed to the model.
        expected: usize,
        /// Number of scores returned.
        actual: usize,
    },
}

/// Errors raised while splitting, sampling or evaluating interaction tables.
#[derive(Debug, Fail)]
pub enum EvaluationError {
    /// An argument is outside of its valid domain: ratios that do not sum
    /// to one, a cut-off of zero, a negative sampling ratio.
    #[fail(display = "Invalid argument: {}", _0)]
    InvalidArgument(String),
    /// Input table does not have the expected shape: missing columns,
    /// unparsable fields, or duplicate ground-truth pairs.
    #[fail(display = "Schema error: {}", _0)]
    SchemaError(String),
    /// Ground truth and predictions share no (user, item) pair.
    #[fail(display = "Ground truth and predictions have no (user, item) pairs in common.")]
    EmptyJoin,
    /// The scoring model failed.
    #[fail(display = "Prediction failed: {}", _0)]
    Prediction(#[cause] PredictionError),
}

impl From<PredictionError> for EvaluationError {
    fn from(error: PredictionError) -> Self {
        EvaluationError::Prediction(error)
    }
}

/// Trait describing trained models that can score (user, item) pairs.
///
/// `user_ids` and `item_ids` have the same length; the model must return
/// exactly one score per pair, in the same order. Scoring is assumed to be
/// stateless, so callers are free to split the pairs into batches and score
/// them in parallel.
pub trait ScoringModel {
    /// Score every `(user_ids[i], item_ids[i])` pair.
    fn predict(&self, user_ids: &[UserId], item_ids: &[ItemId])
        -> Result<Vec<Rating>, PredictionError>;
}

impl<F> ScoringModel for F
where
    F: Fn(&[UserId], &[ItemId]) -> Result<Vec<Rating>, PredictionError>,
{
    fn predict(
        &self,
        user_ids: &[UserId],
        item_ids: &[ItemId],
    ) -> Result<Vec<Rating>, PredictionError> {
        self(user_ids, item_ids)
    }
}
