//! Negative sampling for implicit-feedback training data.
//!
//! Explicit ratings are binarized against a threshold; every unobserved or
//! below-threshold (user, item) pair over the known users and items is a
//! negative candidate. Each user keeps all positives plus a random subset
//! of candidates proportional to the number of positives.
use std::collections::BTreeMap;

use rand;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use candidates::{cross_join, filter_excluding, KeyColumns};
use data::{Interaction, LabeledInteraction, UserItemKey};
use split::round_half_even;
use {EvaluationError, ItemId, Rating, UserId};

/// Number of negatives to draw for a user with `num_positives` positives
/// and `num_candidates` available negatives.
///
/// Every user with at least one candidate gets at least one negative.
pub fn num_negatives(num_positives: usize, num_candidates: usize, ratio_neg_per_user: f64) -> usize {
    let target = round_half_even(num_positives as f64 * ratio_neg_per_user) as usize;

    target.max(1).min(num_candidates)
}

/// Binarize `interactions` and sample negatives for every user.
///
/// Rows with `rating >= rating_threshold` are positives. The output is
/// ordered by user id; each user's positives come first, followed by its
/// sampled negatives.
pub fn generate_negative_samples<R: Rng>(
    interactions: &[Interaction],
    rating_threshold: Rating,
    ratio_neg_per_user: f64,
    rng: &mut R,
) -> Result<Vec<LabeledInteraction>, EvaluationError> {
    if !ratio_neg_per_user.is_finite() || ratio_neg_per_user < 0.0 {
        return Err(EvaluationError::InvalidArgument(format!(
            "negative sampling ratio must be non-negative, got {}",
            ratio_neg_per_user
        )));
    }

    let positives: Vec<&Interaction> = interactions
        .iter()
        .filter(|x| x.rating() >= rating_threshold)
        .collect();
    let positive_pairs: Vec<(UserId, ItemId)> = positives
        .iter()
        .map(|x| (x.user_id(), x.item_id()))
        .collect();

    let candidates = filter_excluding(
        &cross_join(interactions),
        &positive_pairs,
        KeyColumns::UserItem,
    );

    let mut users: BTreeMap<UserId, (Vec<ItemId>, Vec<ItemId>)> = BTreeMap::new();

    for &(user_id, item_id) in &positive_pairs {
        users.entry(user_id).or_insert_with(Default::default).0.push(item_id);
    }
    for &(user_id, item_id) in &candidates {
        users.entry(user_id).or_insert_with(Default::default).1.push(item_id);
    }

    let mut samples = Vec::with_capacity(positives.len() * 2);
    let mut num_sampled = 0;

    for (user_id, (user_positives, user_candidates)) in users {
        samples.extend(
            user_positives
                .iter()
                .map(|&item_id| LabeledInteraction::positive(user_id, item_id)),
        );

        if user_candidates.is_empty() {
            continue;
        }

        let amount = num_negatives(
            user_positives.len(),
            user_candidates.len(),
            ratio_neg_per_user,
        );
        let sampled = rand::seq::index::sample(rng, user_candidates.len(), amount);
        num_sampled += amount;

        samples.extend(
            sampled
                .into_vec()
                .into_iter()
                .map(|idx| LabeledInteraction::negative(user_id, user_candidates[idx])),
        );
    }

    debug!(
        "Sampled {} negatives for {} positives out of {} candidates",
        num_sampled,
        positives.len(),
        candidates.len()
    );

    Ok(samples)
}

/// Negative sampler configuration.
///
/// Defaults to one negative per positive, drawn from a generator with a
/// fixed seed so that repeated runs produce the same samples.
#[derive(Clone, Debug)]
pub struct NegativeSampler<R = XorShiftRng> {
    rating_threshold: Rating,
    ratio_neg_per_user: f64,
    rng: R,
}

impl NegativeSampler<XorShiftRng> {
    /// Build a sampler treating ratings of at least `rating_threshold` as
    /// positive feedback.
    pub fn new(rating_threshold: Rating) -> Self {
        NegativeSampler {
            rating_threshold,
            ratio_neg_per_user: 1.0,
            rng: XorShiftRng::from_seed([42; 16]),
        }
    }
}

impl<R: Rng> NegativeSampler<R> {
    /// Set the number of negatives drawn per positive.
    pub fn ratio_neg_per_user(mut self, ratio_neg_per_user: f64) -> Self {
        self.ratio_neg_per_user = ratio_neg_per_user;
        self
    }

    /// Set the random number generator.
    pub fn rng<S: Rng>(self, rng: S) -> NegativeSampler<S> {
        NegativeSampler {
            rating_threshold: self.rating_threshold,
            ratio_neg_per_user: self.ratio_neg_per_user,
            rng,
        }
    }

    /// Sample negatives for `interactions`.
    pub fn sample(
        &mut self,
        interactions: &[Interaction],
    ) -> Result<Vec<LabeledInteraction>, EvaluationError> {
        generate_negative_samples(
            interactions,
            self.rating_threshold,
            self.ratio_neg_per_user,
            &mut self.rng,
        )
    }
}
