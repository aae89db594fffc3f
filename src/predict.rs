//! Scoring the full user×item grid with a trained model.
use rayon::prelude::*;

use candidates::{cross_join, filter_excluding, KeyColumns};
use data::{GroupBy, Interaction, Prediction, RankedPrediction, UserItemKey};
use ranking::top_k;
use {EvaluationError, ItemId, PredictionError, ScoringModel, UserId};

/// Number of (user, item) pairs passed to the model in a single call.
pub const BATCH_SIZE: usize = 4096;

fn predict_batch<M: ScoringModel>(
    model: &M,
    pairs: &[(UserId, ItemId)],
) -> Result<Vec<Prediction>, PredictionError> {
    let user_ids: Vec<UserId> = pairs.iter().map(|x| x.0).collect();
    let item_ids: Vec<ItemId> = pairs.iter().map(|x| x.1).collect();

    let scores = model.predict(&user_ids, &item_ids)?;

    if scores.len() != pairs.len() {
        return Err(PredictionError::LengthMismatch {
            expected: pairs.len(),
            actual: scores.len(),
        });
    }

    Ok(pairs
        .iter()
        .zip(scores.into_iter())
        .map(|(&(user_id, item_id), score)| Prediction::new(user_id, item_id, score))
        .collect())
}

/// Score every (user, item) pair over the distinct users and items of
/// `data`.
///
/// Pairs are scored in parallel batches; the output follows the order of
/// [`cross_join`](../candidates/fn.cross_join.html).
pub fn predict_all<M, T>(model: &M, data: &[T]) -> Result<Vec<Prediction>, EvaluationError>
where
    M: ScoringModel + Sync,
    T: UserItemKey,
{
    let pairs = cross_join(data);

    let batches = pairs
        .par_chunks(BATCH_SIZE)
        .map(|batch| predict_batch(model, batch))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Scored {} pairs in {} batches",
        pairs.len(),
        batches.len()
    );

    Ok(batches.into_iter().flat_map(|x| x.into_iter()).collect())
}

/// Top `k` recommendations per user among the items the user has not
/// interacted with in `train`.
///
/// Candidates are all users and items of `data`. Non-finite scores are
/// ranked as zero.
pub fn ranking_top_k<M>(
    model: &M,
    data: &[Interaction],
    train: &[Interaction],
    k: usize,
) -> Result<Vec<RankedPrediction>, EvaluationError>
where
    M: ScoringModel + Sync,
{
    let predictions: Vec<Prediction> = predict_all(model, data)?
        .into_iter()
        .map(|x| {
            if x.score().is_finite() {
                x
            } else {
                x.with_score(0.0)
            }
        })
        .collect();

    let unseen = filter_excluding(&predictions, train, KeyColumns::UserItem);

    top_k(&unseen, GroupBy::User, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Vec<Interaction> {
        vec![
            Interaction::new(0, 0, 5.0, 0),
            Interaction::new(0, 1, 3.0, 1),
            Interaction::new(1, 2, 4.0, 2),
            Interaction::new(2, 1, 1.0, 3),
        ]
    }

    fn item_score(user_ids: &[UserId], item_ids: &[ItemId]) -> Result<Vec<f32>, PredictionError> {
        Ok(user_ids
            .iter()
            .zip(item_ids)
            .map(|(&user_id, &item_id)| (10 * item_id + user_id) as f32)
            .collect())
    }

    #[test]
    fn predicts_dense_grid() {
        let predictions = predict_all(&item_score, &data()).unwrap();

        assert_eq!(predictions.len(), 9);
        assert_eq!(predictions[0], Prediction::new(0, 0, 0.0));
        assert_eq!(predictions[8], Prediction::new(2, 2, 22.0));
    }

    #[test]
    fn batches_are_reassembled_in_order() {
        let data: Vec<_> = (0..100)
            .map(|x| Interaction::new(x, x, 1.0, x))
            .collect();

        let predictions = predict_all(&item_score, &data).unwrap();

        assert_eq!(predictions.len(), 100 * 100);
        for (idx, prediction) in predictions.iter().enumerate() {
            assert_eq!(prediction.user_id(), idx / 100);
            assert_eq!(prediction.item_id(), idx % 100);
        }
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let truncated = |user_ids: &[UserId], _: &[ItemId]| -> Result<Vec<f32>, PredictionError> {
            Ok(vec![0.0; user_ids.len() - 1])
        };

        match predict_all(&truncated, &data()) {
            Err(EvaluationError::Prediction(PredictionError::LengthMismatch { .. })) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn recommends_unseen_items() {
        let data = data();
        let train = &data[..2];

        let ranked = ranking_top_k(&item_score, &data, train, 2).unwrap();
        let rows: Vec<_> = ranked
            .iter()
            .map(|x| (x.user_id(), x.item_id(), x.rank()))
            .collect();

        assert_eq!(
            rows,
            vec![(0, 2, 1), (1, 2, 1), (1, 1, 2), (2, 2, 1), (2, 1, 2)]
        );
    }

    #[test]
    fn non_finite_scores_rank_as_zero() {
        let nan_for_item_0 =
            |user_ids: &[UserId], item_ids: &[ItemId]| -> Result<Vec<f32>, PredictionError> {
                Ok(user_ids
                    .iter()
                    .zip(item_ids)
                    .map(|(_, &item_id)| if item_id == 0 { ::std::f32::NAN } else { -1.0 })
                    .collect())
            };

        let ranked = ranking_top_k(&nan_for_item_0, &data(), &[], 1).unwrap();

        assert!(ranked.iter().all(|x| x.item_id() == 0 && x.score() == 0.0));
    }
}
