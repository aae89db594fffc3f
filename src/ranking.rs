//! Per-group top-K selection.
use std::cmp::Ordering;
use std::collections::HashMap;

use rayon::prelude::*;

use data::{GroupBy, Prediction, RankedPrediction};
use EvaluationError;

/// Descending by score, NaN last.
fn cmp_score_descending(x: &Prediction, y: &Prediction) -> Ordering {
    match (x.score().is_nan(), y.score().is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => y.score().partial_cmp(&x.score()).unwrap_or(Ordering::Equal),
    }
}

/// Select the `k` highest-scoring predictions of every group.
///
/// Groups are emitted in order of first appearance, each sorted by
/// ascending rank. Rank 1 is the highest score; equal scores keep their
/// input order and NaN scores rank below every other score. Groups with
/// fewer than `k` rows are returned whole.
pub fn top_k(
    table: &[Prediction],
    group_by: GroupBy,
    k: usize,
) -> Result<Vec<RankedPrediction>, EvaluationError> {
    if k == 0 {
        return Err(EvaluationError::InvalidArgument(
            "k must be positive".to_owned(),
        ));
    }

    let mut group_positions = HashMap::new();
    let mut groups: Vec<Vec<Prediction>> = Vec::new();

    for prediction in table {
        let position = *group_positions
            .entry(group_by.key(prediction))
            .or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
        groups[position].push(*prediction);
    }

    let ranked: Vec<Vec<RankedPrediction>> = groups
        .par_iter_mut()
        .map(|group| {
            group.sort_by(cmp_score_descending);

            group
                .iter()
                .take(k)
                .enumerate()
                .map(|(idx, prediction)| RankedPrediction::new(prediction, idx + 1))
                .collect()
        })
        .collect();

    Ok(ranked.into_iter().flat_map(|x| x.into_iter()).collect())
}
