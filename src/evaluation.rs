//! Ranking and rating metrics.
//!
//! Ranking metrics compare the top-K predictions of every user against the
//! user's relevant items in the ground truth. They are computed only over
//! users present in both tables, and are zero when no recommended item is
//! relevant. Rating metrics compare predicted and true ratings of the
//! (user, item) pairs the two tables have in common.
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use data::{GroupBy, Hit, HitCount, Interaction, Prediction, UserItemKey};
use ranking::top_k;
use {EvaluationError, ItemId, UserId};

/// Alignment of top-K predictions with the ground truth.
#[derive(Clone, Debug, Default)]
pub struct HitAlignment {
    /// Top-K predictions that are relevant, with their rank.
    pub hits: Vec<Hit>,
    /// Per-user hit and relevant-item counts, ordered by user id.
    pub hit_counts: Vec<HitCount>,
    /// Number of users present in both the ground truth and the predictions.
    pub num_common_users: usize,
}

/// Align the top `k` predictions of every user with the ground truth.
pub fn compute_hits(
    rating_true: &[Interaction],
    rating_pred: &[Prediction],
    k: usize,
) -> Result<HitAlignment, EvaluationError> {
    let true_users: HashSet<UserId> = rating_true.iter().map(|x| x.user_id()).collect();
    let common_users: HashSet<UserId> = rating_pred
        .iter()
        .map(|x| x.user_id())
        .filter(|x| true_users.contains(x))
        .collect();

    let pred_common: Vec<Prediction> = rating_pred
        .iter()
        .filter(|x| common_users.contains(&x.user_id()))
        .cloned()
        .collect();

    let mut relevant: HashMap<(UserId, ItemId), usize> = HashMap::new();
    let mut actual: BTreeMap<UserId, usize> = BTreeMap::new();

    for interaction in rating_true
        .iter()
        .filter(|x| common_users.contains(&x.user_id()))
    {
        *relevant
            .entry((interaction.user_id(), interaction.item_id()))
            .or_insert(0) += 1;
        *actual.entry(interaction.user_id()).or_insert(0) += 1;
    }

    let mut hits = Vec::new();

    for prediction in top_k(&pred_common, GroupBy::User, k)? {
        let key = (prediction.user_id(), prediction.item_id());
        let multiplicity = relevant.get(&key).cloned().unwrap_or(0);

        for _ in 0..multiplicity {
            hits.push(Hit::new(key.0, key.1, prediction.rank()));
        }
    }

    let mut hits_per_user: HashMap<UserId, usize> = HashMap::new();
    for hit in &hits {
        *hits_per_user.entry(hit.user_id()).or_insert(0) += 1;
    }

    let hit_counts = actual
        .into_iter()
        .map(|(user_id, actual)| HitCount {
            user_id,
            hit: hits_per_user.get(&user_id).cloned().unwrap_or(0),
            actual,
        })
        .collect();

    debug!(
        "Aligned top-{} predictions of {} common users: {} hits",
        k,
        common_users.len(),
        hits.len()
    );

    Ok(HitAlignment {
        hits,
        hit_counts,
        num_common_users: common_users.len(),
    })
}

fn reciprocal_rank_sums(hits: &[Hit]) -> BTreeMap<UserId, f64> {
    let mut ranks: BTreeMap<UserId, Vec<usize>> = BTreeMap::new();

    for hit in hits {
        ranks
            .entry(hit.user_id())
            .or_insert_with(Vec::new)
            .push(hit.rank());
    }

    ranks
        .into_iter()
        .map(|(user_id, mut user_ranks)| {
            user_ranks.sort();

            let sum = user_ranks
                .iter()
                .enumerate()
                .map(|(idx, &rank)| (idx + 1) as f64 / rank as f64)
                .sum();

            (user_id, sum)
        })
        .collect()
}

fn ideal_dcg(actual: usize, k: usize) -> f64 {
    (1..actual.min(k) + 1)
        .map(|rank| 1.0 / (rank as f64).ln_1p())
        .sum()
}

impl HitAlignment {
    fn is_empty(&self) -> bool {
        self.hits.is_empty() || self.num_common_users == 0
    }

    /// Mean fraction of the `k` recommendations that are relevant.
    pub fn precision(&self, k: usize) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        let total: f64 = self
            .hit_counts
            .iter()
            .map(|x| x.hit as f64 / k as f64)
            .sum();

        total / self.num_common_users as f64
    }

    /// Mean fraction of relevant items that were recommended.
    pub fn recall(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        let total: f64 = self
            .hit_counts
            .iter()
            .map(|x| x.hit as f64 / x.actual as f64)
            .sum();

        total / self.num_common_users as f64
    }

    /// Normalized discounted cumulative gain with binary relevance and a
    /// `1 / ln(1 + rank)` discount.
    pub fn ndcg(&self, k: usize) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        let mut dcg: HashMap<UserId, f64> = HashMap::new();
        for hit in &self.hits {
            *dcg.entry(hit.user_id()).or_insert(0.0) += 1.0 / (hit.rank() as f64).ln_1p();
        }

        let total: f64 = self
            .hit_counts
            .iter()
            .filter_map(|x| dcg.get(&x.user_id).map(|dcg| dcg / ideal_dcg(x.actual, k)))
            .sum();

        total / self.num_common_users as f64
    }

    /// Mean average precision: the j-th hit of a user at rank r contributes
    /// `j / r`, normalized by the user's number of relevant items.
    pub fn map(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        let reciprocal_ranks = reciprocal_rank_sums(&self.hits);

        let total: f64 = self
            .hit_counts
            .iter()
            .filter_map(|x| {
                reciprocal_ranks
                    .get(&x.user_id)
                    .map(|sum| sum / x.actual as f64)
            })
            .sum();

        total / self.num_common_users as f64
    }

    /// Reciprocal-rank score: the same per-user sums as [`map`](#method.map),
    /// normalized by `k` rather than by the number of relevant items.
    pub fn mrr(&self, k: usize) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        let total: f64 = reciprocal_rank_sums(&self.hits).values().sum();

        total / (self.num_common_users as f64 * k as f64)
    }
}

/// Precision at `k`.
pub fn precision_at_k(
    rating_true: &[Interaction],
    rating_pred: &[Prediction],
    k: usize,
) -> Result<f64, EvaluationError> {
    Ok(compute_hits(rating_true, rating_pred, k)?.precision(k))
}

/// Recall at `k`.
pub fn recall_at_k(
    rating_true: &[Interaction],
    rating_pred: &[Prediction],
    k: usize,
) -> Result<f64, EvaluationError> {
    Ok(compute_hits(rating_true, rating_pred, k)?.recall())
}

/// Normalized discounted cumulative gain at `k`.
pub fn ndcg_at_k(
    rating_true: &[Interaction],
    rating_pred: &[Prediction],
    k: usize,
) -> Result<f64, EvaluationError> {
    Ok(compute_hits(rating_true, rating_pred, k)?.ndcg(k))
}

/// Mean average precision at `k`.
pub fn map_at_k(
    rating_true: &[Interaction],
    rating_pred: &[Prediction],
    k: usize,
) -> Result<f64, EvaluationError> {
    Ok(compute_hits(rating_true, rating_pred, k)?.map())
}

/// Reciprocal-rank score at `k`.
pub fn mrr_at_k(
    rating_true: &[Interaction],
    rating_pred: &[Prediction],
    k: usize,
) -> Result<f64, EvaluationError> {
    Ok(compute_hits(rating_true, rating_pred, k)?.mrr(k))
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// All ranking metrics at a single cut-off.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankingMetrics {
    /// Cut-off the metrics were computed at.
    #[serde(skip)]
    pub k: usize,
    /// Precision@k.
    #[serde(rename = "Precision@k")]
    pub precision: f64,
    /// Recall@k.
    #[serde(rename = "Recall@k")]
    pub recall: f64,
    /// MAP@k.
    #[serde(rename = "MAP@k")]
    pub map: f64,
    /// MRR@k.
    #[serde(rename = "MRR@k")]
    pub mrr: f64,
    /// NDCG@k.
    #[serde(rename = "NDCG@k")]
    pub ndcg: f64,
}

impl RankingMetrics {
    /// Copy with every metric rounded to 4 decimal places.
    pub fn rounded(&self) -> Self {
        RankingMetrics {
            k: self.k,
            precision: round4(self.precision),
            recall: round4(self.recall),
            map: round4(self.map),
            mrr: round4(self.mrr),
            ndcg: round4(self.ndcg),
        }
    }
}

impl fmt::Display for RankingMetrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Precision@{}: {:.4}", self.k, self.precision)?;
        writeln!(f, "Recall@{}: {:.4}", self.k, self.recall)?;
        writeln!(f, "MAP@{}: {:.4}", self.k, self.map)?;
        writeln!(f, "MRR@{}: {:.4}", self.k, self.mrr)?;
        write!(f, "NDCG@{}: {:.4}", self.k, self.ndcg)
    }
}

/// Compute every ranking metric from a single alignment.
pub fn ranking_metrics(
    rating_true: &[Interaction],
    rating_pred: &[Prediction],
    k: usize,
) -> Result<RankingMetrics, EvaluationError> {
    let alignment = compute_hits(rating_true, rating_pred, k)?;

    Ok(RankingMetrics {
        k,
        precision: alignment.precision(k),
        recall: alignment.recall(),
        map: alignment.map(),
        mrr: alignment.mrr(k),
        ndcg: alignment.ndcg(k),
    })
}

/// Join true and predicted ratings on (user, item).
///
/// Rows follow the order of `rating_true`; a true row matching several
/// predictions appears once per prediction. Fails if the ground truth
/// contains the same (user, item) pair twice.
pub fn align_true_and_pred(
    rating_true: &[Interaction],
    rating_pred: &[Prediction],
) -> Result<(Vec<f64>, Vec<f64>), EvaluationError> {
    let mut seen = HashSet::with_capacity(rating_true.len());

    for interaction in rating_true {
        if !seen.insert((interaction.user_id(), interaction.item_id())) {
            return Err(EvaluationError::SchemaError(format!(
                "duplicate ground truth pair (user {}, item {})",
                interaction.user_id(),
                interaction.item_id()
            )));
        }
    }

    let mut predictions: HashMap<(UserId, ItemId), Vec<f64>> = HashMap::new();
    for prediction in rating_pred {
        predictions
            .entry((prediction.user_id(), prediction.item_id()))
            .or_insert_with(Vec::new)
            .push(prediction.score() as f64);
    }

    let mut true_values = Vec::new();
    let mut pred_values = Vec::new();

    for interaction in rating_true {
        if let Some(scores) = predictions.get(&(interaction.user_id(), interaction.item_id())) {
            for &score in scores {
                true_values.push(interaction.rating() as f64);
                pred_values.push(score);
            }
        }
    }

    Ok((true_values, pred_values))
}

fn mean_error<F: Fn(f64) -> f64>(
    rating_true: &[Interaction],
    rating_pred: &[Prediction],
    error: F,
) -> Result<f64, EvaluationError> {
    let (true_values, pred_values) = align_true_and_pred(rating_true, rating_pred)?;

    if true_values.is_empty() {
        return Err(EvaluationError::EmptyJoin);
    }

    let total: f64 = true_values
        .iter()
        .zip(pred_values.iter())
        .map(|(y, y_hat)| error(y - y_hat))
        .sum();

    Ok(total / true_values.len() as f64)
}

/// Mean squared error.
pub fn mean_squared_error(
    rating_true: &[Interaction],
    rating_pred: &[Prediction],
) -> Result<f64, EvaluationError> {
    mean_error(rating_true, rating_pred, |x| x * x)
}

/// Root mean squared error.
pub fn root_mean_squared_error(
    rating_true: &[Interaction],
    rating_pred: &[Prediction],
) -> Result<f64, EvaluationError> {
    mean_squared_error(rating_true, rating_pred).map(f64::sqrt)
}

/// Mean absolute error.
pub fn mean_absolute_error(
    rating_true: &[Interaction],
    rating_pred: &[Prediction],
) -> Result<f64, EvaluationError> {
    mean_error(rating_true, rating_pred, f64::abs)
}

/// Rating error metrics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingMetrics {
    /// Mean squared error.
    #[serde(rename = "MSE")]
    pub mse: f64,
    /// Root mean squared error.
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    /// Mean absolute error.
    #[serde(rename = "MAE")]
    pub mae: f64,
}

impl RatingMetrics {
    /// Copy with every metric rounded to 4 decimal places.
    pub fn rounded(&self) -> Self {
        RatingMetrics {
            mse: round4(self.mse),
            rmse: round4(self.rmse),
            mae: round4(self.mae),
        }
    }
}

impl fmt::Display for RatingMetrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "MSE: {:.4}", self.mse)?;
        writeln!(f, "RMSE: {:.4}", self.rmse)?;
        write!(f, "MAE: {:.4}", self.mae)
    }
}

/// Compute every rating metric from a single join.
pub fn rating_metrics(
    rating_true: &[Interaction],
    rating_pred: &[Prediction],
) -> Result<RatingMetrics, EvaluationError> {
    let mse = mean_squared_error(rating_true, rating_pred)?;

    Ok(RatingMetrics {
        mse,
        rmse: mse.sqrt(),
        mae: mean_absolute_error(rating_true, rating_pred)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-6;

    fn truth(rows: &[(UserId, ItemId, f32)]) -> Vec<Interaction> {
        rows.iter()
            .map(|&(user_id, item_id, rating)| Interaction::new(user_id, item_id, rating, 0))
            .collect()
    }

    fn predictions(rows: &[(UserId, ItemId, f32)]) -> Vec<Prediction> {
        rows.iter()
            .map(|&(user_id, item_id, score)| Prediction::new(user_id, item_id, score))
            .collect()
    }

    /// Three users with overlapping, partially relevant recommendations.
    fn sample_evaluation() -> (Vec<Interaction>, Vec<Prediction>) {
        let rating_true = truth(&[
            (1, 1, 5.0),
            (1, 2, 4.0),
            (1, 3, 3.0),
            (2, 1, 5.0),
            (2, 4, 5.0),
            (2, 5, 3.0),
            (2, 6, 3.0),
            (2, 7, 1.0),
            (3, 2, 5.0),
            (3, 5, 5.0),
            (3, 6, 5.0),
            (3, 8, 4.0),
            (3, 9, 4.0),
            (3, 10, 3.0),
            (3, 11, 3.0),
            (3, 12, 3.0),
            (3, 13, 2.0),
            (3, 14, 1.0),
        ]);
        let rating_pred = predictions(&[
            (1, 3, 14.0),
            (1, 10, 13.0),
            (1, 12, 12.0),
            (2, 10, 14.0),
            (2, 3, 13.0),
            (2, 11, 12.0),
            (2, 5, 11.0),
            (2, 13, 10.0),
            (3, 4, 14.0),
            (3, 10, 13.0),
            (3, 7, 12.0),
            (3, 13, 11.0),
            (3, 1, 10.0),
            (3, 3, 9.0),
            (3, 5, 8.0),
            (3, 2, 7.0),
            (3, 11, 6.0),
            (3, 14, 5.0),
        ]);

        (rating_true, rating_pred)
    }

    #[test]
    fn perfect_ranking() {
        let rating_true = truth(&[(1, 1, 5.0), (1, 2, 4.0), (1, 3, 3.0)]);
        let rating_pred = predictions(&[(1, 3, 14.0), (1, 2, 13.0), (1, 1, 12.0)]);

        let alignment = compute_hits(&rating_true, &rating_pred, 3).unwrap();
        let mut ranks: Vec<_> = alignment.hits.iter().map(|x| x.rank()).collect();
        ranks.sort();
        assert_eq!(ranks, vec![1, 2, 3]);

        assert_eq!(precision_at_k(&rating_true, &rating_pred, 3).unwrap(), 1.0);
        assert_eq!(recall_at_k(&rating_true, &rating_pred, 3).unwrap(), 1.0);
        assert!((ndcg_at_k(&rating_true, &rating_pred, 3).unwrap() - 1.0).abs() < EPSILON);
        assert!((map_at_k(&rating_true, &rating_pred, 3).unwrap() - 1.0).abs() < EPSILON);
        assert!((mrr_at_k(&rating_true, &rating_pred, 3).unwrap() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn hit_counts_include_users_without_hits() {
        let rating_true = truth(&[(1, 1, 5.0), (1, 2, 4.0), (2, 9, 1.0)]);
        let rating_pred = predictions(&[(1, 1, 1.0), (2, 8, 1.0), (3, 9, 1.0)]);

        let alignment = compute_hits(&rating_true, &rating_pred, 5).unwrap();

        assert_eq!(alignment.num_common_users, 2);
        assert_eq!(alignment.hits, vec![Hit::new(1, 1, 1)]);
        assert_eq!(
            alignment.hit_counts,
            vec![
                HitCount {
                    user_id: 1,
                    hit: 1,
                    actual: 2,
                },
                HitCount {
                    user_id: 2,
                    hit: 0,
                    actual: 1,
                },
            ]
        );
    }

    #[test]
    fn sample_precision_and_recall() {
        let (rating_true, rating_pred) = sample_evaluation();

        // Hits at k = 3: user 1 -> item 3; user 2 -> none; user 3 -> item 10.
        let precision = precision_at_k(&rating_true, &rating_pred, 3).unwrap();
        assert!((precision - 2.0 / 9.0).abs() < EPSILON);

        let recall = recall_at_k(&rating_true, &rating_pred, 3).unwrap();
        assert!((recall - (1.0 / 3.0 + 1.0 / 10.0) / 3.0).abs() < EPSILON);
    }

    #[test]
    fn sample_ndcg() {
        let (rating_true, rating_pred) = sample_evaluation();

        let idcg = 1.0 / 2f64.ln() + 1.0 / 3f64.ln() + 1.0 / 4f64.ln();
        let expected = ((1.0 / 2f64.ln()) / idcg + (1.0 / 3f64.ln()) / idcg) / 3.0;

        let ndcg = ndcg_at_k(&rating_true, &rating_pred, 3).unwrap();
        assert!((ndcg - expected).abs() < EPSILON);
    }

    #[test]
    fn sample_map_and_mrr() {
        let (rating_true, rating_pred) = sample_evaluation();

        // User 1 hits at rank 1 (item 3); user 2 at rank 4 (item 5);
        // user 3 at ranks 2 (item 10) and 4 (item 13).
        let user_1 = 1.0 / 1.0;
        let user_2 = 1.0 / 4.0;
        let user_3 = 1.0 / 2.0 + 2.0 / 4.0;

        let map = map_at_k(&rating_true, &rating_pred, 5).unwrap();
        let expected_map = (user_1 / 3.0 + user_2 / 5.0 + user_3 / 10.0) / 3.0;
        assert!((map - expected_map).abs() < EPSILON);

        let mrr = mrr_at_k(&rating_true, &rating_pred, 5).unwrap();
        let expected_mrr = (user_1 + user_2 + user_3) / (3.0 * 5.0);
        assert!((mrr - expected_mrr).abs() < EPSILON);
    }

    #[test]
    fn ranking_metrics_agree_with_individual_metrics() {
        let (rating_true, rating_pred) = sample_evaluation();

        let metrics = ranking_metrics(&rating_true, &rating_pred, 4).unwrap();

        assert_eq!(
            metrics.precision,
            precision_at_k(&rating_true, &rating_pred, 4).unwrap()
        );
        assert_eq!(
            metrics.recall,
            recall_at_k(&rating_true, &rating_pred, 4).unwrap()
        );
        assert_eq!(metrics.map, map_at_k(&rating_true, &rating_pred, 4).unwrap());
        assert_eq!(metrics.mrr, mrr_at_k(&rating_true, &rating_pred, 4).unwrap());
        assert_eq!(
            metrics.ndcg,
            ndcg_at_k(&rating_true, &rating_pred, 4).unwrap()
        );
    }

    #[test]
    fn disjoint_users_score_zero() {
        let rating_true = truth(&[(1, 1, 5.0), (1, 2, 4.0)]);
        let rating_pred = predictions(&[(2, 1, 5.0), (2, 2, 4.0)]);

        let metrics = ranking_metrics(&rating_true, &rating_pred, 2).unwrap();

        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.map, 0.0);
        assert_eq!(metrics.mrr, 0.0);
        assert_eq!(metrics.ndcg, 0.0);
    }

    #[test]
    fn no_hits_score_zero() {
        let rating_true = truth(&[(1, 1, 5.0)]);
        let rating_pred = predictions(&[(1, 2, 5.0)]);

        assert_eq!(ndcg_at_k(&rating_true, &rating_pred, 1).unwrap(), 0.0);
        assert_eq!(mrr_at_k(&rating_true, &rating_pred, 1).unwrap(), 0.0);
    }

    #[test]
    fn very_large_k_does_not_overflow() {
        let rating_true = truth(&[(0, 1, 1.0), (1, 2, 1.0)]);
        let rating_pred = predictions(&[(0, 1, 0.9), (1, 2, 0.8)]);
        let k = ::std::usize::MAX / 2 + 1;

        let metrics = ranking_metrics(&rating_true, &rating_pred, k).unwrap();

        assert!((metrics.mrr * k as f64 - 1.0).abs() < EPSILON);
        assert!((metrics.recall - 1.0).abs() < EPSILON);
        assert!((metrics.ndcg - 1.0).abs() < EPSILON);
    }

    #[test]
    fn zero_k_is_rejected() {
        let (rating_true, rating_pred) = sample_evaluation();

        assert!(precision_at_k(&rating_true, &rating_pred, 0).is_err());
    }

    #[test]
    fn metrics_display_and_serialize() {
        let metrics = RankingMetrics {
            k: 10,
            precision: 0.123456,
            recall: 0.5,
            map: 0.25,
            mrr: 0.1,
            ndcg: 0.33333,
        };

        let displayed = metrics.to_string();
        assert!(displayed.starts_with("Precision@10: 0.1235"));
        assert!(displayed.ends_with("NDCG@10: 0.3333"));

        let rounded = metrics.rounded();
        assert_eq!(rounded.precision, 0.1235);
        assert_eq!(rounded.ndcg, 0.3333);
    }

    #[test]
    fn identical_ratings_have_zero_error() {
        let rating_true = truth(&[(1, 1, 5.0), (1, 2, 4.0), (2, 1, 3.5)]);
        let rating_pred = predictions(&[(2, 1, 3.5), (1, 2, 4.0), (1, 1, 5.0)]);

        assert_eq!(mean_squared_error(&rating_true, &rating_pred).unwrap(), 0.0);
        assert_eq!(
            root_mean_squared_error(&rating_true, &rating_pred).unwrap(),
            0.0
        );
        assert_eq!(mean_absolute_error(&rating_true, &rating_pred).unwrap(), 0.0);
    }

    #[test]
    fn rating_errors() {
        let rating_true = truth(&[(1, 1, 5.0), (1, 2, 4.0), (2, 1, 2.0), (3, 3, 1.0)]);
        let rating_pred = predictions(&[(1, 1, 4.0), (1, 2, 6.0), (2, 1, 2.0), (4, 4, 1.0)]);

        let (true_values, pred_values) = align_true_and_pred(&rating_true, &rating_pred).unwrap();
        assert_eq!(true_values, vec![5.0, 4.0, 2.0]);
        assert_eq!(pred_values, vec![4.0, 6.0, 2.0]);

        let metrics = rating_metrics(&rating_true, &rating_pred).unwrap();
        assert!((metrics.mse - 5.0 / 3.0).abs() < EPSILON);
        assert!((metrics.rmse - (5.0f64 / 3.0).sqrt()).abs() < EPSILON);
        assert!((metrics.mae - 1.0).abs() < EPSILON);
    }

    #[test]
    fn duplicate_ground_truth_is_rejected() {
        let rating_true = truth(&[(1, 1, 5.0), (1, 1, 4.0)]);
        let rating_pred = predictions(&[(1, 1, 4.0)]);

        match align_true_and_pred(&rating_true, &rating_pred) {
            Err(EvaluationError::SchemaError(_)) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_join_is_an_error() {
        let rating_true = truth(&[(1, 1, 5.0)]);
        let rating_pred = predictions(&[(1, 2, 5.0)]);

        match mean_squared_error(&rating_true, &rating_pred) {
            Err(EvaluationError::EmptyJoin) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
        assert!(rating_metrics(&rating_true, &rating_pred).is_err());
    }

    proptest! {
        #[test]
        fn bounded_metrics(
            true_rows in prop::collection::hash_set((0usize..6, 0usize..15), 1..40),
            pred_rows in prop::collection::hash_map((0usize..6, 0usize..15), 0.0f32..1.0, 1..90),
            k in 1usize..10,
        ) {
            let rating_true: Vec<_> = true_rows
                .iter()
                .map(|&(user_id, item_id)| Interaction::new(user_id, item_id, 1.0, 0))
                .collect();
            let rating_pred: Vec<_> = pred_rows
                .iter()
                .map(|(&(user_id, item_id), &score)| Prediction::new(user_id, item_id, score))
                .collect();

            let metrics = ranking_metrics(&rating_true, &rating_pred, k).unwrap();

            for value in &[metrics.precision, metrics.recall, metrics.ndcg, metrics.map, metrics.mrr] {
                prop_assert!(*value >= 0.0);
            }
            prop_assert!(metrics.precision <= 1.0 + EPSILON);
            prop_assert!(metrics.recall <= 1.0 + EPSILON);
            prop_assert!(metrics.ndcg <= 1.0 + EPSILON);
        }
    }
}
