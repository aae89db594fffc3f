//! Train/validation/test splitting.
//!
//! All splitters take a list of ratios summing to one and return one table
//! per ratio, tagged with its position in the list. Cut points are the
//! cumulative ratios scaled by the number of rows and rounded half to even,
//! so a group of three rows split `[0.5, 0.5]` keeps two rows in the first
//! partition.
use itertools::Itertools;
use rand::Rng;
use rayon::prelude::*;

use data::{cmp_timestamp, GroupBy, Interaction, Interactions};
use EvaluationError;

const RATIO_TOLERANCE: f64 = 1e-6;

/// Round to the nearest integer, resolving halves towards the even
/// neighbour.
pub fn round_half_even(x: f64) -> f64 {
    let rounded = x.round();

    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        rounded
    }
}

fn validate_ratios(ratios: &[f64]) -> Result<(), EvaluationError> {
    if ratios.is_empty() {
        return Err(EvaluationError::InvalidArgument(
            "at least one split ratio is required".to_owned(),
        ));
    }

    if let Some(ratio) = ratios.iter().find(|x| !x.is_finite() || **x <= 0.0) {
        return Err(EvaluationError::InvalidArgument(format!(
            "split ratios must be positive, got {}",
            ratio
        )));
    }

    let total: f64 = ratios.iter().sum();

    if (total - 1.0).abs() > RATIO_TOLERANCE {
        return Err(EvaluationError::InvalidArgument(format!(
            "split ratios must sum to 1, got {}",
            total
        )));
    }

    Ok(())
}

fn split_points(ratios: &[f64], num_rows: usize) -> Vec<usize> {
    let mut cumulative = 0.0;

    ratios[..ratios.len() - 1]
        .iter()
        .map(|ratio| {
            cumulative += ratio;
            (round_half_even(cumulative * num_rows as f64) as usize).min(num_rows)
        })
        .collect()
}

fn split_contiguous(interactions: &Interactions, ratios: &[f64]) -> Vec<Interactions> {
    let mut points = vec![0];
    points.extend(split_points(ratios, interactions.len()));
    points.push(interactions.len());

    points
        .iter()
        .zip(points.iter().skip(1))
        .enumerate()
        .map(|(split_index, (&start, &stop))| {
            interactions
                .slice(start, stop.max(start))
                .with_split_index(split_index)
        })
        .collect()
}

/// Split `interactions` into consecutive partitions without reordering.
pub fn contiguous_split(
    interactions: &Interactions,
    ratios: &[f64],
) -> Result<Vec<Interactions>, EvaluationError> {
    validate_ratios(ratios)?;

    Ok(split_contiguous(interactions, ratios))
}

/// Shuffle `interactions` and split them into consecutive partitions.
pub fn random_split<R: Rng>(
    interactions: &mut Interactions,
    rng: &mut R,
    ratios: &[f64],
) -> Result<Vec<Interactions>, EvaluationError> {
    validate_ratios(ratios)?;

    interactions.shuffle(rng);

    let splits = split_contiguous(interactions, ratios);

    debug!(
        "Randomly split {} interactions into {:?}",
        interactions.len(),
        splits.iter().map(|x| x.len()).collect::<Vec<_>>()
    );

    Ok(splits)
}

/// Split every user (or item) group separately and merge the partitions.
///
/// Groups are visited in ascending id order. With `chronological` set,
/// each group is ordered by timestamp first so that the earliest
/// interactions land in the first partition; otherwise groups keep their
/// input order. Small groups may contribute no rows to some partitions.
pub fn grouped_split(
    interactions: &Interactions,
    ratios: &[f64],
    group_by: GroupBy,
    chronological: bool,
) -> Result<Vec<Interactions>, EvaluationError> {
    validate_ratios(ratios)?;

    let mut sorted = interactions.clone();

    if chronological {
        sorted.sort_by(cmp_timestamp(group_by));
    } else {
        sorted.sort_by(|x, y| group_by.key(x).cmp(&group_by.key(y)));
    }

    let groups: Vec<Interactions> = sorted
        .data()
        .iter()
        .group_by(|x| group_by.key(*x))
        .into_iter()
        .map(|(_, group)| Interactions::from(group.cloned().collect::<Vec<Interaction>>()))
        .collect();

    let group_splits: Vec<Vec<Interactions>> = groups
        .par_iter()
        .map(|group| split_contiguous(group, ratios))
        .collect();

    let mut splits: Vec<Interactions> = (0..ratios.len())
        .map(|split_index| Interactions::new().with_split_index(split_index))
        .collect();

    for group_split in group_splits {
        for (split, part) in splits.iter_mut().zip(group_split.into_iter()) {
            for &interaction in part.data() {
                split.push(interaction);
            }
        }
    }

    info!(
        "Split {} interactions in {} groups into {:?}",
        interactions.len(),
        groups.len(),
        splits.iter().map(|x| x.len()).collect::<Vec<_>>()
    );

    Ok(splits)
}

/// Per-group split in chronological order.
pub fn chrono_split(
    interactions: &Interactions,
    ratios: &[f64],
    group_by: GroupBy,
) -> Result<Vec<Interactions>, EvaluationError> {
    grouped_split(interactions, ratios, group_by, true)
}

/// Per-group split in input order.
pub fn stratified_split(
    interactions: &Interactions,
    ratios: &[f64],
    group_by: GroupBy,
) -> Result<Vec<Interactions>, EvaluationError> {
    grouped_split(interactions, ratios, group_by, false)
}
