//! Nearest neighbours in a user or item embedding matrix.
use rayon::prelude::*;

use EvaluationError;

/// Distance used to compare embedding rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    /// Euclidean distance.
    Euclidean,
    /// One minus the cosine similarity. Zero vectors are at distance 1
    /// from everything else.
    Cosine,
}

impl Distance {
    fn between(&self, x: &[f32], y: &[f32]) -> f64 {
        match *self {
            Distance::Euclidean => x
                .iter()
                .zip(y)
                .map(|(&a, &b)| (a as f64 - b as f64).powi(2))
                .sum::<f64>()
                .sqrt(),
            Distance::Cosine => {
                let dot: f64 = x.iter().zip(y).map(|(&a, &b)| a as f64 * b as f64).sum();
                let norms = norm(x) * norm(y);

                if norms == 0.0 {
                    1.0
                } else {
                    1.0 - dot / norms
                }
            }
        }
    }
}

fn norm(x: &[f32]) -> f64 {
    x.iter().map(|&a| a as f64 * a as f64).sum::<f64>().sqrt()
}

/// Indices of the `k + 1` nearest rows of every row of `embedding`.
///
/// The query row is included and always comes first, so the remaining `k`
/// entries are its most similar other rows, closest first. Equal distances
/// keep ascending row order. Fewer entries are returned when the matrix
/// has at most `k` rows.
pub fn similar(
    embedding: &[Vec<f32>],
    k: usize,
    distance: Distance,
) -> Result<Vec<Vec<usize>>, EvaluationError> {
    if let Some(first) = embedding.first() {
        if let Some(row) = embedding.iter().position(|x| x.len() != first.len()) {
            return Err(EvaluationError::InvalidArgument(format!(
                "embedding row {} has {} dimensions, expected {}",
                row,
                embedding[row].len(),
                first.len()
            )));
        }
    }

    let neighbours: Vec<Vec<usize>> = embedding
        .par_iter()
        .enumerate()
        .map(|(row, query)| {
            let mut distances: Vec<(usize, f64)> = embedding
                .iter()
                .enumerate()
                .filter(|&(idx, _)| idx != row)
                .map(|(idx, other)| (idx, distance.between(query, other)))
                .collect();

            distances.sort_by(|x, y| {
                x.1.partial_cmp(&y.1)
                    .unwrap_or_else(|| x.1.is_nan().cmp(&y.1.is_nan()))
                    .then(x.0.cmp(&y.0))
            });

            ::std::iter::once(row)
                .chain(distances.into_iter().take(k).map(|(idx, _)| idx))
                .collect()
        })
        .collect();

    debug!(
        "Found {} nearest neighbours for {} rows",
        k,
        neighbours.len()
    );

    Ok(neighbours)
}
