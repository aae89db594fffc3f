//! Dense integer ids for raw user and item identifiers.
use std::fmt;

use data::{Interaction, Interactions};
use {EvaluationError, Rating, Timestamp};

/// Maps a sorted set of labels onto `0..num_classes`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder<T> {
    classes: Vec<T>,
}

impl<T: Ord + Clone> LabelEncoder<T> {
    /// Learn the distinct labels of `values`.
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut classes: Vec<T> = values.into_iter().cloned().collect();
        classes.sort();
        classes.dedup();

        LabelEncoder { classes }
    }

    /// The distinct labels, in ascending order.
    pub fn classes(&self) -> &[T] {
        &self.classes
    }

    /// Number of distinct labels.
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Dense id of `value`.
    pub fn transform(&self, value: &T) -> Result<usize, EvaluationError> {
        self.classes.binary_search(value).map_err(|_| {
            EvaluationError::InvalidArgument("label was not seen during fitting".to_owned())
        })
    }

    /// Label of the dense id `idx`.
    pub fn inverse_transform(&self, idx: usize) -> Result<&T, EvaluationError> {
        self.classes.get(idx).ok_or_else(|| {
            EvaluationError::InvalidArgument(format!(
                "id {} is out of range for {} classes",
                idx,
                self.classes.len()
            ))
        })
    }
}

/// An external identifier.
///
/// A column whose ids all parse as integers is encoded as `Integer`, so that
/// ids sort numerically; any other column is encoded as `Text`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// Numeric identifier.
    Integer(i64),
    /// Free-form identifier.
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RawId::Integer(id) => write!(f, "{}", id),
            RawId::Text(ref id) => write!(f, "{}", id),
        }
    }
}

fn column_ids<'a, I>(values: I) -> Vec<RawId>
where
    I: IntoIterator<Item = &'a String>,
{
    let values: Vec<&String> = values.into_iter().collect();
    let integers: Option<Vec<i64>> = values.iter().map(|x| x.trim().parse().ok()).collect();

    match integers {
        Some(ids) => ids.into_iter().map(RawId::Integer).collect(),
        None => values.into_iter().map(|x| RawId::Text(x.clone())).collect(),
    }
}

/// An interaction keyed by external identifiers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawInteraction {
    /// External user identifier.
    pub user: String,
    /// External item identifier.
    pub item: String,
    /// Rating or implicit feedback flag.
    pub rating: Rating,
    /// Interaction time.
    pub timestamp: Timestamp,
}

/// Interactions re-keyed with dense ids, together with the encoders that
/// map them back to external identifiers.
#[derive(Clone, Debug)]
pub struct EncodedInteractions {
    /// The re-keyed interactions, in input order.
    pub interactions: Interactions,
    /// Encoder for user identifiers.
    pub user_encoder: LabelEncoder<RawId>,
    /// Encoder for item identifiers.
    pub item_encoder: LabelEncoder<RawId>,
}

impl EncodedInteractions {
    /// Number of distinct users.
    pub fn num_users(&self) -> usize {
        self.user_encoder.num_classes()
    }

    /// Number of distinct items.
    pub fn num_items(&self) -> usize {
        self.item_encoder.num_classes()
    }
}

/// Replace external user and item identifiers with dense ids.
///
/// Dense ids follow the sorted order of the external ids: numeric when
/// every id of the column is an integer, lexicographic otherwise.
pub fn encode_user_item(raw: &[RawInteraction]) -> Result<EncodedInteractions, EvaluationError> {
    let user_ids = column_ids(raw.iter().map(|x| &x.user));
    let item_ids = column_ids(raw.iter().map(|x| &x.item));

    let user_encoder = LabelEncoder::fit(&user_ids);
    let item_encoder = LabelEncoder::fit(&item_ids);

    let interactions = raw
        .iter()
        .zip(user_ids.iter().zip(item_ids.iter()))
        .map(|(x, (user, item))| -> Result<Interaction, EvaluationError> {
            Ok(Interaction::new(
                user_encoder.transform(user)?,
                item_encoder.transform(item)?,
                x.rating,
                x.timestamp,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Encoded {} interactions: {} users, {} items",
        interactions.len(),
        user_encoder.num_classes(),
        item_encoder.num_classes()
    );

    Ok(EncodedInteractions {
        interactions: Interactions::from(interactions),
        user_encoder,
        item_encoder,
    })
}
