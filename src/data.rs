//! Row types and the interaction table.
use std::cmp::Ordering;
use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use super::{ItemId, Rating, Timestamp, UserId};

/// Rows that can be keyed by user and item.
pub trait UserItemKey {
    /// The user this row belongs to.
    fn user_id(&self) -> UserId;
    /// The item this row refers to.
    fn item_id(&self) -> ItemId;
}

impl UserItemKey for (UserId, ItemId) {
    fn user_id(&self) -> UserId {
        self.0
    }
    fn item_id(&self) -> ItemId {
        self.1
    }
}

/// Column used to group rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    /// Group by user id.
    User,
    /// Group by item id.
    Item,
}

impl GroupBy {
    /// Value of the grouping column for `row`.
    pub fn key<T: UserItemKey>(&self, row: &T) -> usize {
        match *self {
            GroupBy::User => row.user_id(),
            GroupBy::Item => row.item_id(),
        }
    }
}

/// A single (user, item, rating, timestamp) observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    user_id: UserId,
    item_id: ItemId,
    rating: Rating,
    timestamp: Timestamp,
}

impl Interaction {
    /// Build a new interaction.
    pub fn new(user_id: UserId, item_id: ItemId, rating: Rating, timestamp: Timestamp) -> Self {
        Interaction {
            user_id,
            item_id,
            rating,
            timestamp,
        }
    }

    /// Explicit rating, or a binary flag for implicit feedback.
    pub fn rating(&self) -> Rating {
        self.rating
    }

    /// Ordering key for chronological splits.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl UserItemKey for Interaction {
    fn user_id(&self) -> UserId {
        self.user_id
    }
    fn item_id(&self) -> ItemId {
        self.item_id
    }
}

/// A model score for a (user, item) pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    user_id: UserId,
    item_id: ItemId,
    score: Rating,
}

impl Prediction {
    /// Build a new prediction.
    pub fn new(user_id: UserId, item_id: ItemId, score: Rating) -> Self {
        Prediction {
            user_id,
            item_id,
            score,
        }
    }

    /// The predicted score.
    pub fn score(&self) -> Rating {
        self.score
    }

    /// Copy of this prediction with a different score.
    pub fn with_score(&self, score: Rating) -> Self {
        Prediction { score, ..*self }
    }
}

impl UserItemKey for Prediction {
    fn user_id(&self) -> UserId {
        self.user_id
    }
    fn item_id(&self) -> ItemId {
        self.item_id
    }
}

/// A prediction that survived top-K selection, with its 1-based rank
/// inside its group.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedPrediction {
    user_id: UserId,
    item_id: ItemId,
    score: Rating,
    rank: usize,
}

impl RankedPrediction {
    /// Attach `rank` to `prediction`.
    pub fn new(prediction: &Prediction, rank: usize) -> Self {
        RankedPrediction {
            user_id: prediction.user_id,
            item_id: prediction.item_id,
            score: prediction.score,
            rank,
        }
    }

    /// The predicted score.
    pub fn score(&self) -> Rating {
        self.score
    }

    /// Rank within the group; 1 is the highest score.
    pub fn rank(&self) -> usize {
        self.rank
    }
}

impl UserItemKey for RankedPrediction {
    fn user_id(&self) -> UserId {
        self.user_id
    }
    fn item_id(&self) -> ItemId {
        self.item_id
    }
}

/// A recommended item that is relevant according to the ground truth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    user_id: UserId,
    item_id: ItemId,
    rank: usize,
}

impl Hit {
    /// Build a new hit.
    pub fn new(user_id: UserId, item_id: ItemId, rank: usize) -> Self {
        Hit {
            user_id,
            item_id,
            rank,
        }
    }

    /// Rank at which the item was recommended.
    pub fn rank(&self) -> usize {
        self.rank
    }
}

impl UserItemKey for Hit {
    fn user_id(&self) -> UserId {
        self.user_id
    }
    fn item_id(&self) -> ItemId {
        self.item_id
    }
}

/// Per-user count of hits and of relevant items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitCount {
    /// The user.
    pub user_id: UserId,
    /// Number of top-K recommendations that are relevant.
    pub hit: usize,
    /// Number of relevant items in the ground truth.
    pub actual: usize,
}

/// A binarized implicit-feedback row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledInteraction {
    user_id: UserId,
    item_id: ItemId,
    label: u8,
}

impl LabeledInteraction {
    /// A positive (label 1) row.
    pub fn positive(user_id: UserId, item_id: ItemId) -> Self {
        LabeledInteraction {
            user_id,
            item_id,
            label: 1,
        }
    }

    /// A negative (label 0) row.
    pub fn negative(user_id: UserId, item_id: ItemId) -> Self {
        LabeledInteraction {
            user_id,
            item_id,
            label: 0,
        }
    }

    /// 1 for positive feedback, 0 for negative.
    pub fn label(&self) -> u8 {
        self.label
    }
}

impl UserItemKey for LabeledInteraction {
    fn user_id(&self) -> UserId {
        self.user_id
    }
    fn item_id(&self) -> ItemId {
        self.item_id
    }
}

/// Compare rows by their group key and then by timestamp.
pub fn cmp_timestamp(group_by: GroupBy) -> impl Fn(&Interaction, &Interaction) -> Ordering {
    move |x, y| {
        group_by
            .key(x)
            .cmp(&group_by.key(y))
            .then_with(|| x.timestamp().cmp(&y.timestamp()))
    }
}

/// An ordered table of interactions.
///
/// Tables produced by the splitters carry the index of the partition they
/// belong to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Interactions {
    interactions: Vec<Interaction>,
    split_index: Option<usize>,
}

impl Interactions {
    /// Build an empty table.
    pub fn new() -> Self {
        Interactions {
            interactions: Vec::new(),
            split_index: None,
        }
    }

    /// The rows of the table.
    pub fn data(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Append a row.
    pub fn push(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    /// Index of the partition this table was produced as, if any.
    pub fn split_index(&self) -> Option<usize> {
        self.split_index
    }

    /// Tag the table with a partition index.
    pub fn with_split_index(mut self, split_index: usize) -> Self {
        self.split_index = Some(split_index);
        self
    }

    /// Shuffle the rows in place.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.interactions.shuffle(rng);
    }

    /// Sort rows with a stable sort.
    pub fn sort_by<F: FnMut(&Interaction, &Interaction) -> Ordering>(&mut self, compare: F) {
        self.interactions.sort_by(compare);
    }

    /// Copy rows `start..stop` into a new table.
    pub fn slice(&self, start: usize, stop: usize) -> Self {
        Interactions {
            interactions: self.interactions[start..stop].to_owned(),
            split_index: None,
        }
    }

    /// Distinct user ids, in order of first appearance.
    pub fn user_ids(&self) -> Vec<UserId> {
        distinct(self.interactions.iter().map(|x| x.user_id()))
    }

    /// Distinct item ids, in order of first appearance.
    pub fn item_ids(&self) -> Vec<ItemId> {
        distinct(self.interactions.iter().map(|x| x.item_id()))
    }

    /// Number of distinct users.
    pub fn num_users(&self) -> usize {
        self.user_ids().len()
    }

    /// Number of distinct items.
    pub fn num_items(&self) -> usize {
        self.item_ids().len()
    }

    /// Consume the table, returning its rows.
    pub fn into_vec(self) -> Vec<Interaction> {
        self.interactions
    }
}

impl From<Vec<Interaction>> for Interactions {
    fn from(data: Vec<Interaction>) -> Interactions {
        Interactions {
            interactions: data,
            split_index: None,
        }
    }
}

/// Distinct values of `values`, in order of first appearance.
pub fn distinct<I: IntoIterator<Item = usize>>(values: I) -> Vec<usize> {
    let mut seen = HashSet::new();

    values.into_iter().filter(|x| seen.insert(*x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_ids_keep_first_seen_order() {
        let data = Interactions::from(vec![
            Interaction::new(3, 10, 1.0, 0),
            Interaction::new(1, 12, 1.0, 0),
            Interaction::new(3, 11, 1.0, 0),
            Interaction::new(2, 10, 1.0, 0),
        ]);

        assert_eq!(data.user_ids(), vec![3, 1, 2]);
        assert_eq!(data.item_ids(), vec![10, 12, 11]);
        assert_eq!(data.num_users(), 3);
        assert_eq!(data.num_items(), 3);
    }

    #[test]
    fn timestamp_ordering_is_grouped() {
        let mut data = Interactions::from(vec![
            Interaction::new(1, 0, 1.0, 5),
            Interaction::new(0, 1, 1.0, 9),
            Interaction::new(1, 2, 1.0, 1),
            Interaction::new(0, 3, 1.0, 2),
        ]);

        data.sort_by(cmp_timestamp(GroupBy::User));

        let order: Vec<_> = data.data().iter().map(|x| x.item_id()).collect();
        assert_eq!(order, vec![3, 1, 2, 0]);

        data.sort_by(cmp_timestamp(GroupBy::Item));
        let order: Vec<_> = data.data().iter().map(|x| x.item_id()).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn split_index_tagging() {
        let data = Interactions::from(vec![Interaction::new(0, 0, 1.0, 0)]);
        assert_eq!(data.split_index(), None);
        assert_eq!(data.slice(0, 1).with_split_index(2).split_index(), Some(2));
    }
}
