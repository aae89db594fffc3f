//! Candidate generation: the dense user×item grid and anti-joins against
//! already-observed pairs.
use std::collections::HashSet;

use data::{distinct, UserItemKey};
use {ItemId, UserId};

/// Columns used to match rows in [`filter_excluding`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyColumns {
    /// Match on user id only.
    User,
    /// Match on item id only.
    Item,
    /// Match on the (user id, item id) pair.
    UserItem,
}

impl KeyColumns {
    fn key<T: UserItemKey>(&self, row: &T) -> (Option<UserId>, Option<ItemId>) {
        match *self {
            KeyColumns::User => (Some(row.user_id()), None),
            KeyColumns::Item => (None, Some(row.item_id())),
            KeyColumns::UserItem => (Some(row.user_id()), Some(row.item_id())),
        }
    }
}

/// Every (user, item) pair over the distinct users and items of `table`,
/// whether or not the pair was observed.
///
/// Users and items are enumerated in order of first appearance, users in
/// the outer loop.
pub fn cross_join<T: UserItemKey>(table: &[T]) -> Vec<(UserId, ItemId)> {
    let user_ids = distinct(table.iter().map(|x| x.user_id()));
    let item_ids = distinct(table.iter().map(|x| x.item_id()));

    let mut pairs = Vec::with_capacity(user_ids.len() * item_ids.len());

    for &user_id in &user_ids {
        for &item_id in &item_ids {
            pairs.push((user_id, item_id));
        }
    }

    debug!(
        "Cross join of {} users and {} items: {} pairs",
        user_ids.len(),
        item_ids.len(),
        pairs.len()
    );

    pairs
}

/// Rows of `table` whose `key_columns` do not appear in `exclude`.
pub fn filter_excluding<T, U>(table: &[T], exclude: &[U], key_columns: KeyColumns) -> Vec<T>
where
    T: UserItemKey + Clone,
    U: UserItemKey,
{
    if exclude.is_empty() {
        return table.to_vec();
    }

    let excluded: HashSet<_> = exclude.iter().map(|x| key_columns.key(x)).collect();

    table
        .iter()
        .filter(|x| !excluded.contains(&key_columns.key(*x)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use data::{Interaction, Prediction};

    fn interactions() -> Vec<Interaction> {
        vec![
            Interaction::new(2, 7, 4.0, 0),
            Interaction::new(1, 5, 3.0, 1),
            Interaction::new(2, 5, 1.0, 2),
        ]
    }

    #[test]
    fn cross_join_is_dense() {
        let pairs = cross_join(&interactions());

        assert_eq!(pairs, vec![(2, 7), (2, 5), (1, 7), (1, 5)]);
    }

    #[test]
    fn cross_join_of_empty_table() {
        let empty: Vec<Interaction> = Vec::new();
        assert!(cross_join(&empty).is_empty());
    }

    #[test]
    fn filter_by_pair() {
        let pairs = cross_join(&interactions());
        let unseen = filter_excluding(&pairs, &interactions(), KeyColumns::UserItem);

        assert_eq!(unseen, vec![(1, 7)]);
    }

    #[test]
    fn filter_by_single_column() {
        let predictions = vec![
            Prediction::new(1, 5, 0.5),
            Prediction::new(3, 5, 0.1),
            Prediction::new(3, 9, 0.2),
        ];
        let exclude = vec![(1, 100)];

        let by_user = filter_excluding(&predictions, &exclude, KeyColumns::User);
        assert_eq!(by_user, predictions[1..].to_vec());

        let exclude = vec![(42, 5)];
        let by_item = filter_excluding(&predictions, &exclude, KeyColumns::Item);
        assert_eq!(by_item, vec![predictions[2]]);
    }

    #[test]
    fn filter_with_empty_inputs() {
        let empty: Vec<(UserId, ItemId)> = Vec::new();
        let table = interactions();

        assert_eq!(
            filter_excluding(&table, &empty, KeyColumns::UserItem),
            table
        );
        assert!(filter_excluding(&empty, &table, KeyColumns::UserItem).is_empty());
    }
}
