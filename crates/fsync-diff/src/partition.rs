//! Two-sequence partitioning
//!
//! [`diff`] splits two sequences into items found only on the left, only on
//! the right, or on both sides. Pairing is first-match: when several
//! unconsumed left items are equal to a right item, the earliest one wins.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Where an item was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffPartition<T> {
    /// Only in the left sequence
    Left(T),
    /// Only in the right sequence
    Right(T),
    /// In both sequences; left value first
    Intersecting(T, T),
}

impl<T> DiffPartition<T> {
    /// Left value, if present
    pub fn left(&self) -> Option<&T> {
        match self {
            Self::Left(l) | Self::Intersecting(l, _) => Some(l),
            Self::Right(_) => None,
        }
    }

    /// Right value, if present
    pub fn right(&self) -> Option<&T> {
        match self {
            Self::Right(r) | Self::Intersecting(_, r) => Some(r),
            Self::Left(_) => None,
        }
    }

    /// Whether only the left side holds the item
    pub fn is_left(&self) -> bool {
        matches!(self, Self::Left(_))
    }

    /// Whether only the right side holds the item
    pub fn is_right(&self) -> bool {
        matches!(self, Self::Right(_))
    }

    /// Whether both sides hold the item
    pub fn is_intersecting(&self) -> bool {
        matches!(self, Self::Intersecting(..))
    }

    /// Split into the optional left and right values
    pub fn into_parts(self) -> (Option<T>, Option<T>) {
        match self {
            Self::Left(l) => (Some(l), None),
            Self::Right(r) => (None, Some(r)),
            Self::Intersecting(l, r) => (Some(l), Some(r)),
        }
    }
}

/// Equality expressed through a hashable key
///
/// Two items are equal exactly when their keys are equal.
pub trait KeyComparer<T: ?Sized> {
    /// Comparison key
    type Key: Hash + Eq;

    /// Key of `item`
    fn key(&self, item: &T) -> Self::Key;

    /// Whether `a` and `b` are equal under this comparer
    fn equals(&self, a: &T, b: &T) -> bool {
        self.key(a) == self.key(b)
    }
}

impl<T: ?Sized, C: KeyComparer<T>> KeyComparer<T> for &C {
    type Key = C::Key;

    fn key(&self, item: &T) -> Self::Key {
        (**self).key(item)
    }
}

/// Compares items by their own value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityComparer;

impl<T: Hash + Eq + Clone> KeyComparer<T> for IdentityComparer {
    type Key = T;

    fn key(&self, item: &T) -> T {
        item.clone()
    }
}

/// Lazy partition of two sequences, see [`diff`]
#[derive(Debug)]
pub struct SetDiff<T, R, C>
where
    C: KeyComparer<T>,
{
    left: Vec<Option<T>>,
    index: HashMap<C::Key, VecDeque<usize>>,
    right: R,
    right_done: bool,
    leftover_cursor: usize,
    comparer: C,
}

/// Partition `left` and `right` with `comparer`
///
/// Every right item is yielded once, in order, either paired with the first
/// unconsumed equal left item or alone. The left items that were never
/// paired follow, in their original order. The left side is collected up
/// front; the right side is pulled lazily.
pub fn diff<T, L, R, C>(left: L, right: R, comparer: C) -> SetDiff<T, R::IntoIter, C>
where
    L: IntoIterator<Item = T>,
    R: IntoIterator<Item = T>,
    C: KeyComparer<T>,
{
    let left: Vec<Option<T>> = left.into_iter().map(Some).collect();
    let mut index: HashMap<C::Key, VecDeque<usize>> = HashMap::with_capacity(left.len());
    for (position, item) in left.iter().enumerate() {
        if let Some(item) = item {
            index
                .entry(comparer.key(item))
                .or_default()
                .push_back(position);
        }
    }

    SetDiff {
        left,
        index,
        right: right.into_iter(),
        right_done: false,
        leftover_cursor: 0,
        comparer,
    }
}

impl<T, R, C> SetDiff<T, R, C>
where
    R: Iterator<Item = T>,
    C: KeyComparer<T>,
{
    fn take_match(&mut self, right: &T) -> Option<T> {
        let queue = self.index.get_mut(&self.comparer.key(right))?;
        let position = queue.pop_front()?;
        self.left[position].take()
    }
}

impl<T, R, C> Iterator for SetDiff<T, R, C>
where
    R: Iterator<Item = T>,
    C: KeyComparer<T>,
{
    type Item = DiffPartition<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.right_done {
            match self.right.next() {
                Some(right) => {
                    return Some(match self.take_match(&right) {
                        Some(left) => DiffPartition::Intersecting(left, right),
                        None => DiffPartition::Right(right),
                    });
                }
                None => {
                    self.right_done = true;
                    self.index.clear();
                }
            }
        }

        while self.leftover_cursor < self.left.len() {
            let position = self.leftover_cursor;
            self.leftover_cursor += 1;
            if let Some(left) = self.left[position].take() {
                return Some(DiffPartition::Left(left));
            }
        }
        None
    }
}

/// Method-call form of [`diff`]
pub trait DiffExt: IntoIterator + Sized {
    /// Partition `self` (left) against `right`
    fn diff_by<R, C>(self, right: R, comparer: C) -> SetDiff<Self::Item, R::IntoIter, C>
    where
        R: IntoIterator<Item = Self::Item>,
        C: KeyComparer<Self::Item>,
    {
        diff(self, right, comparer)
    }

    /// Partition `self` against `right` by value
    fn diff_with<R>(self, right: R) -> SetDiff<Self::Item, R::IntoIter, IdentityComparer>
    where
        R: IntoIterator<Item = Self::Item>,
        Self::Item: Hash + Eq + Clone,
    {
        diff(self, right, IdentityComparer)
    }
}

impl<I: IntoIterator> DiffExt for I {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct IgnoreCase;

    impl KeyComparer<&str> for IgnoreCase {
        type Key = String;

        fn key(&self, item: &&str) -> String {
            item.to_lowercase()
        }
    }

    #[test]
    fn test_right_order_then_leftovers() {
        let parts: Vec<_> = vec![1, 2, 3, 4].diff_with(vec![3, 5, 1]).collect();

        assert_eq!(
            parts,
            vec![
                DiffPartition::Intersecting(3, 3),
                DiffPartition::Right(5),
                DiffPartition::Intersecting(1, 1),
                DiffPartition::Left(2),
                DiffPartition::Left(4),
            ]
        );
    }

    #[test]
    fn test_first_match_consumes_left_duplicates_in_order() {
        let left = vec!["a.txt", "A.TXT", "b"];
        let right = vec!["A.txt", "a.TXT", "a.txt"];

        let parts: Vec<_> = diff(left, right, IgnoreCase).collect();

        assert_eq!(
            parts,
            vec![
                DiffPartition::Intersecting("a.txt", "A.txt"),
                DiffPartition::Intersecting("A.TXT", "a.TXT"),
                DiffPartition::Right("a.txt"),
                DiffPartition::Left("b"),
            ]
        );
    }

    #[test]
    fn test_empty_inputs() {
        let parts: Vec<DiffPartition<u8>> = Vec::new().diff_with(Vec::new()).collect();
        assert!(parts.is_empty());

        let only_left: Vec<_> = vec![7].diff_with(Vec::new()).collect();
        assert_eq!(only_left, vec![DiffPartition::Left(7)]);
    }

    #[test]
    fn test_right_side_is_pulled_lazily() {
        let mut pulled = 0;
        let right = std::iter::from_fn(|| {
            pulled += 1;
            Some(pulled)
        });
        let first_two: Vec<_> = diff(vec![2], right, IdentityComparer).take(2).collect();

        assert_eq!(
            first_two,
            vec![DiffPartition::Right(1), DiffPartition::Intersecting(2, 2)]
        );
    }

    #[test]
    fn test_partition_accessors() {
        let both = DiffPartition::Intersecting("l", "r");
        assert_eq!(both.left(), Some(&"l"));
        assert_eq!(both.right(), Some(&"r"));
        assert!(both.is_intersecting());
        assert_eq!(DiffPartition::Left(1).into_parts(), (Some(1), None));
        assert!(DiffPartition::Right(1).is_right());
    }

    proptest! {
        #[test]
        fn test_every_item_accounted_for(
            left in proptest::collection::vec(0u8..16, 0..40),
            right in proptest::collection::vec(0u8..16, 0..40),
        ) {
            let parts: Vec<_> = left.clone().diff_with(right.clone()).collect();

            let rights: Vec<u8> = parts.iter().filter_map(|p| p.right().copied()).collect();
            prop_assert_eq!(&rights, &right);

            let mut lefts: Vec<u8> = parts.iter().filter_map(|p| p.left().copied()).collect();
            let mut expected_left = left.clone();
            lefts.sort_unstable();
            expected_left.sort_unstable();
            prop_assert_eq!(lefts, expected_left);

            for part in &parts {
                if let DiffPartition::Intersecting(l, r) = part {
                    prop_assert_eq!(l, r);
                }
            }

            let leftovers: Vec<u8> = parts
                .iter()
                .skip_while(|p| !p.is_left())
                .map(|p| *p.left().unwrap())
                .collect();
            prop_assert_eq!(leftovers.len(), parts.iter().filter(|p| p.is_left()).count());
        }
    }
}
