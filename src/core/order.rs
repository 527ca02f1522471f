use crate::domain::model::Placeholder;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Explicit orders are spread out by this factor so later stages can slot widgets in between.
pub const EXPLICIT_ORDER_SPACING: i32 = 100;

/// The growing list of placeholders of one analysis plus the per-cell order index.
///
/// Every placeholder goes through [`PlaceholderSet::push`], which keeps the highest order seen
/// per `(row, column)` cell and the set of remote identities already taken.
#[derive(Debug, Default)]
pub struct PlaceholderSet {
    placeholders: Vec<Placeholder>,
    max_order: HashMap<(i32, i32), i32>,
    identities: HashSet<Uuid>,
}

impl PlaceholderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Order for the next placeholder in `(row, column)`.
    ///
    /// A positive `requested` order is scaled by [`EXPLICIT_ORDER_SPACING`]. Otherwise the
    /// placeholder is appended after the highest order in the cell, and a fresh cell starts at 1.
    pub fn next_order(&self, row: i32, column: i32, requested: i32) -> i32 {
        if requested > 0 {
            return requested.saturating_mul(EXPLICIT_ORDER_SPACING);
        }

        self.max_order
            .get(&(row, column))
            .map(|max| max.saturating_add(1))
            .unwrap_or(1)
    }

    pub fn push(&mut self, placeholder: Placeholder) {
        self.max_order
            .entry((placeholder.row, placeholder.column))
            .and_modify(|max| *max = (*max).max(placeholder.order))
            .or_insert(placeholder.order);

        if let Some(identity) = placeholder.identity {
            self.identities.insert(identity);
        }

        self.placeholders.push(placeholder);
    }

    pub fn contains_identity(&self, identity: &Uuid) -> bool {
        self.identities.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.placeholders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placeholder> {
        self.placeholders.iter()
    }

    pub fn into_vec(self) -> Vec<Placeholder> {
        self.placeholders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder(row: i32, column: i32, order: i32) -> Placeholder {
        Placeholder {
            row,
            column,
            order,
            ..Default::default()
        }
    }

    #[test]
    fn test_fresh_cell_starts_at_one() {
        let set = PlaceholderSet::new();
        assert_eq!(set.next_order(1, 1, 0), 1);
        assert_eq!(set.next_order(3, 2, -4), 1);
    }

    #[test]
    fn test_unordered_placeholders_append_in_cell() {
        let mut set = PlaceholderSet::new();
        for expected in 1..=5 {
            let order = set.next_order(2, 1, 0);
            assert_eq!(order, expected);
            set.push(placeholder(2, 1, order));
        }

        // Other cells are unaffected
        assert_eq!(set.next_order(1, 1, 0), 1);
        assert_eq!(set.next_order(2, 2, 0), 1);
    }

    #[test]
    fn test_explicit_order_is_scaled() {
        let mut set = PlaceholderSet::new();
        assert_eq!(set.next_order(1, 1, 3), 300);

        set.push(placeholder(1, 1, 300));
        // Explicit orders ignore what is already in the cell
        assert_eq!(set.next_order(1, 1, 1), 100);
        // Unordered placeholders go after the highest order
        assert_eq!(set.next_order(1, 1, 0), 301);
    }

    #[test]
    fn test_orders_saturate_at_the_top() {
        let mut set = PlaceholderSet::new();
        assert_eq!(set.next_order(1, 1, i32::MAX / 10), i32::MAX);

        set.push(placeholder(1, 1, i32::MAX));
        assert_eq!(set.next_order(1, 1, 0), i32::MAX);
    }

    #[test]
    fn test_max_order_ignores_insertion_order() {
        let mut set = PlaceholderSet::new();
        set.push(placeholder(1, 1, 205));
        set.push(placeholder(1, 1, 3));
        assert_eq!(set.next_order(1, 1, 0), 206);
    }

    #[test]
    fn test_identities_are_tracked() {
        let mut set = PlaceholderSet::new();
        let id = Uuid::new_v4();
        set.push(Placeholder {
            identity: Some(id),
            ..placeholder(1, 1, 1)
        });
        set.push(placeholder(1, 1, 2));

        assert!(set.contains_identity(&id));
        assert!(!set.contains_identity(&Uuid::new_v4()));
        assert_eq!(set.len(), 2);
        assert_eq!(set.into_vec().len(), 2);
    }
}
