//! List reconciliation
//!
//! Turns an observed and a desired list into the remote change needed to
//! converge, under ordered or set semantics.

use crate::types::ValueType;
use std::collections::BTreeSet;

/// How element order is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    /// Position matters; any difference replaces the whole list
    Ordered,
    /// Membership only
    Unordered,
}

impl ListOrder {
    /// Semantics of a list-typed property, `None` for scalars.
    pub fn of(value_type: ValueType) -> Option<Self> {
        match value_type {
            ValueType::OrderedList => Some(Self::Ordered),
            ValueType::UnorderedList => Some(Self::Unordered),
            _ => None,
        }
    }
}

/// Remote change for one list property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange {
    /// Already converged; no remote call
    Unchanged,
    /// Send the full new value, in the caller's order
    Replace(Vec<String>),
    /// Incremental membership change
    Patch {
        added: Vec<String>,
        removed: Vec<String>,
    },
}

impl ListChange {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Compute the change that takes `observed` to `desired`.
///
/// `incremental` says whether the device can add and remove individual
/// members; it only affects unordered lists. Ordered lists have no positional
/// patch primitive and are always replaced.
pub fn reconcile(
    order: ListOrder,
    observed: &[String],
    desired: &[String],
    incremental: bool,
) -> ListChange {
    match order {
        ListOrder::Ordered => {
            if observed == desired {
                ListChange::Unchanged
            } else {
                ListChange::Replace(desired.to_vec())
            }
        }
        ListOrder::Unordered => {
            let have: BTreeSet<&String> = observed.iter().collect();
            let want: BTreeSet<&String> = desired.iter().collect();
            if have == want {
                return ListChange::Unchanged;
            }
            if !incremental {
                return ListChange::Replace(dedup(desired));
            }
            ListChange::Patch {
                added: dedup_filtered(desired, |e| !have.contains(e)),
                removed: dedup_filtered(observed, |e| !want.contains(e)),
            }
        }
    }
}

/// Whether two lists are equal under the given semantics.
pub fn equivalent(order: ListOrder, a: &[String], b: &[String]) -> bool {
    reconcile(order, a, b, false).is_unchanged()
}

fn dedup(items: &[String]) -> Vec<String> {
    dedup_filtered(items, |_| true)
}

// Keeps first-seen order so replacements honour the caller's ordering.
fn dedup_filtered(items: &[String], keep: impl Fn(&String) -> bool) -> Vec<String> {
    let mut seen = BTreeSet::new();
    items
        .iter()
        .filter(|e| keep(e) && seen.insert(e.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unordered_equal_sets_unchanged() {
        let change = reconcile(
            ListOrder::Unordered,
            &l(&["ether4", "ether3"]),
            &l(&["ether3", "ether4"]),
            true,
        );
        assert_eq!(change, ListChange::Unchanged);
    }

    #[test]
    fn test_unordered_patch_is_symmetric_difference() {
        let change = reconcile(
            ListOrder::Unordered,
            &l(&["ether3", "ether4"]),
            &l(&["ether3", "ether5"]),
            true,
        );
        assert_eq!(
            change,
            ListChange::Patch {
                added: l(&["ether5"]),
                removed: l(&["ether4"]),
            }
        );
    }

    #[test]
    fn test_unordered_without_patch_replaces() {
        let change = reconcile(
            ListOrder::Unordered,
            &l(&["ether3", "ether4"]),
            &l(&["ether3", "ether5"]),
            false,
        );
        assert_eq!(change, ListChange::Replace(l(&["ether3", "ether5"])));
    }

    #[test]
    fn test_unordered_duplicates_collapse() {
        let change = reconcile(
            ListOrder::Unordered,
            &l(&["aes-ccm"]),
            &l(&["aes-ccm", "aes-ccm"]),
            false,
        );
        assert_eq!(change, ListChange::Unchanged);

        let change = reconcile(ListOrder::Unordered, &[], &l(&["tkip", "tkip", "aes-ccm"]), false);
        assert_eq!(change, ListChange::Replace(l(&["tkip", "aes-ccm"])));
    }

    #[test]
    fn test_ordered_reorder_replaces() {
        let change = reconcile(
            ListOrder::Ordered,
            &l(&["0", "1", "2"]),
            &l(&["2", "1", "0"]),
            true,
        );
        assert_eq!(change, ListChange::Replace(l(&["2", "1", "0"])));
    }

    #[test]
    fn test_ordered_equal_unchanged() {
        let change = reconcile(ListOrder::Ordered, &l(&["0", "5"]), &l(&["0", "5"]), false);
        assert!(change.is_unchanged());
    }

    #[test]
    fn test_to_empty() {
        let change = reconcile(ListOrder::Unordered, &l(&["a"]), &[], true);
        assert_eq!(
            change,
            ListChange::Patch {
                added: vec![],
                removed: l(&["a"]),
            }
        );
        let change = reconcile(ListOrder::Ordered, &l(&["a"]), &[], true);
        assert_eq!(change, ListChange::Replace(vec![]));
    }

    #[test]
    fn test_equivalent() {
        assert!(equivalent(ListOrder::Unordered, &l(&["a", "b"]), &l(&["b", "a"])));
        assert!(!equivalent(ListOrder::Ordered, &l(&["a", "b"]), &l(&["b", "a"])));
    }
}
