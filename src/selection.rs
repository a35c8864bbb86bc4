//! Which pending items the operator has ticked for closing, per bucket.
//!
//! "All selected" is never stored. It is computed from the ticked keys and
//! the bucket's current pending keys, so it cannot drift from either.

use crate::bucket::BucketKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    buckets: BTreeMap<BucketKey, BTreeSet<String>>,
}

impl Selection {
    pub fn is_selected(&self, bucket: &BucketKey, raw_key: &str) -> bool {
        self.buckets
            .get(bucket)
            .is_some_and(|keys| keys.contains(raw_key))
    }

    pub fn selected(&self, bucket: &BucketKey) -> Vec<String> {
        self.buckets
            .get(bucket)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Flips one item and returns whether it is now selected.
    pub fn toggle(&mut self, bucket: &BucketKey, raw_key: &str) -> bool {
        let keys = self.buckets.entry(*bucket).or_default();
        let now_selected = if keys.remove(raw_key) {
            false
        } else {
            keys.insert(raw_key.to_string());
            true
        };
        if keys.is_empty() {
            self.buckets.remove(bucket);
        }
        now_selected
    }

    /// Selects every pending key of the bucket, or deselects them all when
    /// they already were. Returns the resulting "all selected" flag.
    pub fn select_all(&mut self, bucket: &BucketKey, pending: &BTreeSet<String>) -> bool {
        if pending.is_empty() || self.all_selected(bucket, pending) {
            self.buckets.remove(bucket);
            return false;
        }
        self.buckets.insert(*bucket, pending.clone());
        true
    }

    pub fn all_selected(&self, bucket: &BucketKey, pending: &BTreeSet<String>) -> bool {
        !pending.is_empty() && pending.iter().all(|key| self.is_selected(bucket, key))
    }

    /// Drops ticks on keys that are no longer pending, e.g. after a close.
    pub fn retain_pending(&mut self, bucket: &BucketKey, pending: &BTreeSet<String>) {
        if let Some(keys) = self.buckets.get_mut(bucket) {
            keys.retain(|key| pending.contains(key));
            if keys.is_empty() {
                self.buckets.remove(bucket);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn first() -> BucketKey {
        "07-03 1SH".parse().unwrap()
    }

    fn second() -> BucketKey {
        "07-03 2SH".parse().unwrap()
    }

    #[test]
    fn toggle_flips_single_items() {
        let mut selection = Selection::default();
        assert!(selection.toggle(&first(), "Burger"));
        assert!(selection.is_selected(&first(), "Burger"));
        assert!(!selection.toggle(&first(), "Burger"));
        assert_eq!(selection, Selection::default());
    }

    #[test]
    fn deselecting_one_clears_only_that_buckets_flag() {
        let pending_first = keys(&["Burger", "Fries"]);
        let pending_second = keys(&["Nuggets"]);
        let mut selection = Selection::default();

        assert!(selection.select_all(&first(), &pending_first));
        assert!(selection.select_all(&second(), &pending_second));

        selection.toggle(&first(), "Fries");
        assert!(!selection.all_selected(&first(), &pending_first));
        assert!(selection.all_selected(&second(), &pending_second));
        assert_eq!(selection.selected(&first()), ["Burger"]);
    }

    #[test]
    fn ticking_the_last_item_by_hand_sets_the_flag() {
        let pending = keys(&["Burger", "Fries"]);
        let mut selection = Selection::default();
        selection.toggle(&first(), "Burger");
        assert!(!selection.all_selected(&first(), &pending));
        selection.toggle(&first(), "Fries");
        assert!(selection.all_selected(&first(), &pending));
    }

    #[test]
    fn select_all_twice_deselects() {
        let pending = keys(&["Burger", "Fries"]);
        let mut selection = Selection::default();
        assert!(selection.select_all(&first(), &pending));
        assert!(!selection.select_all(&first(), &pending));
        assert!(selection.selected(&first()).is_empty());
    }

    #[test]
    fn select_all_replaces_stale_ticks() {
        let mut selection = Selection::default();
        selection.toggle(&first(), "Burger--wasted");
        selection.select_all(&first(), &keys(&["Fries"]));
        assert_eq!(selection.selected(&first()), ["Fries"]);
    }

    #[test]
    fn empty_bucket_is_never_all_selected() {
        let mut selection = Selection::default();
        assert!(!selection.select_all(&first(), &BTreeSet::new()));
        assert!(!selection.all_selected(&first(), &BTreeSet::new()));
    }

    #[test]
    fn flag_follows_pending_set_changes() {
        let mut selection = Selection::default();
        selection.select_all(&first(), &keys(&["Burger"]));
        // A new pending item appeared after a reload.
        let reloaded = keys(&["Burger", "Fries"]);
        assert!(!selection.all_selected(&first(), &reloaded));

        selection.retain_pending(&first(), &keys(&["Fries"]));
        assert!(selection.selected(&first()).is_empty());
    }
}
