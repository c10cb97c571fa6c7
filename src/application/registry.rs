//! Tracked-item registry.
//!
//! Owns every user's watches and keeps the deduper in step with them: adding
//! or removing a watch re-arms its notification key. The map itself is never
//! exposed; the checker works on copies taken with [`WatchRegistry::snapshot`].

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::dedup::NotificationDeduper;
use crate::domain::{UserId, WatchEntry};
use crate::error::WatchError;

/// Registry of watches keyed by owner, in insertion order per owner.
#[derive(Debug)]
pub struct WatchRegistry {
    entries: RwLock<BTreeMap<UserId, Vec<WatchEntry>>>,
    deduper: Arc<NotificationDeduper>,
}

impl WatchRegistry {
    /// Create an empty registry that re-arms keys in `deduper`.
    #[must_use]
    pub fn new(deduper: Arc<NotificationDeduper>) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            deduper,
        }
    }

    /// Append a watch for `owner`.
    ///
    /// Duplicates are allowed. Any stale fired key for the same
    /// `(owner, query, limit)` is cleared so re-adding means "watch again".
    pub fn add(&self, owner: UserId, query: &str, limit: i64) -> Result<WatchEntry, WatchError> {
        let entry = WatchEntry::new(owner, query, limit)?;

        let mut entries = self.entries.write();
        entries
            .entry(entry.owner().clone())
            .or_default()
            .push(entry.clone());
        let rearmed = self.deduper.clear(&entry.key());
        drop(entries);

        debug!(
            owner = %entry.owner(),
            query = entry.normalized_query(),
            limit = entry.limit(),
            rearmed,
            "Watch added"
        );
        Ok(entry)
    }

    /// List `owner`'s watches in insertion order.
    #[must_use]
    pub fn list(&self, owner: &UserId) -> Vec<WatchEntry> {
        self.entries.read().get(owner).cloned().unwrap_or_default()
    }

    /// Remove the watch at 1-based `index` and re-arm its key.
    pub fn remove_at(&self, owner: &UserId, index: usize) -> Result<WatchEntry, WatchError> {
        let mut entries = self.entries.write();
        let watches = match entries.get_mut(owner) {
            Some(watches) if !watches.is_empty() => watches,
            _ => return Err(WatchError::NoWatches),
        };

        let len = watches.len();
        if index == 0 || index > len {
            return Err(WatchError::IndexOutOfRange { index, len });
        }

        let removed = watches.remove(index - 1);
        if watches.is_empty() {
            entries.remove(owner);
        }
        self.deduper.clear(&removed.key());
        drop(entries);

        debug!(
            owner = %owner,
            query = removed.normalized_query(),
            limit = removed.limit(),
            "Watch removed"
        );
        Ok(removed)
    }

    /// Copy every watch out of the registry.
    ///
    /// Taken under a single read lock, so it never observes a half-applied
    /// mutation and is unaffected by later ones.
    #[must_use]
    pub fn snapshot(&self) -> Vec<WatchEntry> {
        self.entries.read().values().flatten().cloned().collect()
    }

    /// Total number of watches across all owners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Number of owners with at least one watch.
    #[must_use]
    pub fn owner_count(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (WatchRegistry, Arc<NotificationDeduper>) {
        let deduper = Arc::new(NotificationDeduper::new());
        (WatchRegistry::new(Arc::clone(&deduper)), deduper)
    }

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    fn fire(deduper: &NotificationDeduper, entry: &WatchEntry) {
        let pending = deduper.begin(&entry.key()).unwrap();
        assert!(deduper.complete(pending));
    }

    #[test]
    fn list_is_empty_for_unknown_owner() {
        let (registry, _) = registry();
        assert!(registry.list(&user("nobody")).is_empty());
    }

    #[test]
    fn add_keeps_insertion_order() {
        let (registry, _) = registry();
        registry.add(user("u1"), "ps5", 50_000).unwrap();
        registry.add(user("u1"), "iPhone 15", 80_000).unwrap();
        registry.add(user("u1"), "ps5", 50_000).unwrap();

        let queries: Vec<_> = registry
            .list(&user("u1"))
            .iter()
            .map(|e| e.query().to_string())
            .collect();
        assert_eq!(queries, vec!["ps5", "iPhone 15", "ps5"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn add_rejects_invalid_input() {
        let (registry, _) = registry();
        assert_eq!(
            registry.add(user("u1"), "  ", 10),
            Err(WatchError::EmptyQuery)
        );
        assert_eq!(
            registry.add(user("u1"), "ps5", 0),
            Err(WatchError::NonPositiveLimit(0))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_at_uses_one_based_index() {
        let (registry, _) = registry();
        registry.add(user("u1"), "a", 1).unwrap();
        registry.add(user("u1"), "b", 2).unwrap();

        let removed = registry.remove_at(&user("u1"), 2).unwrap();
        assert_eq!(removed.query(), "b");
        assert_eq!(registry.list(&user("u1")).len(), 1);
    }

    #[test]
    fn remove_at_rejects_out_of_range() {
        let (registry, _) = registry();
        registry.add(user("u1"), "a", 1).unwrap();
        registry.add(user("u1"), "b", 2).unwrap();

        assert_eq!(
            registry.remove_at(&user("u1"), 0),
            Err(WatchError::IndexOutOfRange { index: 0, len: 2 })
        );
        assert_eq!(
            registry.remove_at(&user("u1"), 3),
            Err(WatchError::IndexOutOfRange { index: 3, len: 2 })
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn remove_at_without_watches() {
        let (registry, _) = registry();
        assert_eq!(
            registry.remove_at(&user("u1"), 1),
            Err(WatchError::NoWatches)
        );

        registry.add(user("u1"), "a", 1).unwrap();
        registry.remove_at(&user("u1"), 1).unwrap();
        assert_eq!(
            registry.remove_at(&user("u1"), 1),
            Err(WatchError::NoWatches)
        );
        assert_eq!(registry.owner_count(), 0);
    }

    #[test]
    fn remove_only_affects_one_duplicate() {
        let (registry, _) = registry();
        registry.add(user("u1"), "ps5", 100).unwrap();
        registry.add(user("u1"), "ps5", 100).unwrap();

        registry.remove_at(&user("u1"), 1).unwrap();
        assert_eq!(registry.list(&user("u1")).len(), 1);
    }

    #[test]
    fn remove_clears_fired_key() {
        let (registry, deduper) = registry();
        let entry = registry.add(user("u1"), "ps5", 100).unwrap();
        fire(&deduper, &entry);

        registry.remove_at(&user("u1"), 1).unwrap();
        assert!(!deduper.has_fired(&entry.key()));
    }

    #[test]
    fn re_adding_clears_stale_key() {
        let (registry, deduper) = registry();
        let entry = registry.add(user("u1"), "PS5", 100).unwrap();
        fire(&deduper, &entry);

        registry.add(user("u1"), " ps5 ", 100).unwrap();
        assert!(!deduper.has_fired(&entry.key()));
    }

    #[test]
    fn adding_other_limit_keeps_fired_key() {
        let (registry, deduper) = registry();
        let entry = registry.add(user("u1"), "ps5", 100).unwrap();
        fire(&deduper, &entry);

        registry.add(user("u1"), "ps5", 200).unwrap();
        assert!(deduper.has_fired(&entry.key()));
    }

    #[test]
    fn snapshot_is_detached() {
        let (registry, _) = registry();
        registry.add(user("u1"), "a", 1).unwrap();
        registry.add(user("u2"), "b", 2).unwrap();

        let snapshot = registry.snapshot();
        registry.add(user("u1"), "c", 3).unwrap();
        registry.remove_at(&user("u2"), 1).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len(), 2);
        assert!(snapshot.iter().any(|e| e.query() == "b"));
    }
}
