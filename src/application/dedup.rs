//! Notification deduplication.
//!
//! Tracks which watches have already produced an alert so a watch fires at
//! most once per arming. Keys never expire; they leave the set only when the
//! registry re-arms them.
//!
//! Delivery is two-phase: [`NotificationDeduper::begin`] reserves the current
//! arming before the alert is sent and [`NotificationDeduper::complete`]
//! records it afterwards. A [`NotificationDeduper::clear`] that lands between
//! the two cancels the reservation, so a watch re-added or removed while its
//! alert is in flight is never marked fired.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::domain::NotificationKey;

/// Reservation for one alert on one arming of a key.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pending alert must be completed or abandoned"]
pub struct PendingAlert {
    key: NotificationKey,
    generation: u64,
}

#[derive(Debug, Default)]
struct DedupState {
    fired: HashSet<NotificationKey>,
    in_flight: HashMap<NotificationKey, u64>,
    next_generation: u64,
}

/// Set of keys whose alert has already been delivered.
#[derive(Debug, Default)]
pub struct NotificationDeduper {
    state: Mutex<DedupState>,
}

impl NotificationDeduper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an alert was already delivered for `key`.
    #[must_use]
    pub fn has_fired(&self, key: &NotificationKey) -> bool {
        self.state.lock().fired.contains(key)
    }

    /// Reserve the current arming of `key` for delivery.
    ///
    /// Returns `None` if the key has already fired.
    pub fn begin(&self, key: &NotificationKey) -> Option<PendingAlert> {
        let mut state = self.state.lock();
        if state.fired.contains(key) {
            return None;
        }
        state.next_generation += 1;
        let generation = state.next_generation;
        state.in_flight.insert(key.clone(), generation);
        Some(PendingAlert {
            key: key.clone(),
            generation,
        })
    }

    /// Record a delivered alert.
    ///
    /// Returns `false` without marking anything when the key was cleared
    /// after `begin`; the newer arming stays eligible.
    pub fn complete(&self, pending: PendingAlert) -> bool {
        let mut state = self.state.lock();
        if state.in_flight.get(&pending.key) != Some(&pending.generation) {
            return false;
        }
        state.in_flight.remove(&pending.key);
        state.fired.insert(pending.key)
    }

    /// Drop a reservation whose alert was not delivered.
    pub fn abandon(&self, pending: PendingAlert) {
        let mut state = self.state.lock();
        if state.in_flight.get(&pending.key) == Some(&pending.generation) {
            state.in_flight.remove(&pending.key);
        }
    }

    /// Re-arm `key`, cancelling any reservation in flight. Returns `true` if
    /// it had fired.
    pub fn clear(&self, key: &NotificationKey) -> bool {
        let mut state = self.state.lock();
        state.in_flight.remove(key);
        state.fired.remove(key)
    }

    /// Number of fired keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().fired.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().fired.is_empty()
    }

    /// Number of reservations awaiting `complete` or `abandon`.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn key(owner: &str, query: &str, limit: u64) -> NotificationKey {
        NotificationKey {
            owner: UserId::new(owner),
            query: query.to_string(),
            limit,
        }
    }

    fn fire(deduper: &NotificationDeduper, key: &NotificationKey) -> bool {
        deduper
            .begin(key)
            .is_some_and(|pending| deduper.complete(pending))
    }

    #[test]
    fn begin_then_complete_marks_fired() {
        let deduper = NotificationDeduper::new();
        assert!(!deduper.has_fired(&key("u1", "ps5", 100)));

        assert!(fire(&deduper, &key("u1", "ps5", 100)));
        assert!(deduper.has_fired(&key("u1", "ps5", 100)));
        assert!(deduper.begin(&key("u1", "ps5", 100)).is_none());
        assert_eq!(deduper.len(), 1);
        assert_eq!(deduper.in_flight(), 0);
    }

    #[test]
    fn clear_rearms_only_that_key() {
        let deduper = NotificationDeduper::new();
        fire(&deduper, &key("u1", "ps5", 100));
        fire(&deduper, &key("u1", "ps5", 200));

        assert!(deduper.clear(&key("u1", "ps5", 100)));
        assert!(!deduper.clear(&key("u1", "ps5", 100)));
        assert!(!deduper.has_fired(&key("u1", "ps5", 100)));
        assert!(deduper.has_fired(&key("u1", "ps5", 200)));
    }

    #[test]
    fn keys_are_scoped_per_owner() {
        let deduper = NotificationDeduper::new();
        fire(&deduper, &key("u1", "ps5", 100));
        assert!(!deduper.has_fired(&key("u2", "ps5", 100)));
    }

    #[test]
    fn clear_during_delivery_keeps_key_armed() {
        let deduper = NotificationDeduper::new();
        let pending = deduper.begin(&key("u1", "ps5", 100)).unwrap();

        deduper.clear(&key("u1", "ps5", 100));

        assert!(!deduper.complete(pending));
        assert!(!deduper.has_fired(&key("u1", "ps5", 100)));
        assert!(deduper.is_empty());
        assert_eq!(deduper.in_flight(), 0);
    }

    #[test]
    fn stale_reservation_cannot_complete_newer_one() {
        let deduper = NotificationDeduper::new();
        let stale = deduper.begin(&key("u1", "ps5", 100)).unwrap();
        let fresh = deduper.begin(&key("u1", "ps5", 100)).unwrap();

        assert!(!deduper.complete(stale));
        assert!(deduper.complete(fresh));
        assert!(deduper.has_fired(&key("u1", "ps5", 100)));
    }

    #[test]
    fn abandon_releases_reservation() {
        let deduper = NotificationDeduper::new();
        let pending = deduper.begin(&key("u1", "ps5", 100)).unwrap();

        deduper.abandon(pending);

        assert_eq!(deduper.in_flight(), 0);
        assert!(!deduper.has_fired(&key("u1", "ps5", 100)));
        assert!(fire(&deduper, &key("u1", "ps5", 100)));
    }
}
