//! Watch entries and the keys used to deduplicate their alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;
use crate::error::WatchError;

/// Normalize a query for comparisons: trimmed, lowercased, single-spaced.
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A user's standing request to be alerted once a query drops to `limit`.
///
/// Entries are immutable once created; re-adding creates a new entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    owner: UserId,
    query: String,
    normalized: String,
    limit: u64,
    created_at: DateTime<Utc>,
}

impl WatchEntry {
    /// Validate input and build an entry.
    ///
    /// The display query keeps its casing; only surrounding and repeated
    /// whitespace is removed.
    pub fn new(owner: UserId, query: &str, limit: i64) -> Result<Self, WatchError> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Err(WatchError::EmptyQuery);
        }
        if limit <= 0 {
            return Err(WatchError::NonPositiveLimit(limit));
        }

        Ok(Self {
            owner,
            query: query.split_whitespace().collect::<Vec<_>>().join(" "),
            normalized,
            limit: limit.unsigned_abs(),
            created_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Query as the user typed it.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn normalized_query(&self) -> &str {
        &self.normalized
    }

    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Derive the deduplication key for this entry.
    #[must_use]
    pub fn key(&self) -> NotificationKey {
        NotificationKey {
            owner: self.owner.clone(),
            query: self.normalized.clone(),
            limit: self.limit,
        }
    }
}

/// `(owner, normalized query, limit)` triple identifying one armed watch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationKey {
    pub owner: UserId,
    pub query: String,
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_lowercases_and_collapses() {
        assert_eq!(normalize_query("  iPhone   15 PRO "), "iphone 15 pro");
        assert_eq!(normalize_query("   "), "");
    }

    #[test]
    fn entry_keeps_display_casing() {
        let entry = WatchEntry::new(UserId::new("u1"), "  PlayStation  5 ", 50_000).unwrap();
        assert_eq!(entry.query(), "PlayStation 5");
        assert_eq!(entry.normalized_query(), "playstation 5");
        assert_eq!(entry.limit(), 50_000);
    }

    #[test]
    fn entry_rejects_empty_query() {
        assert_eq!(
            WatchEntry::new(UserId::new("u1"), " \t ", 10),
            Err(WatchError::EmptyQuery)
        );
    }

    #[test]
    fn entry_rejects_non_positive_limit() {
        assert_eq!(
            WatchEntry::new(UserId::new("u1"), "ps5", 0),
            Err(WatchError::NonPositiveLimit(0))
        );
        assert_eq!(
            WatchEntry::new(UserId::new("u1"), "ps5", -5),
            Err(WatchError::NonPositiveLimit(-5))
        );
    }

    #[test]
    fn key_ignores_casing_and_spacing() {
        let a = WatchEntry::new(UserId::new("u1"), "iPhone 15", 80_000).unwrap();
        let b = WatchEntry::new(UserId::new("u1"), " iphone  15", 80_000).unwrap();
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn key_distinguishes_owner_and_limit() {
        let base = WatchEntry::new(UserId::new("u1"), "iphone", 80_000).unwrap();
        let other_owner = WatchEntry::new(UserId::new("u2"), "iphone", 80_000).unwrap();
        let other_limit = WatchEntry::new(UserId::new("u1"), "iphone", 70_000).unwrap();
        assert_ne!(base.key(), other_owner.key());
        assert_ne!(base.key(), other_limit.key());
    }
}
