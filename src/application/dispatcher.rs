//! Command dispatcher: the core-facing slice of the command front-end.
//!
//! Transports hand over already-parsed commands; the dispatcher validates
//! their arguments and routes them to the registry or the aggregator.

use std::sync::Arc;

use super::aggregator::{Aggregation, OfferAggregator};
use super::registry::WatchRegistry;
use crate::domain::{UserId, WatchEntry};
use crate::error::WatchError;

/// A parsed user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// One-shot search, independent of the registry.
    Search { query: String },
    /// Start watching `query` until it costs at most `limit`.
    Watch { query: String, limit: i64 },
    /// Stop watching the entry at a 1-based position, as typed by the user.
    Unwatch { index: String },
    /// List the caller's watches.
    List,
}

/// Result of a dispatched command.
#[derive(Debug, Clone)]
pub enum Reply {
    Offers(Aggregation),
    Watching(WatchEntry),
    Removed(WatchEntry),
    Watches(Vec<WatchEntry>),
}

/// Routes commands to the registry and aggregator.
#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<WatchRegistry>,
    aggregator: Arc<OfferAggregator>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<WatchRegistry>, aggregator: Arc<OfferAggregator>) -> Self {
        Self {
            registry,
            aggregator,
        }
    }

    /// Execute one command on behalf of `owner`.
    pub async fn dispatch(&self, owner: &UserId, command: Command) -> Result<Reply, WatchError> {
        match command {
            Command::Search { query } => self.search(&query).await.map(Reply::Offers),
            Command::Watch { query, limit } => {
                self.watch(owner, &query, limit).map(Reply::Watching)
            }
            Command::Unwatch { index } => self.unwatch(owner, &index).map(Reply::Removed),
            Command::List => Ok(Reply::Watches(self.list(owner))),
        }
    }

    /// Aggregate offers for `query` right now.
    pub async fn search(&self, query: &str) -> Result<Aggregation, WatchError> {
        if query.trim().is_empty() {
            return Err(WatchError::EmptyQuery);
        }
        Ok(self.aggregator.aggregate(query).await)
    }

    pub fn watch(&self, owner: &UserId, query: &str, limit: i64) -> Result<WatchEntry, WatchError> {
        self.registry.add(owner.clone(), query, limit)
    }

    /// Remove a watch by its 1-based position given as text.
    pub fn unwatch(&self, owner: &UserId, index: &str) -> Result<WatchEntry, WatchError> {
        let index = index
            .trim()
            .parse::<usize>()
            .map_err(|_| WatchError::InvalidIndex(index.trim().to_string()))?;
        self.registry.remove_at(owner, index)
    }

    #[must_use]
    pub fn list(&self, owner: &UserId) -> Vec<WatchEntry> {
        self.registry.list(owner)
    }
}
