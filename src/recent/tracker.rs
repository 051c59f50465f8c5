use std::sync::Arc;

use crate::store::{RecentStore, StoreError, StoreResult};

use super::set::{ItemRef, RecentSet};

/// Maintains each user's recently-visited set against the remote store.
///
/// Every operation is a fresh read-then-write round trip; nothing is cached
/// between calls, so sequential visits from one caller always observe the
/// previous write. Concurrent callers can lose an intermediate promotion
/// (last writer wins), but any individual write keeps the set well formed.
pub struct RecentTracker {
    store: Arc<dyn RecentStore>,
}

impl RecentTracker {
    pub fn new(store: Arc<dyn RecentStore>) -> Self {
        Self { store }
    }

    /// Record a visit to `item` and return the resulting set.
    ///
    /// A missing row counts as an empty set and is created on write. If the
    /// visited item is already the most recent one the write is skipped.
    /// Store failures are returned as-is; retrying is the caller's call.
    pub async fn record_visit(&self, user_id: &str, item: &ItemRef) -> StoreResult<RecentSet> {
        let current = match self.store.fetch_recent_set(user_id).await {
            Ok(row) => RecentSet::from_row(&row),
            Err(StoreError::NotFound(_)) => RecentSet::default(),
            Err(e) => return Err(e),
        };

        if current.head() == Some(item) {
            return Ok(current);
        }

        let next = current.visit(item);
        self.store.put_recent_set(&next.to_row(user_id)).await?;
        Ok(next)
    }

    /// The user's recent items, most recent first, empty and malformed
    /// slots dropped. `NotFound` means the user has no row at all; callers
    /// may treat that the same as an empty list.
    pub async fn recent_items(&self, user_id: &str) -> StoreResult<Vec<ItemRef>> {
        let row = self.store.fetch_recent_set(user_id).await?;
        Ok(RecentSet::from_row(&row).items())
    }
}
