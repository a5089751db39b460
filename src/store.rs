// src/store.rs
//! Article store collaborator: hands out the recent window and takes accepted
//! items. Persistence mechanics live behind the trait.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::item::{CandidateItem, RecentWindowItem};

#[async_trait::async_trait]
pub trait ArticleStore: Send + Sync {
    /// Previously accepted items created at or after `since`.
    async fn recent_window(&self, since: DateTime<Utc>) -> Result<Vec<RecentWindowItem>>;

    /// Persist accepted items. Returns how many were stored.
    async fn store_accepted(&self, items: &[CandidateItem]) -> Result<usize>;
}

/// Bounded in-memory store; oldest items are evicted past `capacity`.
#[derive(Debug)]
pub struct InMemoryArticleStore {
    items: Mutex<VecDeque<RecentWindowItem>>,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl InMemoryArticleStore {
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity.min(10_000))),
            capacity,
            clock,
        }
    }

    /// Seed with items that already carry a creation time.
    pub fn push(&self, item: RecentWindowItem) {
        let mut v = self.items.lock();
        v.push_back(item);
        while v.len() > self.capacity {
            v.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn recent_window(&self, since: DateTime<Utc>) -> Result<Vec<RecentWindowItem>> {
        let v = self.items.lock();
        Ok(v.iter().filter(|it| it.created_at >= since).cloned().collect())
    }

    async fn store_accepted(&self, items: &[CandidateItem]) -> Result<usize> {
        let now = self.clock.now();
        for it in items {
            self.push(RecentWindowItem::new(it.title.clone(), it.body.clone(), now));
        }
        Ok(items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone};

    #[tokio::test]
    async fn window_filters_by_creation_time() {
        let t0 = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(t0));
        let store = InMemoryArticleStore::with_clock(100, clock.clone());

        store
            .store_accepted(&[CandidateItem::new("1", "old", "", "https://e.x/1")])
            .await
            .unwrap();
        clock.advance(Duration::days(3));
        store
            .store_accepted(&[CandidateItem::new("2", "new", "", "https://e.x/2")])
            .await
            .unwrap();

        let w = store.recent_window(t0 + Duration::days(1)).await.unwrap();
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].title, "new");
        assert_eq!(w[0].created_at, t0 + Duration::days(3));
    }

    #[tokio::test]
    async fn capacity_evicts_oldest() {
        let store = InMemoryArticleStore::new(2);
        let items: Vec<_> = (0..3)
            .map(|i| CandidateItem::new(i.to_string(), format!("t{i}"), "", "https://e.x/"))
            .collect();
        assert_eq!(store.store_accepted(&items).await.unwrap(), 3);
        assert_eq!(store.len(), 2);
        let w = store.recent_window(Utc::now() - Duration::days(1)).await.unwrap();
        assert_eq!(w[0].title, "t1");
    }
}
