use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::application::ports::{QueueStore, QueueStoreError};

/// Process-local queue store for tests and single-process deployments.
///
/// Blocked consumers park on a per-list [`Notify`]; a push wakes exactly one.
/// Expired lists are swept at most once per TTL interval.
#[derive(Default)]
pub struct InMemoryQueueStore {
    lists: Mutex<HashMap<String, Arc<ListSlot>>>,
    last_sweep: Mutex<Option<Instant>>,
}

#[derive(Default)]
struct ListSlot {
    state: Mutex<ListState>,
    notify: Notify,
}

#[derive(Default)]
struct ListState {
    items: VecDeque<String>,
    expires_at: Option<Instant>,
}

impl ListState {
    fn expire_if_due(&mut self, now: Instant) {
        if self.expires_at.is_some_and(|deadline| deadline <= now) {
            self.items.clear();
            self.expires_at = None;
        }
    }
}

impl ListSlot {
    fn lock(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &str) -> Arc<ListSlot> {
        let mut lists = self.lists.lock().unwrap_or_else(|p| p.into_inner());
        Arc::clone(lists.entry(key.to_string()).or_default())
    }

    /// Number of lists currently held, expired or not.
    pub fn list_count(&self) -> usize {
        self.lists.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    fn sweep_expired_if_due(&self, interval: Duration) {
        let now = Instant::now();
        {
            let mut last_sweep = self.last_sweep.lock().unwrap_or_else(|p| p.into_inner());
            if last_sweep.is_some_and(|at| now.duration_since(at) < interval) {
                return;
            }
            *last_sweep = Some(now);
        }
        self.sweep_expired(now);
    }

    /// Drops expired lists that no consumer is currently waiting on.
    fn sweep_expired(&self, now: Instant) {
        let mut lists = self.lists.lock().unwrap_or_else(|p| p.into_inner());
        lists.retain(|_, slot| {
            let mut state = slot.lock();
            state.expire_if_due(now);
            !(state.items.is_empty() && state.expires_at.is_none() && Arc::strong_count(slot) == 1)
        });
    }

    fn push_inner(&self, key: &str, payload: String, ttl: Option<Duration>) {
        let slot = self.slot(key);
        {
            let mut state = slot.lock();
            let now = Instant::now();
            state.expire_if_due(now);
            state.items.push_back(payload);
            if let Some(ttl) = ttl {
                state.expires_at = Some(now + ttl);
            }
        }
        slot.notify.notify_one();
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn push(&self, key: &str, payload: String) -> Result<(), QueueStoreError> {
        self.push_inner(key, payload, None);
        Ok(())
    }

    async fn push_with_ttl(
        &self,
        key: &str,
        payload: String,
        ttl: Duration,
    ) -> Result<(), QueueStoreError> {
        self.sweep_expired_if_due(ttl);
        self.push_inner(key, payload, Some(ttl));
        Ok(())
    }

    async fn len(&self, key: &str) -> Result<usize, QueueStoreError> {
        let slot = self.slot(key);
        let mut state = slot.lock();
        state.expire_if_due(Instant::now());
        Ok(state.items.len())
    }

    async fn pop_blocking(&self, key: &str) -> Result<String, QueueStoreError> {
        let slot = self.slot(key);
        loop {
            {
                let mut state = slot.lock();
                state.expire_if_due(Instant::now());
                if let Some(item) = state.items.pop_front() {
                    return Ok(item);
                }
            }
            slot.notify.notified().await;
        }
    }

    async fn ping(&self) -> Result<(), QueueStoreError> {
        Ok(())
    }
}
