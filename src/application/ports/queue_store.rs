use std::time::Duration;

use async_trait::async_trait;

/// Shared FIFO lists addressed by key, living outside the process.
///
/// `pop_blocking` waits without a deadline until an element is available; it
/// must not be implemented as a sleep-poll loop.
#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn push(&self, key: &str, payload: String) -> Result<(), QueueStoreError>;

    /// Pushes and (re)arms a time-to-live on the whole list, so lists nobody
    /// drains are reclaimed.
    async fn push_with_ttl(
        &self,
        key: &str,
        payload: String,
        ttl: Duration,
    ) -> Result<(), QueueStoreError>;

    async fn len(&self, key: &str) -> Result<usize, QueueStoreError>;

    async fn pop_blocking(&self, key: &str) -> Result<String, QueueStoreError>;

    async fn ping(&self) -> Result<(), QueueStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum QueueStoreError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
    #[error("serialization failed: {0}")]
    Serialization(String),
}
