use std::sync::Arc;

use crate::application::ports::{QueueStore, QueueStoreError};
use crate::domain::{ChatJob, JobValidationError};

pub const DEFAULT_JOB_QUEUE_KEY: &str = "chat_jobs";

/// The global job FIFO on top of a [`QueueStore`].
#[derive(Clone)]
pub struct JobQueue {
    store: Arc<dyn QueueStore>,
    key: String,
}

/// What came off the queue: a usable job, or a payload the consumer must drop.
#[derive(Debug)]
pub enum Dequeued {
    Job(ChatJob),
    Malformed(JobValidationError),
}

impl JobQueue {
    pub fn new(store: Arc<dyn QueueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn push(&self, job: &ChatJob) -> Result<(), QueueStoreError> {
        let payload = job
            .to_json()
            .map_err(|e| QueueStoreError::Serialization(e.to_string()))?;
        self.store.push(&self.key, payload).await
    }

    pub async fn depth(&self) -> Result<usize, QueueStoreError> {
        self.store.len(&self.key).await
    }

    /// Blocks until a payload is available. The payload is gone from the store
    /// once this returns, whatever the caller does with it.
    pub async fn pop(&self) -> Result<Dequeued, QueueStoreError> {
        let raw = self.store.pop_blocking(&self.key).await?;
        Ok(match ChatJob::from_json(&raw) {
            Ok(job) => Dequeued::Job(job),
            Err(e) => Dequeued::Malformed(e),
        })
    }
}
