use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{QueueStore, QueueStoreError};
use crate::domain::{ConversationId, StreamEvent};

pub const DEFAULT_STREAM_KEY_PREFIX: &str = "chat_stream:";

/// Per-conversation event queues. Each push re-arms the list TTL, so a stream
/// nobody opens disappears `ttl` after its last event.
#[derive(Clone)]
pub struct StreamChannels {
    store: Arc<dyn QueueStore>,
    key_prefix: String,
    ttl: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("queue store: {0}")]
    Store(#[from] QueueStoreError),
    #[error("undecodable event: {0}")]
    Decode(String),
}

impl StreamChannels {
    pub fn new(store: Arc<dyn QueueStore>, key_prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
            ttl,
        }
    }

    pub fn key_for(&self, conversation_id: ConversationId) -> String {
        format!("{}{}", self.key_prefix, conversation_id)
    }

    pub async fn publish(
        &self,
        conversation_id: ConversationId,
        event: &StreamEvent,
    ) -> Result<(), StreamError> {
        let payload =
            serde_json::to_string(event).map_err(|e| QueueStoreError::Serialization(e.to_string()))?;
        self.store
            .push_with_ttl(&self.key_for(conversation_id), payload, self.ttl)
            .await?;
        Ok(())
    }

    pub async fn next_event(&self, conversation_id: ConversationId) -> Result<StreamEvent, StreamError> {
        let raw = self
            .store
            .pop_blocking(&self.key_for(conversation_id))
            .await?;
        serde_json::from_str(&raw).map_err(|e| StreamError::Decode(e.to_string()))
    }

    pub async fn pending(&self, conversation_id: ConversationId) -> Result<usize, StreamError> {
        Ok(self.store.len(&self.key_for(conversation_id)).await?)
    }
}
