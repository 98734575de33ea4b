use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Attachment, ConversationId, JobId, UserId};

/// One chat request waiting for (or undergoing) asynchronous processing.
#[derive(Debug, Clone)]
pub struct ChatJob {
    pub id: JobId,
    pub conversation_id: ConversationId,
    pub user_id: UserId,
    pub prompt: String,
    pub attachment: Option<Attachment>,
    pub enqueued_at: DateTime<Utc>,
}

/// Queue payload as it travels through the queue store.
///
/// Identifiers are kept as strings so that a consumer can tell a malformed
/// payload apart from a transport failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    pub id: Uuid,
    pub conversation_id: String,
    pub user_id: String,
    pub prompt: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

#[derive(Debug, thiserror::Error)]
pub enum JobValidationError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("invalid conversation id: {0}")]
    InvalidConversationId(String),
    #[error("empty prompt")]
    EmptyPrompt,
}

impl ChatJob {
    pub fn new(
        conversation_id: ConversationId,
        user_id: UserId,
        prompt: String,
        attachment: Option<Attachment>,
    ) -> Self {
        Self {
            id: JobId::new(),
            conversation_id,
            user_id,
            prompt,
            attachment,
            enqueued_at: Utc::now(),
        }
    }

    pub fn to_payload(&self) -> JobPayload {
        JobPayload {
            id: self.id.as_uuid(),
            conversation_id: self.conversation_id.to_string(),
            user_id: self.user_id.as_str().to_string(),
            prompt: self.prompt.clone(),
            timestamp: self.enqueued_at,
            attachment: self.attachment.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_payload())
    }

    pub fn from_json(raw: &str) -> Result<Self, JobValidationError> {
        let payload: JobPayload = serde_json::from_str(raw)
            .map_err(|e| JobValidationError::MalformedPayload(e.to_string()))?;
        Self::try_from(payload)
    }
}

impl TryFrom<JobPayload> for ChatJob {
    type Error = JobValidationError;

    fn try_from(payload: JobPayload) -> Result<Self, Self::Error> {
        let conversation_id = payload
            .conversation_id
            .parse::<ConversationId>()
            .map_err(|_| JobValidationError::InvalidConversationId(payload.conversation_id))?;

        if payload.prompt.trim().is_empty() {
            return Err(JobValidationError::EmptyPrompt);
        }

        Ok(Self {
            id: JobId::from_uuid(payload.id),
            conversation_id,
            user_id: UserId::new(payload.user_id),
            prompt: payload.prompt,
            attachment: payload.attachment,
            enqueued_at: payload.timestamp,
        })
    }
}
