use std::sync::Arc;

use crate::application::ports::{ConversationRepository, QueueStoreError, RepositoryError};
use crate::application::services::JobQueue;
use crate::domain::{Attachment, ChatJob, Conversation, ConversationId, JobId, UserId};
use crate::infrastructure::observability::sanitize_prompt;

/// Accepts chat requests and turns them into queued jobs.
pub struct ChatProducer {
    conversation_repository: Arc<dyn ConversationRepository>,
    job_queue: JobQueue,
}

#[derive(Debug, Clone)]
pub struct ChatSubmission {
    pub user_id: UserId,
    pub prompt: String,
    pub conversation_id: Option<String>,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, Copy)]
pub struct EnqueueReceipt {
    pub conversation_id: ConversationId,
    pub job_id: JobId,
}

#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("conversation not found or not owned by caller")]
    Forbidden,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("queue: {0}")]
    Queue(#[from] QueueStoreError),
}

impl ChatProducer {
    pub fn new(conversation_repository: Arc<dyn ConversationRepository>, job_queue: JobQueue) -> Self {
        Self {
            conversation_repository,
            job_queue,
        }
    }

    #[tracing::instrument(skip(self, submission), fields(user_id = %submission.user_id))]
    pub async fn enqueue(&self, submission: ChatSubmission) -> Result<EnqueueReceipt, ProducerError> {
        if submission.prompt.trim().is_empty() {
            return Err(ProducerError::Validation("Prompt must not be empty".to_string()));
        }

        let conversation_id = match submission.conversation_id.as_deref() {
            None => {
                self.create_conversation(&submission.user_id, None)
                    .await?
                    .id
            }
            Some(raw) => {
                let id = raw
                    .parse::<ConversationId>()
                    .map_err(|_| ProducerError::Forbidden)?;
                let owned = self
                    .conversation_repository
                    .conversation_owned_by(id, &submission.user_id)
                    .await?;
                if !owned {
                    tracing::warn!(conversation_id = %id, "Rejected submission to foreign or missing conversation");
                    return Err(ProducerError::Forbidden);
                }
                id
            }
        };

        let job = ChatJob::new(
            conversation_id,
            submission.user_id,
            submission.prompt,
            submission.attachment,
        );
        self.job_queue.push(&job).await?;

        tracing::info!(
            job_id = %job.id,
            conversation_id = %conversation_id,
            prompt = %sanitize_prompt(&job.prompt),
            has_attachment = job.attachment.is_some(),
            "Chat job enqueued"
        );

        Ok(EnqueueReceipt {
            conversation_id,
            job_id: job.id,
        })
    }

    pub async fn create_conversation(
        &self,
        user_id: &UserId,
        title: Option<String>,
    ) -> Result<Conversation, ProducerError> {
        let conversation = Conversation::new(user_id.clone(), title);
        self.conversation_repository
            .create_conversation(&conversation)
            .await?;
        tracing::debug!(conversation_id = %conversation.id, "Conversation created");
        Ok(conversation)
    }

    pub async fn queue_depth(&self) -> Result<usize, ProducerError> {
        Ok(self.job_queue.depth().await?)
    }
}
