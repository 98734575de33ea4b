use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::Instrument;

use crate::application::ports::{
    ConversationRepository, QueueStoreError, ReplyGenerator, ReplyGeneratorError, RepositoryError,
};
use crate::application::services::{Dequeued, JobQueue, StreamChannels, StreamError, tokenize_reply};
use crate::domain::{
    ChatJob, ConversationId, DEFAULT_TITLE_MARKERS, JobId, JobValidationError, Message,
    StreamEvent, title_from_prompt,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Dequeuing,
    Generating,
    Persisting,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Idle => "idle",
            WorkerState::Dequeuing => "dequeuing",
            WorkerState::Generating => "generating",
            WorkerState::Persisting => "persisting",
        };
        write!(f, "{}", s)
    }
}

/// Result of the best-effort retitle that follows the user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleUpdate {
    Renamed(String),
    /// The title was already set; nothing changed.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct JobReport {
    pub job_id: JobId,
    pub conversation_id: ConversationId,
    pub reply: String,
    pub tokens_streamed: usize,
    pub title_update: TitleUpdate,
}

#[derive(Debug)]
pub enum IterationOutcome {
    Completed(JobReport),
    Dropped(JobValidationError),
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    pub token_delay: Duration,
    pub error_backoff: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            token_delay: Duration::from_millis(30),
            error_backoff: Duration::from_secs(1),
        }
    }
}

/// Single sequential consumer of the job queue.
///
/// Jobs are processed at most once: a job is gone from the queue as soon as it
/// is popped, and a failure while generating or persisting loses it.
pub struct ChatWorker {
    job_queue: JobQueue,
    stream_channels: StreamChannels,
    conversation_repository: Arc<dyn ConversationRepository>,
    reply_generator: Arc<dyn ReplyGenerator>,
    config: WorkerConfig,
    state: watch::Sender<WorkerState>,
}

impl ChatWorker {
    pub fn new(
        job_queue: JobQueue,
        stream_channels: StreamChannels,
        conversation_repository: Arc<dyn ConversationRepository>,
        reply_generator: Arc<dyn ReplyGenerator>,
        config: WorkerConfig,
    ) -> Self {
        let (state, _) = watch::channel(WorkerState::Idle);
        Self {
            job_queue,
            stream_channels,
            conversation_repository,
            reply_generator,
            config,
            state,
        }
    }

    pub fn subscribe_state(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    pub async fn run(self) {
        tracing::info!(queue = %self.job_queue.key(), "Chat worker started");
        loop {
            match self.run_once().await {
                Ok(IterationOutcome::Completed(report)) => {
                    tracing::info!(
                        job_id = %report.job_id,
                        conversation_id = %report.conversation_id,
                        tokens = report.tokens_streamed,
                        title_update = ?report.title_update,
                        "Chat job completed"
                    );
                }
                Ok(IterationOutcome::Dropped(reason)) => {
                    tracing::warn!(error = %reason, "Discarded malformed chat job");
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        backoff_ms = self.config.error_backoff.as_millis() as u64,
                        "Chat job failed; job is lost"
                    );
                    tokio::time::sleep(self.config.error_backoff).await;
                }
            }
        }
    }

    /// One `Dequeuing → … → Idle` cycle. Blocks until a payload is available.
    pub async fn run_once(&self) -> Result<IterationOutcome, WorkerError> {
        self.transition(WorkerState::Dequeuing);
        let dequeued = self.job_queue.pop().await;

        let outcome = match dequeued {
            Ok(Dequeued::Job(job)) => {
                let span = tracing::info_span!(
                    "chat_job",
                    job_id = %job.id,
                    conversation_id = %job.conversation_id,
                );
                self.process_job(job)
                    .instrument(span)
                    .await
                    .map(IterationOutcome::Completed)
            }
            Ok(Dequeued::Malformed(reason)) => Ok(IterationOutcome::Dropped(reason)),
            Err(e) => Err(WorkerError::Queue(e)),
        };

        self.transition(WorkerState::Idle);
        outcome
    }

    async fn process_job(&self, job: ChatJob) -> Result<JobReport, WorkerError> {
        self.transition(WorkerState::Persisting);
        let user_content = match &job.attachment {
            Some(attachment) => format!("{}\n\n{}", job.prompt, attachment.annotation()),
            None => job.prompt.clone(),
        };
        self.conversation_repository
            .append_message(&Message::user(job.conversation_id, user_content))
            .await
            .map_err(WorkerError::Persistence)?;

        let title_update = self.update_title(&job).await;

        self.transition(WorkerState::Generating);
        let reply = self
            .reply_generator
            .generate(&job)
            .await
            .map_err(WorkerError::Generation)?;
        let tokens_streamed = self.stream_reply(job.conversation_id, &reply).await?;

        self.transition(WorkerState::Persisting);
        self.conversation_repository
            .append_message(&Message::assistant(job.conversation_id, reply.clone()))
            .await
            .map_err(WorkerError::Persistence)?;

        Ok(JobReport {
            job_id: job.id,
            conversation_id: job.conversation_id,
            reply,
            tokens_streamed,
            title_update,
        })
    }

    async fn stream_reply(
        &self,
        conversation_id: ConversationId,
        reply: &str,
    ) -> Result<usize, WorkerError> {
        let tokens = tokenize_reply(reply);
        for token in &tokens {
            self.stream_channels
                .publish(conversation_id, &StreamEvent::token(token.as_str()))
                .await?;
            if !self.config.token_delay.is_zero() {
                tokio::time::sleep(self.config.token_delay).await;
            }
        }
        self.stream_channels
            .publish(conversation_id, &StreamEvent::done())
            .await?;
        tracing::debug!(tokens = tokens.len(), "Reply streamed");
        Ok(tokens.len())
    }

    async fn update_title(&self, job: &ChatJob) -> TitleUpdate {
        let title = title_from_prompt(&job.prompt);
        match self
            .conversation_repository
            .rename_if_default(job.conversation_id, &title, &DEFAULT_TITLE_MARKERS)
            .await
        {
            Ok(true) => {
                tracing::debug!(title = %title, "Conversation retitled");
                TitleUpdate::Renamed(title)
            }
            Ok(false) => TitleUpdate::Skipped,
            Err(e) => {
                tracing::warn!(error = %e, "Conversation retitle failed");
                TitleUpdate::Failed(e.to_string())
            }
        }
    }

    fn transition(&self, next: WorkerState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::trace!(from = %previous, to = %next, "Worker state transition");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("queue: {0}")]
    Queue(#[from] QueueStoreError),
    #[error("stream: {0}")]
    Stream(#[from] StreamError),
    #[error("persistence: {0}")]
    Persistence(RepositoryError),
    #[error("generation: {0}")]
    Generation(ReplyGeneratorError),
}
