use std::sync::Arc;

use crate::application::ports::{ConversationRepository, QueueStore, ReplyGenerator};
use crate::application::services::{
    ChatProducer, ChatWorker, JobQueue, StreamChannels, StreamGateway,
};
use crate::infrastructure::auth::JwtTokenVerifier;
use crate::infrastructure::llm::CannedReplyGenerator;
use crate::infrastructure::persistence::{
    InMemoryConversationRepository, PgConversationRepository, create_pool, run_migrations,
};
use crate::infrastructure::queue::{InMemoryQueueStore, RedisQueueStore};
use crate::presentation::config::{PersistenceProvider, QueueProvider, Settings};
use crate::presentation::state::AppState;

/// Shared adapters both the API and the worker are built from.
#[derive(Clone)]
pub struct Components {
    pub conversation_repository: Arc<dyn ConversationRepository>,
    pub queue_store: Arc<dyn QueueStore>,
    pub job_queue: JobQueue,
    pub stream_channels: StreamChannels,
}

impl Components {
    pub fn from_parts(
        settings: &Settings,
        conversation_repository: Arc<dyn ConversationRepository>,
        queue_store: Arc<dyn QueueStore>,
    ) -> Self {
        let job_queue = JobQueue::new(Arc::clone(&queue_store), settings.queue.job_queue_key.clone());
        let stream_channels = StreamChannels::new(
            Arc::clone(&queue_store),
            settings.queue.stream_key_prefix.clone(),
            settings.stream.ttl(),
        );
        Self {
            conversation_repository,
            queue_store,
            job_queue,
            stream_channels,
        }
    }
}

pub async fn build_components(settings: &Settings) -> anyhow::Result<Components> {
    let conversation_repository: Arc<dyn ConversationRepository> = match settings.database.provider {
        PersistenceProvider::Postgres => {
            let pool = create_pool(&settings.database.url, settings.database.max_connections).await?;
            if settings.database.run_migrations {
                run_migrations(&pool).await?;
            }
            Arc::new(PgConversationRepository::new(pool))
        }
        PersistenceProvider::Memory => {
            tracing::warn!("Using in-memory conversation store; data is lost on restart");
            Arc::new(InMemoryConversationRepository::new())
        }
    };

    let queue_store: Arc<dyn QueueStore> = match settings.queue.provider {
        QueueProvider::Redis => Arc::new(RedisQueueStore::connect(&settings.redis.url).await?),
        QueueProvider::Memory => {
            tracing::warn!("Using in-process queue store; jobs are not shared across processes");
            Arc::new(InMemoryQueueStore::new())
        }
    };
    queue_store.ping().await?;

    Ok(Components::from_parts(settings, conversation_repository, queue_store))
}

pub fn build_worker(components: &Components, settings: &Settings) -> ChatWorker {
    let reply_generator: Arc<dyn ReplyGenerator> = Arc::new(CannedReplyGenerator::default());
    ChatWorker::new(
        components.job_queue.clone(),
        components.stream_channels.clone(),
        Arc::clone(&components.conversation_repository),
        reply_generator,
        settings.worker.worker_config(),
    )
}

pub fn build_app_state(components: &Components, settings: &Settings) -> AppState {
    let producer = ChatProducer::new(
        Arc::clone(&components.conversation_repository),
        components.job_queue.clone(),
    );
    AppState {
        producer: Arc::new(producer),
        stream_gateway: StreamGateway::new(components.stream_channels.clone()),
        conversation_repository: Arc::clone(&components.conversation_repository),
        token_verifier: Arc::new(JwtTokenVerifier::new(&settings.auth.jwt_secret)),
        settings: settings.clone(),
    }
}
