use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use futures::StreamExt;
use jsonwebtoken::{EncodingKey, Header, encode};

use parley::application::services::{ChatProducer, ChatWorker, StreamGateway};
use parley::bootstrap::{Components, build_app_state, build_worker};
use parley::domain::{ConversationId, StreamEvent};
use parley::infrastructure::auth::SessionClaims;
use parley::infrastructure::persistence::InMemoryConversationRepository;
use parley::infrastructure::queue::InMemoryQueueStore;
use parley::presentation::{AppState, Settings, create_router};

pub const TEST_JWT_SECRET: &str = "test-secret-for-parley";

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    settings.worker.token_delay_ms = 0;
    settings.worker.error_backoff_ms = 10;
    settings
}

pub fn mint_token(user_id: &str) -> String {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to sign test token")
}

/// Everything wired against in-memory adapters, as a single-process deployment
/// would run it.
pub struct TestPipeline {
    pub settings: Settings,
    pub repository: Arc<InMemoryConversationRepository>,
    pub queue_store: Arc<InMemoryQueueStore>,
    pub components: Components,
}

impl TestPipeline {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let repository = Arc::new(InMemoryConversationRepository::new());
        let queue_store = Arc::new(InMemoryQueueStore::new());
        let components = Components::from_parts(
            &settings,
            Arc::clone(&repository) as _,
            Arc::clone(&queue_store) as _,
        );
        Self {
            settings,
            repository,
            queue_store,
            components,
        }
    }

    pub fn producer(&self) -> ChatProducer {
        ChatProducer::new(
            Arc::clone(&self.components.conversation_repository),
            self.components.job_queue.clone(),
        )
    }

    pub fn worker(&self) -> ChatWorker {
        build_worker(&self.components, &self.settings)
    }

    pub fn gateway(&self) -> StreamGateway {
        StreamGateway::new(self.components.stream_channels.clone())
    }

    pub fn app_state(&self) -> AppState {
        build_app_state(&self.components, &self.settings)
    }

    pub fn router(&self) -> Router {
        create_router(self.app_state())
    }
}

/// Drains one conversation's stream until the terminal event, failing the test
/// if it does not arrive in time.
pub async fn collect_stream(
    gateway: &StreamGateway,
    conversation_id: ConversationId,
) -> Vec<StreamEvent> {
    let stream = gateway.open(conversation_id);
    tokio::time::timeout(Duration::from_secs(5), async move {
        let mut stream = Box::pin(stream);
        let mut events = Vec::new();
        while let Some(item) = stream.next().await {
            events.push(item.expect("Stream yielded an error"));
        }
        events
    })
    .await
    .expect("Stream did not finish in time")
}
