use std::sync::Arc;

use crate::application::ports::{ConversationRepository, TokenVerifier};
use crate::application::services::{ChatProducer, StreamGateway};
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub producer: Arc<ChatProducer>,
    pub stream_gateway: StreamGateway,
    pub conversation_repository: Arc<dyn ConversationRepository>,
    pub token_verifier: Arc<dyn TokenVerifier>,
    pub settings: Settings,
}
