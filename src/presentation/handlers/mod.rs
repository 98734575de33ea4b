mod chat;
mod conversations;
mod error;
mod health;
mod stream;

pub use chat::{SubmitChatRequest, SubmitChatResponse, submit_chat_handler};
pub use conversations::{
    ConversationResponse, CreateConversationRequest, MessageResponse, create_conversation_handler,
    list_conversations_handler, list_messages_handler,
};
pub use error::{ErrorResponse, producer_error_response};
pub use health::{HealthResponse, health_handler};
pub use stream::stream_handler;
