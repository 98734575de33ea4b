mod conversation_repository;
mod queue_store;
mod reply_generator;
mod repository_error;
mod token_verifier;

pub use conversation_repository::ConversationRepository;
pub use queue_store::{QueueStore, QueueStoreError};
pub use reply_generator::{ReplyGenerator, ReplyGeneratorError};
pub use repository_error::RepositoryError;
pub use token_verifier::{AuthError, TokenVerifier};
