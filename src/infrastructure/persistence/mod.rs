mod in_memory_conversation_repository;
mod pg_conversation_repository;
mod pg_pool;

pub use in_memory_conversation_repository::InMemoryConversationRepository;
pub use pg_conversation_repository::PgConversationRepository;

pub use pg_pool::{create_pool, run_migrations};
