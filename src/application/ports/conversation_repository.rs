use crate::domain::{Conversation, ConversationId, Message, UserId};
use async_trait::async_trait;

use super::RepositoryError;

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn create_conversation(&self, conversation: &Conversation)
    -> Result<(), RepositoryError>;

    /// `false` both for conversations that do not exist and for ones owned by
    /// somebody else.
    async fn conversation_owned_by(
        &self,
        id: ConversationId,
        user_id: &UserId,
    ) -> Result<bool, RepositoryError>;

    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError>;

    /// Compare-and-set on the title: renames only while the current title is
    /// NULL or one of `allowed_current_titles`. Returns whether a row changed.
    async fn rename_if_default(
        &self,
        id: ConversationId,
        new_title: &str,
        allowed_current_titles: &[&str],
    ) -> Result<bool, RepositoryError>;

    /// Newest first.
    async fn list_conversations(&self, user_id: &UserId)
    -> Result<Vec<Conversation>, RepositoryError>;

    /// Oldest first.
    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError>;
}
