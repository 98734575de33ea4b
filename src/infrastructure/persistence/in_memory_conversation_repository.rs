use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::ports::{ConversationRepository, RepositoryError};
use crate::domain::{Conversation, ConversationId, Message, UserId};

/// Conversation storage kept in process memory. Used by the test-suite and
/// by `database.provider = "memory"` development setups.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    conversations: HashMap<ConversationId, Conversation>,
    messages: HashMap<ConversationId, Vec<Message>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_conversation(&self, id: ConversationId) -> Option<Conversation> {
        self.inner.read().await.conversations.get(&id).cloned()
    }

    pub async fn conversation_count(&self) -> usize {
        self.inner.read().await.conversations.len()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.conversations.contains_key(&conversation.id) {
            return Err(RepositoryError::QueryFailed(format!(
                "conversation {} already exists",
                conversation.id
            )));
        }
        inner
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn conversation_owned_by(
        &self,
        id: ConversationId,
        user_id: &UserId,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .inner
            .read()
            .await
            .conversations
            .get(&id)
            .is_some_and(|c| c.is_owned_by(user_id)))
    }

    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        let Some(conversation) = inner.conversations.get_mut(&message.conversation_id) else {
            return Err(RepositoryError::QueryFailed(format!(
                "conversation {} does not exist",
                message.conversation_id
            )));
        };
        conversation.updated_at = Utc::now();
        inner
            .messages
            .entry(message.conversation_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn rename_if_default(
        &self,
        id: ConversationId,
        new_title: &str,
        allowed_current_titles: &[&str],
    ) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        let Some(conversation) = inner.conversations.get_mut(&id) else {
            return Ok(false);
        };
        let eligible = match conversation.title.as_deref() {
            None => true,
            Some(current) => allowed_current_titles.contains(&current),
        };
        if eligible {
            conversation.title = Some(new_title.to_string());
            conversation.updated_at = Utc::now();
        }
        Ok(eligible)
    }

    async fn list_conversations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut conversations: Vec<Conversation> = inner
            .conversations
            .values()
            .filter(|c| c.is_owned_by(user_id))
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(conversations)
    }

    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        // Stored in append order, which is creation order.
        Ok(self
            .inner
            .read()
            .await
            .messages
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }
}
