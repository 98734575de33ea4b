use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::domain::{Conversation, ConversationId, Message};
use crate::presentation::auth::AuthenticatedUser;
use crate::presentation::state::AppState;

use super::error::{ErrorResponse, producer_error_response};

#[derive(Debug, Default, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: String,
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id.to_string(),
            title: c.title,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id.to_string(),
            role: m.role.as_str().to_string(),
            content: m.content,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// The body is optional; an empty body creates an untitled conversation.
#[tracing::instrument(skip_all, fields(user_id = %user.0))]
pub async fn create_conversation_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Bytes,
) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateConversationRequest::default()
    } else {
        match serde_json::from_slice::<CreateConversationRequest>(&body) {
            Ok(r) => r,
            Err(e) => {
                return ErrorResponse::new(format!("Invalid request body: {}", e))
                    .with_status(StatusCode::BAD_REQUEST);
            }
        }
    };
    let title = request.title.filter(|t| !t.trim().is_empty());

    match state.producer.create_conversation(&user.0, title).await {
        Ok(conversation) => (
            StatusCode::CREATED,
            Json(ConversationResponse::from(conversation)),
        )
            .into_response(),
        Err(e) => producer_error_response(e),
    }
}

#[tracing::instrument(skip_all, fields(user_id = %user.0))]
pub async fn list_conversations_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Response {
    match state.conversation_repository.list_conversations(&user.0).await {
        Ok(conversations) => {
            let body: Vec<ConversationResponse> = conversations
                .into_iter()
                .map(ConversationResponse::from)
                .collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list conversations");
            ErrorResponse::new("Internal server error")
                .with_status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[tracing::instrument(skip_all, fields(user_id = %user.0))]
pub async fn list_messages_handler(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    user: AuthenticatedUser,
) -> Response {
    let Ok(conversation_id) = conversation_id.parse::<ConversationId>() else {
        return ErrorResponse::new(format!("Invalid conversation id: {}", conversation_id))
            .with_status(StatusCode::BAD_REQUEST);
    };

    let repository = &state.conversation_repository;
    let owned = match repository.conversation_owned_by(conversation_id, &user.0).await {
        Ok(owned) => owned,
        Err(e) => {
            tracing::error!(error = %e, "Ownership check failed");
            return ErrorResponse::new("Internal server error")
                .with_status(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    if !owned {
        return ErrorResponse::new("Conversation not found or access denied")
            .with_status(StatusCode::FORBIDDEN);
    }

    match repository.list_messages(conversation_id).await {
        Ok(messages) => {
            let body: Vec<MessageResponse> =
                messages.into_iter().map(MessageResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list messages");
            ErrorResponse::new("Internal server error")
                .with_status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
