use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::services::ChatSubmission;
use crate::domain::Attachment;
use crate::presentation::auth::AuthenticatedUser;
use crate::presentation::state::AppState;

use super::error::{ErrorResponse, producer_error_response};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitChatRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitChatResponse {
    pub status: String,
    pub conversation_id: String,
    pub job_id: String,
}

#[tracing::instrument(skip_all, fields(user_id = %user.0))]
pub async fn submit_chat_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<SubmitChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Malformed chat submission");
            return ErrorResponse::new(format!("Invalid request body: {}", rejection.body_text()))
                .with_status(StatusCode::BAD_REQUEST);
        }
    };

    let submission = ChatSubmission {
        user_id: user.0,
        prompt: request.prompt,
        conversation_id: request.conversation_id.filter(|id| !id.trim().is_empty()),
        attachment: request.attachment,
    };

    match state.producer.enqueue(submission).await {
        Ok(receipt) => (
            StatusCode::ACCEPTED,
            Json(SubmitChatResponse {
                status: "queued".to_string(),
                conversation_id: receipt.conversation_id.to_string(),
                job_id: receipt.job_id.to_string(),
            }),
        )
            .into_response(),
        Err(e) => producer_error_response(e),
    }
}
