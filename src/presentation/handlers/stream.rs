use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderName, StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream::StreamExt;

use crate::domain::ConversationId;
use crate::presentation::auth::AuthenticatedUser;
use crate::presentation::state::AppState;

use super::error::ErrorResponse;

/// Server-sent events for one conversation. Each frame's data is a JSON
/// `{token, done}`; the response ends after the `done: true` frame.
#[tracing::instrument(skip_all, fields(user_id = %user.0))]
pub async fn stream_handler(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    user: AuthenticatedUser,
) -> Response {
    let conversation_id = match conversation_id.parse::<ConversationId>() {
        Ok(id) => id,
        Err(e) => {
            return ErrorResponse::new(e).with_status(StatusCode::BAD_REQUEST);
        }
    };

    match state
        .conversation_repository
        .conversation_owned_by(conversation_id, &user.0)
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(conversation_id = %conversation_id, "Stream requested for foreign or missing conversation");
            return ErrorResponse::new("Conversation not found or access denied")
                .with_status(StatusCode::FORBIDDEN);
        }
        Err(e) => {
            tracing::error!(error = %e, "Ownership check failed");
            return ErrorResponse::new("Internal server error")
                .with_status(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    tracing::debug!(conversation_id = %conversation_id, "Stream opened");

    let mut events = Box::pin(state.stream_gateway.open(conversation_id));
    let sse_stream = async_stream::stream! {
        while let Some(item) = events.next().await {
            match item {
                Ok(event) => match Event::default().json_data(&event) {
                    Ok(frame) => yield Ok::<_, Infallible>(frame),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to encode stream event");
                        break;
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Stream closed after queue error");
                    break;
                }
            }
        }
        tracing::debug!(conversation_id = %conversation_id, "Stream finished");
    };

    let keep_alive_seconds = state.settings.server.sse_keep_alive_seconds.max(1);
    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Sse::new(sse_stream).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(keep_alive_seconds))
                .text("keep-alive"),
        ),
    )
        .into_response()
}
