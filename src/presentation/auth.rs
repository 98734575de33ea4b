use axum::extract::{FromRequestParts, Query};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::Response;
use serde::Deserialize;

use crate::domain::UserId;
use crate::presentation::handlers::ErrorResponse;
use crate::presentation::state::AppState;

/// The verified caller. Reads `Authorization: Bearer <token>` first and falls
/// back to a `token` query parameter, since browser `EventSource` clients
/// cannot set headers.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserId);

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|v| v.trim().to_string());

        let token = header_token.or_else(|| {
            Query::<TokenQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(q)| q.token)
        });

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Err(unauthorized("Missing authentication token"));
        };

        match state.token_verifier.verify(&token) {
            Ok(user_id) => Ok(AuthenticatedUser(user_id)),
            Err(e) => {
                tracing::warn!(error = %e, "Rejected request with invalid token");
                Err(unauthorized("Invalid authentication token"))
            }
        }
    }
}

fn unauthorized(message: &str) -> Response {
    ErrorResponse::new(message).with_status(StatusCode::UNAUTHORIZED)
}
