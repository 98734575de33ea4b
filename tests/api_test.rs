mod helpers;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use parley::application::ports::{QueueStore, QueueStoreError};
use parley::bootstrap::{Components, build_app_state};
use parley::domain::{ConversationId, StreamEvent, UserId};
use parley::infrastructure::persistence::InMemoryConversationRepository;
use parley::presentation::create_router;

use helpers::{TestPipeline, mint_token, test_settings};

struct UnreachableQueueStore;

#[async_trait]
impl QueueStore for UnreachableQueueStore {
    async fn push(&self, _key: &str, _payload: String) -> Result<(), QueueStoreError> {
        Err(QueueStoreError::ConnectionFailed("connection refused".to_string()))
    }

    async fn push_with_ttl(
        &self,
        _key: &str,
        _payload: String,
        _ttl: Duration,
    ) -> Result<(), QueueStoreError> {
        Err(QueueStoreError::ConnectionFailed("connection refused".to_string()))
    }

    async fn len(&self, _key: &str) -> Result<usize, QueueStoreError> {
        Err(QueueStoreError::ConnectionFailed("connection refused".to_string()))
    }

    async fn pop_blocking(&self, _key: &str) -> Result<String, QueueStoreError> {
        Err(QueueStoreError::ConnectionFailed("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), QueueStoreError> {
        Err(QueueStoreError::ConnectionFailed("connection refused".to_string()))
    }
}

fn unreachable_queue_router() -> Router {
    let settings = test_settings();
    let components = Components::from_parts(
        &settings,
        Arc::new(InMemoryConversationRepository::new()),
        Arc::new(UnreachableQueueStore),
    );
    create_router(build_app_state(&components, &settings))
}

fn post_chat(token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn sse_events(body: &str) -> Vec<StreamEvent> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

#[tokio::test]
async fn given_reachable_queue_when_checking_health_then_reports_depth() {
    let pipeline = TestPipeline::new();

    let response = pipeline.router().oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["queueDepth"], 0);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn given_unreachable_queue_when_checking_health_then_service_unavailable() {
    let response = unreachable_queue_router()
        .oneshot(get("/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["status"], "unhealthy");
    assert!(body["queueDepth"].is_null());
}

#[tokio::test]
async fn given_request_id_header_when_calling_then_response_echoes_it() {
    let pipeline = TestPipeline::new();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let response = pipeline.router().oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn given_no_token_when_submitting_then_unauthorized() {
    let pipeline = TestPipeline::new();

    let response = pipeline
        .router()
        .oneshot(post_chat(None, json!({"prompt": "Hello"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn given_token_signed_with_other_secret_when_submitting_then_unauthorized() {
    let pipeline = TestPipeline::new();
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &parley::infrastructure::auth::SessionClaims {
            sub: "alice".to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        },
        &jsonwebtoken::EncodingKey::from_secret(b"someone-else"),
    )
    .unwrap();

    let response = pipeline
        .router()
        .oneshot(post_chat(Some(&forged), json!({"prompt": "Hello"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn given_valid_prompt_when_submitting_then_accepted_and_queued() {
    let pipeline = TestPipeline::new();
    let token = mint_token("alice");

    let response = pipeline
        .router()
        .oneshot(post_chat(Some(&token), json!({"prompt": "Hello"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = json_body(response).await;
    assert_eq!(body["status"], "queued");
    let conversation_id: ConversationId = body["conversationId"].as_str().unwrap().parse().unwrap();
    assert!(body["jobId"].is_string());
    assert_eq!(pipeline.components.job_queue.depth().await.unwrap(), 1);
    let conversation = pipeline.repository.get_conversation(conversation_id).await.unwrap();
    assert_eq!(conversation.user_id, UserId::new("alice"));
}

#[tokio::test]
async fn given_blank_conversation_id_when_submitting_then_new_conversation_is_created() {
    let pipeline = TestPipeline::new();
    let token = mint_token("alice");

    let response = pipeline
        .router()
        .oneshot(post_chat(
            Some(&token),
            json!({"prompt": "Hello", "conversationId": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(pipeline.repository.conversation_count().await, 1);
}

#[tokio::test]
async fn given_blank_prompt_when_submitting_then_bad_request() {
    let pipeline = TestPipeline::new();
    let token = mint_token("alice");

    let response = pipeline
        .router()
        .oneshot(post_chat(Some(&token), json!({"prompt": "   "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(pipeline.components.job_queue.depth().await.unwrap(), 0);
}

#[tokio::test]
async fn given_malformed_json_when_submitting_then_bad_request() {
    let pipeline = TestPipeline::new();
    let token = mint_token("alice");
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from("{\"prompt\": "))
        .unwrap();

    let response = pipeline.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_foreign_conversation_when_submitting_then_forbidden_and_depth_unchanged() {
    let pipeline = TestPipeline::new();
    let bobs = pipeline
        .producer()
        .create_conversation(&UserId::new("bob"), None)
        .await
        .unwrap();
    let token = mint_token("alice");

    let response = pipeline
        .router()
        .oneshot(post_chat(
            Some(&token),
            json!({"prompt": "Hello", "conversationId": bobs.id.to_string()}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(pipeline.components.job_queue.depth().await.unwrap(), 0);
}

#[tokio::test]
async fn given_unreachable_queue_when_submitting_then_internal_error() {
    let token = mint_token("alice");

    let response = unreachable_queue_router()
        .oneshot(post_chat(Some(&token), json!({"prompt": "Hello"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Internal server error");
}

#[tokio::test]
async fn given_submitted_job_when_streaming_with_query_token_then_frames_rebuild_reply() {
    let pipeline = TestPipeline::new();
    let router = pipeline.router();
    let token = mint_token("alice");
    let submitted = router
        .clone()
        .oneshot(post_chat(Some(&token), json!({"prompt": "Hello"})))
        .await
        .unwrap();
    let conversation_id = json_body(submitted).await["conversationId"]
        .as_str()
        .unwrap()
        .to_string();
    pipeline.worker().run_once().await.unwrap();

    let response = router
        .oneshot(get(
            &format!("/api/chat/stream/{}?token={}", conversation_id, token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    let body = tokio::time::timeout(Duration::from_secs(5), response.into_body().collect())
        .await
        .expect("Stream did not close after the terminal event")
        .unwrap()
        .to_bytes();
    let events = sse_events(&String::from_utf8(body.to_vec()).unwrap());
    let (last, tokens) = events.split_last().unwrap();
    assert!(last.done);
    let reply: String = tokens.iter().map(|e| e.token.as_str()).collect();
    assert_eq!(reply, "I received your message: \"Hello\".");
}

#[tokio::test]
async fn given_foreign_conversation_when_streaming_then_forbidden() {
    let pipeline = TestPipeline::new();
    let bobs = pipeline
        .producer()
        .create_conversation(&UserId::new("bob"), None)
        .await
        .unwrap();

    let response = pipeline
        .router()
        .oneshot(get(
            &format!("/api/chat/stream/{}", bobs.id),
            Some(&mint_token("alice")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn given_invalid_conversation_id_when_streaming_then_bad_request() {
    let pipeline = TestPipeline::new();

    let response = pipeline
        .router()
        .oneshot(get("/api/chat/stream/not-a-uuid", Some(&mint_token("alice"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_missing_token_when_streaming_then_unauthorized() {
    let pipeline = TestPipeline::new();

    let response = pipeline
        .router()
        .oneshot(get(
            &format!("/api/chat/stream/{}", ConversationId::new()),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn given_conversations_when_listing_then_only_callers_are_returned() {
    let pipeline = TestPipeline::new();
    let router = pipeline.router();
    let alice = mint_token("alice");
    let created = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/conversations")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {}", alice))
                .body(Body::from(json!({"title": "Trip"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    pipeline
        .producer()
        .create_conversation(&UserId::new("bob"), None)
        .await
        .unwrap();

    let response = router
        .oneshot(get("/api/conversations", Some(&alice)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "Trip");
}

#[tokio::test]
async fn given_empty_body_when_creating_conversation_then_default_title() {
    let pipeline = TestPipeline::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/conversations")
        .header(header::AUTHORIZATION, format!("Bearer {}", mint_token("alice")))
        .body(Body::empty())
        .unwrap();

    let response = pipeline.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["title"], "New Chat");
}

#[tokio::test]
async fn given_processed_job_when_listing_messages_then_history_is_ordered() {
    let pipeline = TestPipeline::new();
    let router = pipeline.router();
    let token = mint_token("alice");
    let submitted = router
        .clone()
        .oneshot(post_chat(Some(&token), json!({"prompt": "Hello"})))
        .await
        .unwrap();
    let conversation_id = json_body(submitted).await["conversationId"]
        .as_str()
        .unwrap()
        .to_string();
    pipeline.worker().run_once().await.unwrap();

    let response = router
        .clone()
        .oneshot(get(
            &format!("/api/conversations/{}/messages", conversation_id),
            Some(&token),
        ))
        .await
        .unwrap();
    let foreign = router
        .oneshot(get(
            &format!("/api/conversations/{}/messages", conversation_id),
            Some(&mint_token("bob")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let messages = body.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "Hello");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(foreign.status(), StatusCode::FORBIDDEN);
}
