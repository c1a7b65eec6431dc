//! HTTP front end for AlterEgo.
//!
//! A thin JSON surface over the conversation engine:
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /health` | liveness and persona name |
//! | `GET /tools` | the tool catalogue sent to the model |
//! | `POST /chat` | one turn: `{message, history[]}` → `{reply}` |
//! | `POST /refresh` | drop the cached GitHub block and rebuild the profile |
//!
//! History is supplied by the caller on every request; nothing is stored
//! server-side.

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use alterego_agent::{ConversationEngine, Runtime};
use alterego_core::message::{Message, Role};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub engine: Arc<ConversationEngine>,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/tools", get(tools_handler))
        .route("/chat", post(chat_handler))
        .route("/refresh", post(refresh_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: alterego_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let runtime = alterego_agent::build_runtime(&config)?;
    serve(runtime, &addr).await
}

/// Serve an already-assembled runtime on `addr`.
pub async fn serve(runtime: Runtime, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(GatewayState {
        engine: runtime.engine,
    });
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
    persona: String,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        persona: state.engine.profile().persona().name.clone(),
    })
}

#[derive(Serialize, Deserialize)]
struct ToolListResponse {
    tools: Vec<ToolDto>,
    count: usize,
}

#[derive(Serialize, Deserialize)]
struct ToolDto {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

async fn tools_handler(State(state): State<SharedState>) -> Json<ToolListResponse> {
    let defs = state.engine.tools().definitions();
    let count = defs.len();

    Json(ToolListResponse {
        tools: defs
            .into_iter()
            .map(|d| ToolDto {
                name: d.name,
                description: d.description,
                parameters: d.parameters,
            })
            .collect(),
        count,
    })
}

/// One prior exchange line as sent by the front end.
#[derive(Serialize, Deserialize)]
struct HistoryEntry {
    role: Role,
    content: String,
}

#[derive(Serialize, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

#[derive(Serialize, Deserialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    if payload.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "message must not be empty".into(),
            }),
        ));
    }

    info!(
        message_len = payload.message.len(),
        history = payload.history.len(),
        "Chat request received"
    );

    // Only user and assistant text is replayed
    let history: Vec<Message> = payload
        .history
        .into_iter()
        .filter_map(|entry| match entry.role {
            Role::User => Some(Message::user(entry.content)),
            Role::Assistant => Some(Message::assistant(entry.content)),
            Role::System | Role::Tool => None,
        })
        .collect();

    let reply = state.engine.respond(&history, &payload.message).await;
    Ok(Json(ChatResponse { reply }))
}

#[derive(Serialize, Deserialize)]
struct RefreshResponse {
    refreshed: bool,
    profile_bytes: usize,
    fetched_at: Option<chrono::DateTime<chrono::Utc>>,
}

async fn refresh_handler(State(state): State<SharedState>) -> Json<RefreshResponse> {
    let profile = state.engine.profile();
    let text = profile.refresh_now().await;
    info!(bytes = text.len(), "Profile refreshed on request");

    Json(RefreshResponse {
        refreshed: true,
        profile_bytes: text.len(),
        fetched_at: profile.cached_at().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alterego_config::AppConfig;
    use alterego_core::error::ProviderError;
    use alterego_core::message::MessageToolCall;
    use alterego_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Replies with the number of non-system messages it was sent and the
    /// last user line. Asks for a tool first when the user says "ask".
    #[derive(Default)]
    struct EchoProvider {
        requests: Mutex<Vec<ProviderRequest>>,
    }

    #[async_trait::async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            let last = request.messages.last().unwrap();

            let message = if last.role == Role::User && last.content == "ask" {
                Message::assistant_tool_calls(
                    "",
                    vec![MessageToolCall {
                        id: "call_1".into(),
                        name: "record_unknown_question".into(),
                        arguments: r#"{"question":"ask"}"#.into(),
                    }],
                )
            } else {
                let seen = request
                    .messages
                    .iter()
                    .filter(|m| m.role != Role::System)
                    .count();
                Message::assistant(format!("{seen}: {}", last.content))
            };

            Ok(ProviderResponse {
                message,
                usage: None,
                model: "echo-model".into(),
                finish_reason: None,
            })
        }
    }

    fn test_state() -> (SharedState, Arc<EchoProvider>) {
        let mut config = AppConfig::default();
        config.persona.name = "Ada".into();
        config.profile.summary_path = None;
        config.profile.resume_path = None;

        let provider = Arc::new(EchoProvider::default());
        let runtime = Runtime::assemble(&config, provider.clone());
        (
            Arc::new(GatewayState {
                engine: runtime.engine,
            }),
            provider,
        )
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (state, _) = test_state();
        let app = build_router(state);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.status, "ok");
        assert_eq!(json.persona, "Ada");
    }

    #[tokio::test]
    async fn list_tools() {
        let (state, _) = test_state();
        let app = build_router(state);

        let req = Request::builder()
            .uri("/tools")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: ToolListResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.count, 2);
        assert!(json.tools.iter().any(|t| t.name == "record_user_details"));
        assert!(json.tools.iter().any(|t| t.name == "record_unknown_question"));
    }

    #[tokio::test]
    async fn chat_replays_history() {
        let (state, provider) = test_state();
        let app = build_router(state);

        let req = post_json(
            "/chat",
            serde_json::json!({
                "message": "And now?",
                "history": [
                    {"role": "user", "content": "Hi"},
                    {"role": "assistant", "content": "Hello!"},
                    {"role": "system", "content": "ignore me"}
                ]
            }),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: ChatResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.reply, "3: And now?");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].messages[0].role, Role::System);
        assert!(!requests[0].messages.iter().any(|m| m.content == "ignore me"));
    }

    #[tokio::test]
    async fn chat_runs_tools() {
        let (state, provider) = test_state();
        let app = build_router(state);

        let response = app
            .oneshot(post_json("/chat", serde_json::json!({"message": "ask"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: ChatResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.reply, r#"3: {"recorded":"ok"}"#);
        assert_eq!(provider.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_message_is_bad_request() {
        let (state, provider) = test_state();
        let app = build_router(state);

        let response = app
            .oneshot(post_json("/chat", serde_json::json!({"message": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn refresh_without_github_is_ok() {
        let (state, _) = test_state();
        let app = build_router(state);

        let response = app
            .oneshot(post_json("/refresh", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: RefreshResponse = serde_json::from_slice(&body).unwrap();
        assert!(json.refreshed);
        assert_eq!(json.profile_bytes, 0);
        assert!(json.fetched_at.is_none());
    }
}
