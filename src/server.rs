//! Superfície HTTP: listagem dos mapas gerados e disparo de lotes a partir de CSV.
//!
//! Rotas:
//! - `GET /mindmaps?subject=&topic=` → `{ "data": [...] }`
//! - `POST /generate` com `{ "inputFile": "topics.csv" }` → `{ "status": [...] }`
//!
//! Todas passam pelo middleware de token Bearer quando `use_auth` está ativo.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::anthropic::MessageSender;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::generator::MindMapGenerator;
use crate::pipeline::generate_from_csv;
use crate::store::{MindMapFilter, MindMapStore};

/// Shared handler state.
pub struct AppState<S, St> {
    pub config: Arc<AppConfig>,
    pub generator: Arc<MindMapGenerator<S, St>>,
}

impl<S, St> Clone for AppState<S, St> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            generator: Arc::clone(&self.generator),
        }
    }
}

/// Token gate settings. `token == None` lets every request through.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl AuthConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            token: config.use_auth.then(|| config.api_token.clone()),
        }
    }
}

/// JSON error body `{ "error": message }` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

/// Rejects requests without `Authorization: Bearer <token>` (401) or with the
/// wrong token (403).
pub async fn require_token(
    State(auth): State<Arc<AuthConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = auth.token.as_deref() else {
        return next.run(req).await;
    };

    let presented = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(' ').nth(1))
        .filter(|t| !t.is_empty());

    match presented {
        None => ApiError::new(StatusCode::UNAUTHORIZED, "Missing token").into_response(),
        Some(token) if token != expected => {
            ApiError::new(StatusCode::FORBIDDEN, "Invalid token").into_response()
        }
        Some(_) => next.run(req).await,
    }
}

/// GET /mindmaps — stored mind maps, optionally filtered by subject and topic.
pub async fn list_mindmaps<S, St>(
    State(state): State<AppState<S, St>>,
    Query(filter): Query<MindMapFilter>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    S: MessageSender + 'static,
    St: MindMapStore + 'static,
{
    let docs = state.generator.store().list(&filter).await.map_err(|e| {
        error!(error = %e, "failed to fetch mind maps");
        ApiError::internal("Failed to fetch mindmaps")
    })?;
    Ok(Json(serde_json::json!({ "data": docs })))
}

/// Accepts only bare file names so requests cannot reach outside `input_dir`.
fn input_file_from_body(body: &[u8]) -> Result<String, ApiError> {
    let missing = || ApiError::bad_request("inputFile is required in body");
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|_| missing())?;
    let name = value
        .get("inputFile")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(missing)?;

    let is_plain = Path::new(name)
        .file_name()
        .is_some_and(|f| f == name && name != "..");
    if !is_plain {
        return Err(ApiError::bad_request("inputFile must be a plain file name"));
    }
    Ok(name.to_string())
}

/// POST /generate — run one CSV batch and return the per-item statuses.
pub async fn generate<S, St>(
    State(state): State<AppState<S, St>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError>
where
    S: MessageSender + 'static,
    St: MindMapStore + 'static,
{
    let input_file = input_file_from_body(&body)?;
    let generator = &state.generator;

    let report = generate_from_csv(&state.config, &input_file, |item| generator.transform(item))
        .await
        .map_err(|e: AppError| {
            error!(input = %input_file, error = %e, "generation failed");
            ApiError::internal("Mind map generation failed")
        })?;

    Ok(Json(serde_json::json!({ "status": report.outcomes })))
}

pub fn router<S, St>(state: AppState<S, St>, auth: AuthConfig) -> Router
where
    S: MessageSender + 'static,
    St: MindMapStore + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // CORS wraps the token gate: preflights are answered before auth runs.
    Router::new()
        .route("/mindmaps", get(list_mindmaps::<S, St>))
        .route("/generate", post(generate::<S, St>))
        .layer(middleware::from_fn_with_state(Arc::new(auth), require_token))
        .layer(cors)
        .with_state(state)
}

/// Binds `0.0.0.0:<port>` and serves until the process is stopped.
pub async fn serve<S, St>(state: AppState<S, St>) -> Result<(), AppError>
where
    S: MessageSender + 'static,
    St: MindMapStore + 'static,
{
    let auth = AuthConfig::from_config(&state.config);
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = router(state, auth);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anthropic::{
        AnthropicError, CompletionSettings, ContentBlock, MessagesRequest, MessagesResponse, Usage,
    };
    use crate::store::FileStore;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const TOKEN: &str = "secret-token";

    /// Replies with a fixed mind map unless the prompt targets "Broken".
    struct FakeSender;

    impl MessageSender for FakeSender {
        async fn send_message(
            &self,
            req: &MessagesRequest,
        ) -> Result<MessagesResponse, AnthropicError> {
            if req.messages[0].content.contains("\"Broken\"") {
                return Err(AnthropicError::EmptyResponse);
            }
            Ok(MessagesResponse {
                id: "fake".into(),
                content: vec![ContentBlock {
                    content_type: "text".into(),
                    text: r#"{"mainTopic":"x","subTopics":[]}"#.into(),
                }],
                model: "fake".into(),
                stop_reason: None,
                usage: Usage {
                    input_tokens: 0,
                    output_tokens: 0,
                },
            })
        }
    }

    fn app(dir: &Path, use_auth: bool) -> Router {
        let config = AppConfig {
            input_dir: dir.join("input"),
            output_dir: dir.join("output"),
            store_dir: dir.join("maps"),
            use_auth,
            api_token: TOKEN.into(),
            ..AppConfig::default()
        };
        let generator = MindMapGenerator::new(
            FakeSender,
            FileStore::new(&config.store_dir),
            CompletionSettings {
                model: "fake".into(),
                max_tokens: 16,
                temperature: None,
            },
        );
        let auth = AuthConfig::from_config(&config);
        let state = AppState {
            config: Arc::new(config),
            generator: Arc::new(generator),
        };
        router(state, auth)
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut req = axum::http::Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                req = req.header("content-type", "application/json");
                axum::body::Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => axum::body::Body::empty(),
        };
        let response = app.oneshot(req.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(dir.path(), true), "GET", "/mindmaps", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing token");
    }

    #[tokio::test]
    async fn wrong_token_is_forbidden() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) =
            send(app(dir.path(), true), "GET", "/mindmaps", Some("nope"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Invalid token");
    }

    #[tokio::test]
    async fn auth_disabled_lets_requests_through() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(dir.path(), false), "GET", "/mindmaps", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn preflight_gets_cors_headers_without_a_token() {
        let dir = tempfile::tempdir().unwrap();
        let req = axum::http::Request::builder()
            .method("OPTIONS")
            .uri("/generate")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "authorization,content-type")
            .body(axum::body::Body::empty())
            .unwrap();

        let response = app(dir.path(), true).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn cross_origin_responses_carry_allow_origin() {
        let dir = tempfile::tempdir().unwrap();
        let req = axum::http::Request::builder()
            .method("GET")
            .uri("/mindmaps")
            .header("origin", "http://localhost:3000")
            .header("authorization", format!("Bearer {TOKEN}"))
            .body(axum::body::Body::empty())
            .unwrap();

        let response = app(dir.path(), true).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn generate_requires_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            app(dir.path(), true),
            "POST",
            "/generate",
            Some(TOKEN),
            Some(serde_json::json!({ "inputFile": 42 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "inputFile is required in body");
    }

    #[tokio::test]
    async fn generate_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _) = send(
            app(dir.path(), true),
            "POST",
            "/generate",
            Some(TOKEN),
            Some(serde_json::json!({ "inputFile": "../secrets.csv" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn generate_missing_csv_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            app(dir.path(), true),
            "POST",
            "/generate",
            Some(TOKEN),
            Some(serde_json::json!({ "inputFile": "absent.csv" })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Mind map generation failed");
    }

    #[tokio::test]
    async fn generate_then_list() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("input")).unwrap();
        std::fs::write(
            dir.path().join("input/topics.csv"),
            "subject,topic\nMath,Algebra\nMath,Broken\nScience,Biology\n",
        )
        .unwrap();

        let (status, body) = send(
            app(dir.path(), true),
            "POST",
            "/generate",
            Some(TOKEN),
            Some(serde_json::json!({ "inputFile": "topics.csv" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["status"],
            serde_json::json!([
                { "topic": "Algebra", "status": "Succeeded" },
                { "topic": "Broken", "status": "Failed" },
                { "topic": "Biology", "status": "Succeeded" }
            ])
        );
        assert!(dir.path().join("output/topics_status.csv").exists());

        let (status, body) = send(
            app(dir.path(), true),
            "GET",
            "/mindmaps?subject=Math",
            Some(TOKEN),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["id"], "math--algebra");
        assert_eq!(data[0]["mindMap"]["mainTopic"], "x");
    }
}
