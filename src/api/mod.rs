use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use validator::Validate;

use crate::error::RagError;
use crate::pipeline::{IngestReport, PipelineFactory, PipelineStatus, RagPipeline};

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
const MAX_IN_FLIGHT: usize = 64;

/// Every session gets its own pipeline, so uploads never leak across sessions.
#[derive(Clone)]
pub struct AppState {
    factory: PipelineFactory,
    sessions: Arc<RwLock<HashMap<Uuid, Arc<RagPipeline>>>>,
}

impl AppState {
    pub fn new(factory: PipelineFactory) -> Self {
        Self {
            factory,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn session(&self, id: Uuid) -> Result<Arc<RagPipeline>, ApiError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ApiError::SessionNotFound(id))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1, max = 4000))]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    Rag(RagError),
    SessionNotFound(Uuid),
    BadRequest(String),
}

impl From<RagError> for ApiError {
    fn from(e: RagError) -> Self {
        ApiError::Rag(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Rag(e) => {
                let status = match &e {
                    RagError::Parse(_) | RagError::Config(_) => StatusCode::BAD_REQUEST,
                    RagError::EmptyIndex => StatusCode::CONFLICT,
                    RagError::Embedding(_) | RagError::Generation(_) => StatusCode::BAD_GATEWAY,
                    RagError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    error!("Request failed: {}", e);
                }
                (status, e.kind(), e.to_string())
            }
            ApiError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "session_not_found",
                format!("Session {} not found", id),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "bad_request", message),
        };

        (
            status,
            Json(ApiResponse {
                status: message,
                kind: Some(kind.to_string()),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Create and configure the API router
pub fn create_api(factory: PipelineFactory) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_check))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(session_status).delete(delete_session))
        .route("/sessions/:id/documents", post(upload_document))
        .route("/sessions/:id/ask", post(ask_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT))
        .layer(cors)
        .with_state(AppState::new(factory))
}

pub async fn serve(factory: PipelineFactory, port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = create_api(factory);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;
    info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))?;
    Ok(())
}

async fn health_check() -> Json<ApiResponse> {
    Json(ApiResponse {
        status: "Server is running and healthy".to_string(),
        kind: None,
    })
}

async fn create_session(State(state): State<AppState>) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session_id = Uuid::new_v4();
    let pipeline = state.factory.create_for_session(session_id)?;

    state.sessions.write().await.insert(session_id, Arc::new(pipeline));
    info!("Created session {}", session_id);

    Ok((StatusCode::CREATED, Json(SessionResponse { session_id })))
}

async fn session_status(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<PipelineStatus> {
    Ok(Json(state.session(id).await?.status()))
}

/// Sessions live until deleted here; there is no idle expiry.
async fn delete_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    let pipeline = state
        .sessions
        .write()
        .await
        .remove(&id)
        .ok_or(ApiError::SessionNotFound(id))?;

    pipeline.remove_uploads().await?;
    info!("Closed session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<IngestReport> {
    let pipeline = state.session(id).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("Upload is missing a file name".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        let report = pipeline.ingest(&bytes, &file_name).await.map_err(|e| {
            warn!("Ingestion of {} failed: {}", file_name, e);
            e
        })?;
        return Ok(Json(report));
    }

    Err(ApiError::BadRequest("Missing multipart field 'file'".to_string()))
}

async fn ask_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AskRequest>,
) -> ApiResult<AskResponse> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Invalid request: {}", e)))?;

    let pipeline = state.session(id).await?;
    let answer = pipeline.ask(&request.query).await?;

    Ok(Json(AskResponse { answer }))
}
