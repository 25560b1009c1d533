//! HTTP JSON API for the chat session.
//!
//! Exposes the ingestion and query boundaries over HTTP. One session per
//! server process, guarded by an async mutex so at most one query is in
//! flight at a time; per-session state is never shared across processes.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/documents` | Ingest a batch of base64-encoded documents |
//! | `POST` | `/query` | Ask a question or request a summary |
//! | `GET`  | `/transcript` | Read the session transcript |
//! | `POST` | `/session/new` | Archive the transcript and start over |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "unsupported_files", "message": "..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `unsupported_files` (400),
//! `extraction_failed` (400), `model_unavailable` (503),
//! `inference_error` (500), `internal` (500).

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::engine::AnswerEngine;
use crate::error::{EngineError, IngestError};
use crate::history;
use crate::inference::create_backend;
use crate::models::{Intent, TranscriptEntry, UploadedDocument};
use crate::ocr::{create_provider, OcrProvider};
use crate::session::Session;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    engine: Arc<AnswerEngine>,
    ocr: Arc<dyn OcrProvider>,
    session: Arc<Mutex<Session>>,
}

/// Start the HTTP server on the configured bind address.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();

    let backend = create_backend(&config.models)?;
    let ocr: Arc<dyn OcrProvider> = Arc::from(create_provider(&config.ocr)?);
    let engine = Arc::new(AnswerEngine::new(backend, config.chunking.clone()));

    let state = AppState {
        config: Arc::new(config.clone()),
        engine,
        ocr,
        session: Arc::new(Mutex::new(Session::new())),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/documents", post(handle_documents))
        .route("/query", post(handle_query))
        .route("/transcript", get(handle_transcript))
        .route("/session/new", post(handle_new_session))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    tracing::info!(%bind_addr, "docchat server listening");
    println!("docchat server listening on http://{bind_addr}");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match &err {
            IngestError::UnsupportedFiles(_) => {
                AppError::new(StatusCode::BAD_REQUEST, "unsupported_files", err.to_string())
            }
            IngestError::Extraction { .. } => {
                AppError::new(StatusCode::BAD_REQUEST, "extraction_failed", err.to_string())
            }
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::ModelUnavailable(_) => AppError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "model_unavailable",
                err.to_string(),
            ),
            EngineError::Inference(_) | EngineError::InvalidResponse(_) => AppError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "inference_error",
                err.to_string(),
            ),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /documents ============

#[derive(Deserialize)]
struct DocumentUpload {
    name: String,
    #[serde(default)]
    mime_type: String,
    /// Base64-encoded file content.
    content: String,
}

#[derive(Deserialize)]
struct DocumentsRequest {
    documents: Vec<DocumentUpload>,
}

#[derive(Serialize)]
struct DocumentsResponse {
    documents: usize,
    corpus_chars: usize,
}

async fn handle_documents(
    State(state): State<AppState>,
    Json(request): Json<DocumentsRequest>,
) -> Result<Json<DocumentsResponse>, AppError> {
    if request.documents.is_empty() {
        return Err(bad_request("documents must not be empty"));
    }

    let mut docs = Vec::with_capacity(request.documents.len());
    for upload in &request.documents {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&upload.content)
            .map_err(|e| bad_request(format!("{}: invalid base64 content: {e}", upload.name)))?;
        docs.push(UploadedDocument::new(
            upload.name.clone(),
            upload.mime_type.clone(),
            bytes,
        ));
    }

    let mut session = state.session.lock().await;
    session.ingest(&docs, state.ocr.as_ref()).await?;

    Ok(Json(DocumentsResponse {
        documents: docs.len(),
        corpus_chars: session.corpus().map(|c| c.chars().count()).unwrap_or(0),
    }))
}

// ============ POST /query ============

#[derive(Deserialize)]
struct QueryRequest {
    text: String,
}

#[derive(Serialize)]
struct QueryResponse {
    reply: String,
    /// `null` for the empty-corpus guidance reply.
    intent: Option<Intent>,
}

async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(bad_request("text must not be empty"));
    }

    let mut session = state.session.lock().await;
    let (reply, intent) = session.handle_query(&request.text, &state.engine).await?;

    if let Err(e) = history::save_transcript(&state.config.history.path, &session.transcript) {
        tracing::warn!(error = %e, "failed to persist transcript");
    }

    Ok(Json(QueryResponse { reply, intent }))
}

// ============ GET /transcript ============

#[derive(Serialize)]
struct TranscriptResponse {
    entries: Vec<TranscriptEntry>,
}

async fn handle_transcript(State(state): State<AppState>) -> Json<TranscriptResponse> {
    let session = state.session.lock().await;
    Json(TranscriptResponse {
        entries: session.transcript.clone(),
    })
}

// ============ POST /session/new ============

#[derive(Serialize)]
struct NewSessionResponse {
    session: String,
}

async fn handle_new_session(State(state): State<AppState>) -> Json<NewSessionResponse> {
    let mut session = state.session.lock().await;
    if let Err(e) = history::rotate(&state.config.history.path, &session.transcript) {
        tracing::warn!(error = %e, "failed to archive transcript");
    }
    *session = Session::new();
    Json(NewSessionResponse {
        session: session.id.to_string(),
    })
}
