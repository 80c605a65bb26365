//! JSON HTTP service exposing the prioritization pipeline.
//!
//! ## Routes
//!
//! - `GET  /health`
//! - `GET  /api/session` - trial state and busy flag
//! - `POST /api/prioritize` - `{ text?, csv?, framework?, password? }`
//! - `POST /api/export` - `{ features: [...] }` → CSV attachment
//!
//! All requests share one [`SessionContext`]. The blocking completion call
//! runs on the blocking pool while the session is marked busy, so a second
//! request arriving meanwhile gets `409 Conflict`. The busy flag is released
//! by the blocking task itself, so a client that disconnects mid-request
//! cannot leave the session stuck.

use crate::client::CompletionBackend;
use crate::collector;
use crate::error::PrioritizerError;
use crate::model::{FeatureList, Framework, ScoredFeature};
use crate::parser::ParseOutcome;
use crate::pipeline::Prioritizer;
use crate::presenter;
use crate::session::{SessionContext, TrialState};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

pub type SharedPrioritizer = Prioritizer<Arc<dyn CompletionBackend>>;

#[derive(Clone)]
pub struct AppState {
    prioritizer: Arc<SharedPrioritizer>,
    session: Arc<Mutex<SessionContext>>,
    export_filename: String,
}

impl AppState {
    pub fn new(backend: Arc<dyn CompletionBackend>, session: SessionContext) -> Self {
        Self {
            prioritizer: Arc::new(Prioritizer::new(backend)),
            session: Arc::new(Mutex::new(session)),
            export_filename: presenter::EXPORT_FILENAME.to_string(),
        }
    }

    pub fn with_export_filename(mut self, filename: impl Into<String>) -> Self {
        self.export_filename = filename.into();
        self
    }

    fn session(&self) -> MutexGuard<'_, SessionContext> {
        lock_session(&self.session)
    }
}

fn lock_session(session: &Mutex<SessionContext>) -> MutexGuard<'_, SessionContext> {
    // The session holds plain flags, so a poisoned lock is still usable
    session.lock().unwrap_or_else(|e| e.into_inner())
}

/// Ownership of the busy flag of an admitted request.
///
/// Dropping an unreleased lease clears the flag without consuming the
/// trial, whatever path the request took.
struct BusyLease {
    session: Arc<Mutex<SessionContext>>,
    held: bool,
}

impl BusyLease {
    fn new(session: Arc<Mutex<SessionContext>>) -> Self {
        Self {
            session,
            held: true,
        }
    }

    fn conclude(
        mut self,
        completion: Result<String, PrioritizerError>,
    ) -> (Result<ParseOutcome, PrioritizerError>, TrialState) {
        self.held = false;
        let mut session = lock_session(&self.session);
        let outcome = SharedPrioritizer::conclude(&mut session, completion);
        (outcome, session.state())
    }
}

impl Drop for BusyLease {
    fn drop(&mut self) {
        if self.held {
            tracing::warn!("Prioritization abandoned before completion, releasing session");
            lock_session(&self.session).finish(false);
        }
    }
}

/// Error body: `{ "error": "<kind>", "message": "<details>" }`.
#[derive(Debug)]
pub struct ApiError(PrioritizerError);

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl From<PrioritizerError> for ApiError {
    fn from(err: PrioritizerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            PrioritizerError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation", msg),
            PrioritizerError::AccessDenied => (
                StatusCode::UNAUTHORIZED,
                "access_denied",
                PrioritizerError::AccessDenied.to_string(),
            ),
            PrioritizerError::Busy => (
                StatusCode::CONFLICT,
                "busy",
                PrioritizerError::Busy.to_string(),
            ),
            PrioritizerError::RemoteService { status, body } => {
                tracing::error!(?status, "Completion service error");
                (StatusCode::BAD_GATEWAY, "remote_service", body)
            }
            other => {
                tracing::error!("Internal error: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    other.to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PrioritizeRequest {
    /// One feature per line.
    #[serde(default)]
    pub text: Option<String>,
    /// CSV document with a `Feature` column; takes precedence over `text`.
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PrioritizeResponse {
    #[serde(flatten)]
    pub outcome: ParseOutcome,
    /// CSV export of the scored rows, absent when nothing parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv: Option<String>,
    pub trial: TrialState,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub features: Vec<ScoredFeature>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub trial: TrialState,
    pub busy: bool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/session", get(session_status))
        .route("/api/prioritize", post(prioritize))
        .route("/api/export", post(export))
        .with_state(state)
}

pub async fn run_server(state: AppState, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn session_status(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.session();
    Json(SessionResponse {
        trial: session.state(),
        busy: session.is_busy(),
    })
}

fn collect(request: &PrioritizeRequest) -> Result<FeatureList, PrioritizerError> {
    match request.csv.as_deref() {
        Some(csv) if !csv.trim().is_empty() => collector::from_csv_str(csv),
        _ => Ok(collector::from_text(request.text.as_deref().unwrap_or_default())),
    }
}

async fn prioritize(
    State(state): State<AppState>,
    Json(request): Json<PrioritizeRequest>,
) -> Result<Json<PrioritizeResponse>, ApiError> {
    let features = collect(&request)?;
    let framework = match request.framework.as_deref() {
        Some(name) => name.parse::<Framework>()?,
        None => Framework::default(),
    };

    SharedPrioritizer::admit(&mut state.session(), &features, request.password.as_deref())?;
    let lease = BusyLease::new(state.session.clone());

    // The task runs to the end even if this handler is dropped
    let prioritizer = state.prioritizer.clone();
    let (outcome, trial) = tokio::task::spawn_blocking(move || {
        let completion = prioritizer.complete(&features, framework);
        lease.conclude(completion)
    })
    .await
    .map_err(|e| PrioritizerError::remote(None, format!("Completion task failed: {}", e)))?;
    let outcome = outcome?;

    let csv = if outcome.is_scored() {
        Some(presenter::to_csv(outcome.features())?)
    } else {
        None
    };

    Ok(Json(PrioritizeResponse {
        outcome,
        csv,
        trial,
    }))
}

async fn export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, ApiError> {
    if request.features.is_empty() {
        return Err(PrioritizerError::Validation("Nothing to export".to_string()).into());
    }
    let csv = presenter::to_csv(&request.features)?;
    let disposition = format!("attachment; filename=\"{}\"", state.export_filename);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
