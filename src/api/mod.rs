//! JSON HTTP API. Every route under `/api` requires a bearer token and
//! answers `{ "data": ... }` or `{ "error": "..." }`.

pub mod named;
pub mod summary;
pub mod transactions;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::db::DbPool;
use crate::error::{Result, TallyError};
use crate::named::NamedKind;

/// Shared state accessible from handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(db: DbPool, auth: AuthConfig) -> Self {
        Self {
            db,
            auth: Arc::new(auth),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let router = Router::new().route("/health", get(health));
    let router = named::register(router, "/api/accounts", NamedKind::Account);
    let router = named::register(router, "/api/categories", NamedKind::Category);
    transactions::register(router)
        .route("/api/summary", get(summary::get_summary))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn not_found() -> TallyError {
    TallyError::NotFound
}

// ---------------------------------------------------------------------------
// Response envelope and errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

pub type ApiResult<T> = Result<Json<Data<T>>>;

pub fn data<T>(data: T) -> Json<Data<T>> {
    Json(Data { data })
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for TallyError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            TallyError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            TallyError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            TallyError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            TallyError::UnknownAccount(_) | TallyError::UnknownCategory(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            _ => {
                tracing::error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<JsonRejection> for TallyError {
    fn from(rejection: JsonRejection) -> Self {
        TallyError::Invalid(rejection.body_text())
    }
}

impl From<QueryRejection> for TallyError {
    fn from(rejection: QueryRejection) -> Self {
        TallyError::Invalid(rejection.body_text())
    }
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

/// `axum::Json` whose rejection is a 400 in the API's error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(TallyError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` whose rejection is a 400 in the API's error shape.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(TallyError))]
pub struct ApiQuery<T>(pub T);

/// The authenticated caller's user id.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = TallyError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(TallyError::Unauthorized)?;
        state.auth.verify(token).map(AuthUser)
    }
}
