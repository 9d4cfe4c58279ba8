//! HTTP API server for the local front-end.
//!
//! Provides the instruction endpoint and a health check.

use crate::agent::OpenAiRunner;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::DeskhandError;
use crate::gateway::{DedalusRequest, DedalusResponse, Gateway};
use crate::tools::Toolbox;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Shared application state.
pub struct AppState {
    pub gateway: Gateway,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let runner = Arc::new(OpenAiRunner::new(&settings.agent)?);
    let toolbox = Toolbox::standard(&settings);
    let gateway = Gateway::new(runner, toolbox, settings.agent.default_model.clone());

    let origin = settings.cors_origin()?;
    let app = router(Arc::new(AppState { gateway }), &origin)?;

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Deskhand API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Instruction", "POST /api/dedalus");
    Output::kv("Health", "GET  /health");
    println!();
    Output::kv("Allowed origin", &origin);
    Output::kv("Default model", &settings.agent.default_model);
    Output::kv("Database", &settings.database_path().display().to_string());
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router with a credentialed CORS policy for a single origin.
pub fn router(state: Arc<AppState>, allowed_origin: &str) -> crate::Result<Router> {
    let origin = HeaderValue::from_str(allowed_origin).map_err(|e| {
        DeskhandError::Config(format!("Invalid allowed origin '{}': {}", allowed_origin, e))
    })?;

    // Wildcards are not allowed together with credentials, so methods and
    // headers are mirrored from the preflight request instead. A list, unlike
    // an exact origin, leaves the header off for origins that do not match.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Ok(Router::new()
        .route("/health", get(health))
        .route("/api/dedalus", post(dedalus))
        .layer(cors)
        .with_state(state))
}

// === Errors ===

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

/// An error answered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<DeskhandError> for ApiError {
    fn from(err: DeskhandError) -> Self {
        let status = match &err {
            DeskhandError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { detail: self.detail })).into_response()
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn dedalus(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DedalusRequest>, JsonRejection>,
) -> Result<Json<DedalusResponse>, ApiError> {
    let Json(request) = payload?;

    let span = info_span!("dedalus", request_id = %Uuid::new_v4());
    let response = state.gateway.dispatch(&request).instrument(span).await?;

    Ok(Json(response))
}
