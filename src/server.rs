//! HTTP surface the host session runtime talks to.
//!
//! The host forwards join, quit and chat events and `/translator` invocations
//! here and applies the deliveries and replies it gets back.

use crate::commands::{handle_translator, Invoker};
use crate::dispatcher::Dispatcher;
use crate::metrics::{MetricsReport, TranslationMetrics};
use crate::security::verify_bearer;
use crate::session::{ChatEvent, Delivery, JoinEvent, QuitEvent};
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

type ApiError = (StatusCode, Json<Value>);

/// Shared state for API handlers.
#[derive(Clone)]
pub struct AppState {
    dispatcher: Dispatcher,
    metrics: Arc<TranslationMetrics>,
    api_key: Option<String>,
}

impl AppState {
    pub fn new(
        dispatcher: Dispatcher,
        metrics: Arc<TranslationMetrics>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            dispatcher,
            metrics,
            api_key,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    handled: bool,
    deliveries: Vec<Delivery>,
}

#[derive(Debug, Deserialize)]
struct CommandRequest {
    sender_id: Option<String>,
    #[serde(default)]
    permissions: Vec<String>,
    #[serde(default)]
    args: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CommandResponse {
    replies: Vec<String>,
}

fn check_auth(headers: &HeaderMap, api_key: &Option<String>) -> Result<(), ApiError> {
    let Some(key) = api_key else {
        return Ok(());
    };

    let header = headers.get(AUTHORIZATION).map(|h| h.to_str());
    verify_bearer(header, key).map_err(|e| {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": e.to_string()})),
        )
    })
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value).map_err(|e| {
        warn!("Rejected request body: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("invalid request: {e}")})),
        )
    })
}

/// `GET /health`
async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// `POST /events/join`
async fn join(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Result<Json<JoinEvent>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    check_auth(&headers, &state.api_key)?;
    let event = parse_body(body)?;

    state
        .dispatcher
        .settings()
        .on_join(&event.participant_id, &event.locale)
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /events/quit`
async fn quit(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Result<Json<QuitEvent>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    check_auth(&headers, &state.api_key)?;
    let event = parse_body(body)?;

    if !state.dispatcher.settings().on_quit(&event.participant_id).await {
        debug!("Quit for unknown participant {}", event.participant_id);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /events/chat`
async fn chat(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Result<Json<ChatEvent>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    check_auth(&headers, &state.api_key)?;
    let mut event = parse_body(body)?;

    let mut deliveries: Vec<Delivery> = Vec::with_capacity(event.recipients.len());
    state.dispatcher.dispatch(&mut event, &mut deliveries).await;

    Ok(Json(ChatResponse {
        handled: event.is_cancelled(),
        deliveries,
    }))
}

/// `POST /commands/translator`
async fn translator_command(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    check_auth(&headers, &state.api_key)?;
    let request = parse_body(body)?;

    let invoker = Invoker {
        participant_id: request.sender_id.as_deref(),
        permissions: &request.permissions,
    };
    let replies = handle_translator(&state.dispatcher, invoker, &request.args).await;

    Ok(Json(CommandResponse { replies }))
}

/// `GET /metrics`
async fn metrics(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<MetricsReport>, ApiError> {
    check_auth(&headers, &state.api_key)?;
    Ok(Json(state.metrics.report()))
}

/// Build the axum router with shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events/join", post(join))
        .route("/events/quit", post(quit))
        .route("/events/chat", post(chat))
        .route("/commands/translator", post(translator_command))
        .route("/metrics", get(metrics))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `listener` until the process is stopped.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr().context("Failed to read listener address")?;
    info!("API server listening on {}", addr);

    axum::serve(listener, router(state))
        .await
        .context("API server error")
}
