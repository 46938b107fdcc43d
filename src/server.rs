// todolist/src/server.rs
//
// REST adapter over `Store`. Every handler runs one blocking load-mutate-save on the
// blocking pool; there is no locking, so concurrent writers can lose updates.

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{error, info};

use crate::{
    error::{StoreError, StoreResult},
    store::Store,
    todo::{Todo, TodoId},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub public_dir: PathBuf,
}

impl AppState {
    pub fn new(store: Store, public_dir: impl Into<PathBuf>) -> Self {
        Self { store, public_dir: public_dir.into() }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Text is required")]
    TextRequired,
    #[error("Todo not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::TextRequired => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Join(_) => {
                error!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.public_dir);
    Router::new()
        .route("/", get(index))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/completed/clear", delete(clear_completed))
        .route("/api/todos/:id", delete(delete_todo))
        .route("/api/todos/:id/complete", patch(complete_todo))
        .route("/api/todos/:id/uncomplete", patch(uncomplete_todo))
        .fallback_service(assets)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves until ctrl-c.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(store = %state.store.location(), public = %state.public_dir.display(), "serving todos");
    info!("Server running at http://{addr}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async { let _ = tokio::signal::ctrl_c().await; })
        .await?;
    Ok(())
}

async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Store) -> StoreResult<T> + Send + 'static,
{
    let store = state.store.clone();
    Ok(tokio::task::spawn_blocking(move || f(&store)).await??)
}

/// Anything that is not a plain integer can never match a todo.
fn parse_id(raw: &str) -> Result<TodoId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    tokio::fs::read_to_string(state.public_dir.join("index.html"))
        .await
        .map(Html)
        .map_err(|_| StatusCode::NOT_FOUND)
}

async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(blocking(&state, |s| s.list(true)).await?))
}

async fn create_todo(State(state): State<AppState>, body: Bytes) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let text = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|v| v.get("text")?.as_str().map(str::to_owned))
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::TextRequired)?;
    let todo = blocking(&state, move |s| s.add(text)).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn complete_todo(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    blocking(&state, move |s| s.complete(id)).await?.map(Json).ok_or(ApiError::NotFound)
}

async fn uncomplete_todo(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    blocking(&state, move |s| s.uncomplete(id)).await?.map(Json).ok_or(ApiError::NotFound)
}

async fn delete_todo(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    blocking(&state, move |s| s.delete(id)).await?.map(Json).ok_or(ApiError::NotFound)
}

async fn clear_completed(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let count = blocking(&state, |s| s.clear_completed()).await?;
    Ok(Json(json!({ "deleted": count })))
}
