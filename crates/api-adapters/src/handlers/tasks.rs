use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domains::Task;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateTask {
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub id: Option<String>,
}

pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.tasks.list_tasks().await?))
}

/// An unreadable body is treated like a missing title.
pub async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTask>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let task = state.tasks.create_task(body.title.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn delete_task(
    State(state): State<AppState>,
    query: Result<Query<TaskQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = query.map(|Query(query)| query).unwrap_or_default();
    state.tasks.delete_task(query.id.as_deref()).await?;
    Ok(Json(json!({ "message": "Task deleted" })))
}
