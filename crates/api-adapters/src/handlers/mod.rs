//! # Handlers
//!
//! Thin axum handlers: extract, call one service action, serialize.
//! Mutations always answer 200 with an `ActionOutcome`; reads map
//! `DomainError` through `ApiError`.

pub mod notifications;
pub mod posts;
pub mod tasks;
pub mod users;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use services::ActionOutcome;
use tracing::warn;

use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// A mutation whose body cannot be read still answers with its action result.
fn unreadable_body<T>(state: &AppState, action: &str, failure: &str, rejection: JsonRejection) -> Json<ActionOutcome<T>> {
    warn!(action, status = %rejection.status(), error = %rejection.body_text(), "unreadable request body");
    Json(state.track(action, ActionOutcome::failed(failure)))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn export_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.metrics.render().map_err(|_| ApiError::Internal)?;
    Ok(([(CONTENT_TYPE, metrics::CONTENT_TYPE)], body))
}
