use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use domains::NotificationDetails;
use serde::Deserialize;
use services::{failure, ActionOutcome, NotificationsMarked};
use uuid::Uuid;

use super::unreadable_body;
use crate::error::ApiError;
use crate::extract::{ActingUser, CurrentActor};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MarkRead {
    #[serde(default)]
    pub ids: Vec<Uuid>,
}

pub async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<NotificationDetails>>, ApiError> {
    Ok(Json(state.notifications.get_notifications(&actor).await?))
}

pub async fn mark_read(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    body: Result<Json<MarkRead>, JsonRejection>,
) -> Json<ActionOutcome<NotificationsMarked>> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return unreadable_body(&state, "mark_notifications_as_read", failure::MARK_READ, rejection),
    };
    let outcome = state.notifications.mark_notifications_as_read(&actor, &body.ids).await;
    Json(state.track("mark_notifications_as_read", outcome))
}
