use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use domains::PostDetails;
use serde::Deserialize;
use services::{failure, ActionOutcome, CommentCreated, LikeToggled, PostCreated, PostDeleted};
use uuid::Uuid;

use crate::error::ApiError;
use super::unreadable_body;
use crate::extract::ActingUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePost {
    pub content: Option<String>,
    /// Reference returned by the upload service
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub content: String,
}

pub async fn feed(State(state): State<AppState>) -> Result<Json<Vec<PostDetails>>, ApiError> {
    Ok(Json(state.posts.get_posts().await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    body: Result<Json<CreatePost>, JsonRejection>,
) -> Json<ActionOutcome<PostCreated>> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return unreadable_body(&state, "create_post", failure::CREATE_POST, rejection),
    };
    let outcome = state.posts.create_post(&actor, body.content.as_deref(), body.image.as_deref()).await;
    Json(state.track("create_post", outcome))
}

pub async fn delete_post(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(post_id): Path<Uuid>,
) -> Json<ActionOutcome<PostDeleted>> {
    let outcome = state.posts.delete_post(&actor, post_id).await;
    Json(state.track("delete_post", outcome))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(post_id): Path<Uuid>,
) -> Json<ActionOutcome<LikeToggled>> {
    let outcome = state.posts.toggle_like(&actor, post_id).await;
    Json(state.track("toggle_like", outcome))
}

pub async fn create_comment(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(post_id): Path<Uuid>,
    body: Result<Json<CreateComment>, JsonRejection>,
) -> Json<ActionOutcome<CommentCreated>> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return unreadable_body(&state, "create_comment", failure::CREATE_COMMENT, rejection),
    };
    let outcome = state.posts.create_comment(&actor, post_id, &body.content).await;
    Json(state.track("create_comment", outcome))
}
