//! Identity sync, "who to follow", the follow toggle and profile pages.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use domains::{PostDetails, ProfileUpdate, SuggestedUser, User, UserProfile};
use serde::Serialize;
use services::{failure, ActionOutcome, FollowToggled, ProfileUpdated};
use uuid::Uuid;

use super::unreadable_body;
use crate::error::ApiError;
use crate::extract::{ActingUser, BearerToken, CurrentActor};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FollowingStatus {
    pub following: bool,
}

pub async fn sync_user(State(state): State<AppState>, BearerToken(token): BearerToken) -> Result<Json<User>, ApiError> {
    state.users.sync_user(&token).await?.map(Json).ok_or(ApiError::Unauthorized)
}

pub async fn me(State(state): State<AppState>, CurrentActor(actor): CurrentActor) -> Result<Json<UserProfile>, ApiError> {
    state
        .users
        .get_user_by_external_id(&actor.external_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User".into()))
}

pub async fn suggested_users(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<SuggestedUser>>, ApiError> {
    Ok(Json(state.users.get_random_users(&actor).await?))
}

pub async fn toggle_follow(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(user_id): Path<Uuid>,
) -> Json<ActionOutcome<FollowToggled>> {
    let outcome = state.users.toggle_follow(&actor, user_id).await;
    Json(state.track("toggle_follow", outcome))
}

pub async fn is_following(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(user_id): Path<Uuid>,
) -> Result<Json<FollowingStatus>, ApiError> {
    let following = state.profiles.is_following(&actor, user_id).await?;
    Ok(Json(FollowingStatus { following }))
}

pub async fn user_posts(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> Result<Json<Vec<PostDetails>>, ApiError> {
    Ok(Json(state.profiles.get_user_posts(user_id).await?))
}

pub async fn user_likes(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> Result<Json<Vec<PostDetails>>, ApiError> {
    Ok(Json(state.profiles.get_user_liked_posts(user_id).await?))
}

pub async fn profile(State(state): State<AppState>, Path(username): Path<String>) -> Result<Json<UserProfile>, ApiError> {
    state
        .profiles
        .get_profile_by_username(&username)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User".into()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    update: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Json<ActionOutcome<ProfileUpdated>> {
    let Json(update) = match update {
        Ok(update) => update,
        Err(rejection) => return unreadable_body(&state, "update_profile", failure::UPDATE_PROFILE, rejection),
    };
    let outcome = state.profiles.update_profile(&actor, update).await;
    Json(state.track("update_profile", outcome))
}
