//! # ActionOutcome
//!
//! Mutating actions never hand an error to their caller. Failures are
//! logged here and replaced with a fixed, per-action message.

use domains::{Comment, DomainError, Post, Result, User};
use serde::Serialize;
use uuid::Uuid;

/// Fixed messages a failed action reports to its caller.
pub mod failure {
    pub const CREATE_POST: &str = "Failed to create post";
    pub const DELETE_POST: &str = "Failed to delete post";
    pub const TOGGLE_LIKE: &str = "Failed to toggle like";
    pub const CREATE_COMMENT: &str = "Failed to create comment";
    pub const TOGGLE_FOLLOW: &str = "Error toggling follow";
    pub const UPDATE_PROFILE: &str = "Failed to update profile";
    pub const MARK_READ: &str = "Failed to mark notifications as read";
}

/// Serializes as `{"success": true, ...payload}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome<T> {
    pub success: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ActionOutcome<T> {
    pub fn ok(payload: T) -> Self {
        Self { success: true, payload: Some(payload), error: None }
    }

    pub fn failed(message: &str) -> Self {
        Self { success: false, payload: None, error: Some(message.to_string()) }
    }

    /// Collapses `result` into an outcome. The underlying error is logged
    /// under `action`; callers only ever see `failure`.
    pub fn settle(action: &'static str, failure: &'static str, result: Result<T>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(err @ DomainError::Internal(_)) => {
                tracing::error!(action, error = %err, "action failed");
                Self::failed(failure)
            }
            Err(err) => {
                tracing::warn!(action, error = %err, "action rejected");
                Self::failed(failure)
            }
        }
    }

    pub fn into_result(self) -> std::result::Result<T, String> {
        match (self.payload, self.error) {
            (Some(payload), None) => Ok(payload),
            (_, error) => Err(error.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostCreated {
    pub post: Post,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDeleted {
    pub post_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentCreated {
    pub comment: Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LikeToggled {
    pub liked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FollowToggled {
    pub following: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdated {
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NotificationsMarked {
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_payload_inline() {
        let outcome = ActionOutcome::ok(LikeToggled { liked: true });
        assert_eq!(serde_json::to_value(&outcome).unwrap(), serde_json::json!({ "success": true, "liked": true }));
    }

    #[test]
    fn test_failure_hides_cause() {
        let outcome: ActionOutcome<LikeToggled> =
            ActionOutcome::settle("toggle_like", failure::TOGGLE_LIKE, Err(DomainError::Internal("disk I/O error".into())));
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({ "success": false, "error": "Failed to toggle like" })
        );
    }
}
