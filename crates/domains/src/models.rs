//! # Domain Models
//!
//! These structs represent the core entities of Hearth.
//! We use UUID v7 for time-ordered, globally unique identification.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// A local account mirroring a profile held by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Subject id assigned by the identity provider
    pub external_id: String,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    /// Avatar URL handed over by the identity provider
    pub image: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The public slice of a user embedded in posts, comments and notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub external_id: String,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCounts {
    pub posts: i64,
    pub followers: i64,
    pub following: i64,
}

/// A user together with relationship counters, as shown on a profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    #[serde(rename = "_count")]
    pub counts: ProfileCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerCount {
    pub followers: i64,
}

/// "Who to follow" entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedUser {
    #[serde(flatten)]
    pub user: UserSummary,
    #[serde(rename = "_count")]
    pub counts: FollowerCount,
}

/// Editable profile fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: Option<String>,
    /// Reference handed out by the upload service
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub author_id: Uuid,
    pub content: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDetails {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: UserSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCounts {
    pub likes: i64,
    pub comments: i64,
}

/// A post as rendered in a feed: author, comment thread and like state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetails {
    #[serde(flatten)]
    pub post: Post,
    pub author: UserSummary,
    /// Oldest first
    pub comments: Vec<CommentDetails>,
    /// Ids of the users who liked the post
    pub liked_by: Vec<Uuid>,
    #[serde(rename = "_count")]
    pub counts: PostCounts,
}

/// Which posts a feed query selects. Results are always newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Author(Uuid),
    LikedBy(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "LIKE",
            NotificationKind::Comment => "COMMENT",
            NotificationKind::Follow => "FOLLOW",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIKE" => Ok(NotificationKind::Like),
            "COMMENT" => Ok(NotificationKind::Comment),
            "FOLLOW" => Ok(NotificationKind::Follow),
            other => Err(DomainError::Internal(format!("unknown notification type {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    /// Recipient
    pub user_id: Uuid,
    /// Actor whose action produced the notification
    pub creator_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification about to be written next to the like, comment or follow
/// that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub creator_id: Uuid,
    pub kind: NotificationKind,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
}

impl NewNotification {
    /// `None` when the actor is acting on their own content.
    pub fn like(actor: Uuid, post_author: Uuid, post_id: Uuid) -> Option<Self> {
        (actor != post_author).then(|| Self {
            user_id: post_author,
            creator_id: actor,
            kind: NotificationKind::Like,
            post_id: Some(post_id),
            comment_id: None,
        })
    }

    /// The comment id is filled in by the store once the comment row exists.
    pub fn comment(actor: Uuid, post_author: Uuid, post_id: Uuid) -> Option<Self> {
        (actor != post_author).then(|| Self {
            user_id: post_author,
            creator_id: actor,
            kind: NotificationKind::Comment,
            post_id: Some(post_id),
            comment_id: None,
        })
    }

    pub fn follow(actor: Uuid, target: Uuid) -> Option<Self> {
        (actor != target).then(|| Self {
            user_id: target,
            creator_id: actor,
            kind: NotificationKind::Follow,
            post_id: None,
            comment_id: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPost {
    pub id: Uuid,
    pub content: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationComment {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDetails {
    #[serde(flatten)]
    pub notification: Notification,
    pub creator: UserSummary,
    pub post: Option<NotificationPost>,
    pub comment: Option<NotificationComment>,
}

/// Result of flipping a like or follow edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The edge was absent and has been written
    Created,
    /// The edge was present and has been deleted
    Removed,
    /// A concurrent toggle wrote the edge first; nothing changed
    AlreadyPresent,
}

impl ToggleOutcome {
    /// Whether the edge exists after the toggle.
    pub fn is_present(&self) -> bool {
        !matches!(self, ToggleOutcome::Removed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub completed: bool,
}

/// The user on whose behalf the current request executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub external_id: String,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            external_id: user.external_id.clone(),
        }
    }
}
