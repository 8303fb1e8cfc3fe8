//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::identity::ExternalIdentity;
use crate::models::{
    Comment, NewComment, NewNotification, NewPost, NewUser, NotificationDetails, Post, PostDetails,
    PostFilter, ProfileCounts, ProfileUpdate, SuggestedUser, Task, ToggleOutcome, User,
};

/// Persistence contract for user accounts and profiles.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Fails with `DomainError::Conflict` when external id, username or
    /// email is already taken.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn profile_counts(&self, user_id: Uuid) -> Result<ProfileCounts>;
    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<User>;

    /// Users that are neither `user_id` nor followed by it.
    async fn suggested_users(&self, user_id: Uuid, limit: i64) -> Result<Vec<SuggestedUser>>;
}

/// Persistence contract for posts and feeds.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>>;
    async fn create_post(&self, post: NewPost) -> Result<Post>;

    /// Removes the post with its comments, likes and notifications.
    /// Returns false if no such post existed.
    async fn delete_post(&self, id: Uuid) -> Result<bool>;

    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<PostDetails>>;
}

/// Likes, follows and comments: every write here may carry a notification
/// that must land in the same transaction.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SocialRepo: Send + Sync {
    /// Deletes the like if present, otherwise inserts it together with `notify`.
    async fn toggle_like(&self, user_id: Uuid, post_id: Uuid, notify: Option<NewNotification>) -> Result<ToggleOutcome>;

    /// Deletes the edge if present, otherwise inserts it together with `notify`.
    async fn toggle_follow(&self, follower_id: Uuid, following_id: Uuid, notify: Option<NewNotification>) -> Result<ToggleOutcome>;

    /// Inserts the comment and `notify` (with its comment id filled in) atomically.
    async fn create_comment(&self, comment: NewComment, notify: Option<NewNotification>) -> Result<Comment>;

    async fn is_following(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NotificationRepo: Send + Sync {
    /// Newest first.
    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<NotificationDetails>>;

    /// Marks as read the notifications among `ids` whose recipient is
    /// `user_id`. Returns how many rows changed.
    async fn mark_read(&self, user_id: Uuid, ids: &[Uuid]) -> Result<u64>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TaskRepo: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>>;
    async fn create_task(&self, title: &str) -> Result<Task>;
    async fn delete_task(&self, id: i64) -> Result<bool>;
}

/// Identity contract: verifies a bearer token issued by the external
/// identity provider.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity>;
}

/// Everything the relational store provides, for wiring a single adapter
/// into all services.
pub trait Store: UserRepo + PostRepo + SocialRepo + NotificationRepo + TaskRepo {}

impl<T> Store for T where T: UserRepo + PostRepo + SocialRepo + NotificationRepo + TaskRepo {}
