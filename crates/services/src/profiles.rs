//! Profile pages: lookups by username, a user's posts and likes, and edits.

use std::sync::Arc;

use domains::{Actor, PostDetails, PostFilter, PostRepo, ProfileUpdate, Result, SocialRepo, UserProfile, UserRepo};
use tracing::instrument;
use uuid::Uuid;

use crate::outcome::{failure, ActionOutcome, ProfileUpdated};
use crate::{normalize_text, MAX_BIO_LENGTH, MAX_PROFILE_FIELD_LENGTH, MAX_WEBSITE_LENGTH};

pub struct ProfileService {
    users: Arc<dyn UserRepo>,
    posts: Arc<dyn PostRepo>,
    social: Arc<dyn SocialRepo>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepo>, posts: Arc<dyn PostRepo>, social: Arc<dyn SocialRepo>) -> Self {
        Self { users, posts, social }
    }

    pub async fn get_profile_by_username(&self, username: &str) -> Result<Option<UserProfile>> {
        let Some(user) = self.users.find_user_by_username(username).await? else {
            return Ok(None);
        };
        let counts = self.users.profile_counts(user.id).await?;
        Ok(Some(UserProfile { user, counts }))
    }

    pub async fn get_user_posts(&self, user_id: Uuid) -> Result<Vec<PostDetails>> {
        self.posts.list_posts(PostFilter::Author(user_id)).await
    }

    pub async fn get_user_liked_posts(&self, user_id: Uuid) -> Result<Vec<PostDetails>> {
        self.posts.list_posts(PostFilter::LikedBy(user_id)).await
    }

    pub async fn is_following(&self, actor: &Actor, user_id: Uuid) -> Result<bool> {
        self.social.is_following(actor.user_id, user_id).await
    }

    /// Blank fields are cleared; absent fields are left alone.
    #[instrument(skip(self, update), fields(actor = %actor.user_id))]
    pub async fn update_profile(&self, actor: &Actor, update: ProfileUpdate) -> ActionOutcome<ProfileUpdated> {
        let result = self.try_update_profile(actor, update).await;
        ActionOutcome::settle("update_profile", failure::UPDATE_PROFILE, result)
    }

    async fn try_update_profile(&self, actor: &Actor, update: ProfileUpdate) -> Result<ProfileUpdated> {
        let normalized = ProfileUpdate {
            name: normalize_field(update.name.as_deref(), MAX_PROFILE_FIELD_LENGTH, "name")?,
            bio: normalize_field(update.bio.as_deref(), MAX_BIO_LENGTH, "bio")?,
            location: normalize_field(update.location.as_deref(), MAX_PROFILE_FIELD_LENGTH, "location")?,
            website: normalize_field(update.website.as_deref(), MAX_WEBSITE_LENGTH, "website")?,
        };
        let user = self.users.update_profile(actor.user_id, normalized).await?;
        Ok(ProfileUpdated { user })
    }
}

/// `None` stays `None` (untouched); a present value is trimmed and an
/// empty result becomes `Some("")`, which the store writes as NULL.
fn normalize_field(raw: Option<&str>, max: usize, field: &str) -> Result<Option<String>> {
    match raw {
        None => Ok(None),
        Some(value) => Ok(Some(normalize_text(Some(value), max, field)?.unwrap_or_default())),
    }
}
