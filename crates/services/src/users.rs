//! Identity sync, account lookups and the follow graph.

use std::sync::Arc;

use domains::{
    Actor, DomainError, IdentityProfile, IdentityProvider, NewNotification, NewUser, Result, SocialRepo, SuggestedUser,
    User, UserProfile, UserRepo,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::outcome::{failure, ActionOutcome, FollowToggled};
use crate::SUGGESTED_USERS_LIMIT;

/// Suffixed usernames tried after the natural candidates are taken.
const SUFFIX_ATTEMPTS: usize = 3;

pub struct UserService {
    users: Arc<dyn UserRepo>,
    social: Arc<dyn SocialRepo>,
    identity: Arc<dyn IdentityProvider>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepo>, social: Arc<dyn SocialRepo>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { users, social, identity }
    }

    /// Makes sure a local user mirrors the identity behind `token`.
    ///
    /// Returns `Ok(None)` when the token cannot be verified, its profile is
    /// unusable, or a new identity cannot be given an account (email owned
    /// by another user, no free username). Storage failures are propagated.
    #[instrument(skip_all)]
    pub async fn sync_user(&self, token: &str) -> Result<Option<User>> {
        let identity = match self.identity.verify(token).await {
            Ok(identity) => identity,
            Err(err) => {
                debug!(error = %err, "identity token rejected");
                return Ok(None);
            }
        };

        if let Some(existing) = self.users.find_user_by_external_id(&identity.external_id).await? {
            return Ok(Some(existing));
        }

        let profile = match IdentityProfile::from_identity(&identity) {
            Ok(profile) => profile,
            Err(err) => {
                warn!(external_id = %identity.external_id, error = %err, "unusable identity profile");
                return Ok(None);
            }
        };

        if let Some(owner) = self.users.find_user_by_email(&profile.email).await? {
            warn!(
                external_id = %identity.external_id,
                owner = %owner.id,
                "email already belongs to another account"
            );
            return Ok(None);
        }

        self.create_from_profile(profile).await
    }

    /// Resolves the actor for a bearer token.
    pub async fn authenticate(&self, token: &str) -> Result<Option<Actor>> {
        Ok(self.sync_user(token).await?.as_ref().map(Actor::from))
    }

    /// Tries the natural username candidates, then a few suffixed ones.
    async fn create_from_profile(&self, profile: IdentityProfile) -> Result<Option<User>> {
        let base = profile.username_base();
        let suffixed = (0..SUFFIX_ATTEMPTS).map(|_| {
            let id = Uuid::new_v4().simple().to_string();
            format!("{base}{}", &id[..6])
        });

        for username in profile.username_candidates().into_iter().chain(suffixed) {
            if self.users.find_user_by_username(&username).await?.is_some() {
                continue;
            }

            let new_user = NewUser {
                external_id: profile.external_id.clone(),
                username: username.clone(),
                email: profile.email.clone(),
                name: profile.name.clone(),
                image: profile.image.clone(),
            };

            match self.users.create_user(new_user).await {
                Ok(user) => {
                    info!(user_id = %user.id, username = %user.username, "synced new user");
                    return Ok(Some(user));
                }
                Err(DomainError::Conflict(reason)) => {
                    // A concurrent sync may have inserted this identity already.
                    if let Some(existing) = self.users.find_user_by_external_id(&profile.external_id).await? {
                        return Ok(Some(existing));
                    }
                    if self.users.find_user_by_email(&profile.email).await?.is_some() {
                        warn!(external_id = %profile.external_id, "email claimed by a concurrent sync");
                        return Ok(None);
                    }
                    debug!(%username, %reason, "username candidate rejected");
                }
                Err(err) => return Err(err),
            }
        }

        warn!(external_id = %profile.external_id, "no free username candidate");
        Ok(None)
    }

    pub async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<UserProfile>> {
        let Some(user) = self.users.find_user_by_external_id(external_id).await? else {
            return Ok(None);
        };
        let counts = self.users.profile_counts(user.id).await?;
        Ok(Some(UserProfile { user, counts }))
    }

    pub async fn get_db_user_id(&self, external_id: &str) -> Result<Uuid> {
        self.users
            .find_user_by_external_id(external_id)
            .await?
            .map(|u| u.id)
            .ok_or_else(|| DomainError::not_found("User", external_id))
    }

    /// Up to three accounts the actor does not follow yet.
    pub async fn get_random_users(&self, actor: &Actor) -> Result<Vec<SuggestedUser>> {
        self.users.suggested_users(actor.user_id, SUGGESTED_USERS_LIMIT).await
    }

    #[instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn toggle_follow(&self, actor: &Actor, target_user_id: Uuid) -> ActionOutcome<FollowToggled> {
        let result = self.try_toggle_follow(actor, target_user_id).await;
        ActionOutcome::settle("toggle_follow", failure::TOGGLE_FOLLOW, result)
    }

    async fn try_toggle_follow(&self, actor: &Actor, target_user_id: Uuid) -> Result<FollowToggled> {
        if actor.user_id == target_user_id {
            return Err(DomainError::validation("you cannot follow yourself"));
        }
        if self.users.find_user_by_id(target_user_id).await?.is_none() {
            return Err(DomainError::not_found("User", target_user_id));
        }

        let notify = NewNotification::follow(actor.user_id, target_user_id);
        let outcome = self.social.toggle_follow(actor.user_id, target_user_id, notify).await?;
        Ok(FollowToggled { following: outcome.is_present() })
    }
}
