//! Posts, likes and comments.

use std::sync::Arc;

use domains::{
    Actor, DomainError, NewComment, NewNotification, NewPost, Post, PostDetails, PostFilter, PostRepo, Result,
    SocialRepo,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::outcome::{failure, ActionOutcome, CommentCreated, LikeToggled, PostCreated, PostDeleted};
use crate::{normalize_text, MAX_CONTENT_LENGTH};

pub struct PostService {
    posts: Arc<dyn PostRepo>,
    social: Arc<dyn SocialRepo>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepo>, social: Arc<dyn SocialRepo>) -> Self {
        Self { posts, social }
    }

    /// Global feed, newest first.
    pub async fn get_posts(&self) -> Result<Vec<PostDetails>> {
        self.posts.list_posts(PostFilter::All).await
    }

    #[instrument(skip(self, content, image), fields(actor = %actor.user_id))]
    pub async fn create_post(&self, actor: &Actor, content: Option<&str>, image: Option<&str>) -> ActionOutcome<PostCreated> {
        let result = self.try_create_post(actor, content, image).await;
        ActionOutcome::settle("create_post", failure::CREATE_POST, result)
    }

    async fn try_create_post(&self, actor: &Actor, content: Option<&str>, image: Option<&str>) -> Result<PostCreated> {
        let content = normalize_text(content, MAX_CONTENT_LENGTH, "content")?;
        let image = image.map(str::trim).filter(|i| !i.is_empty()).map(str::to_string);
        if content.is_none() && image.is_none() {
            return Err(DomainError::validation("a post needs content or an image"));
        }

        let post = self.posts.create_post(NewPost { author_id: actor.user_id, content, image }).await?;
        info!(post_id = %post.id, "post created");
        Ok(PostCreated { post })
    }

    #[instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn toggle_like(&self, actor: &Actor, post_id: Uuid) -> ActionOutcome<LikeToggled> {
        let result = self.try_toggle_like(actor, post_id).await;
        ActionOutcome::settle("toggle_like", failure::TOGGLE_LIKE, result)
    }

    async fn try_toggle_like(&self, actor: &Actor, post_id: Uuid) -> Result<LikeToggled> {
        let post = self.require_post(post_id).await?;
        let notify = NewNotification::like(actor.user_id, post.author_id, post.id);
        let outcome = self.social.toggle_like(actor.user_id, post.id, notify).await?;
        Ok(LikeToggled { liked: outcome.is_present() })
    }

    #[instrument(skip(self, content), fields(actor = %actor.user_id))]
    pub async fn create_comment(&self, actor: &Actor, post_id: Uuid, content: &str) -> ActionOutcome<CommentCreated> {
        let result = self.try_create_comment(actor, post_id, content).await;
        ActionOutcome::settle("create_comment", failure::CREATE_COMMENT, result)
    }

    async fn try_create_comment(&self, actor: &Actor, post_id: Uuid, content: &str) -> Result<CommentCreated> {
        let content = normalize_text(Some(content), MAX_CONTENT_LENGTH, "comment")?
            .ok_or_else(|| DomainError::validation("comment must not be empty"))?;
        let post = self.require_post(post_id).await?;

        let notify = NewNotification::comment(actor.user_id, post.author_id, post.id);
        let comment = self
            .social
            .create_comment(NewComment { author_id: actor.user_id, post_id: post.id, content }, notify)
            .await?;
        Ok(CommentCreated { comment })
    }

    /// Only the author may delete a post.
    #[instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn delete_post(&self, actor: &Actor, post_id: Uuid) -> ActionOutcome<PostDeleted> {
        let result = self.try_delete_post(actor, post_id).await;
        ActionOutcome::settle("delete_post", failure::DELETE_POST, result)
    }

    async fn try_delete_post(&self, actor: &Actor, post_id: Uuid) -> Result<PostDeleted> {
        let post = self.require_post(post_id).await?;
        if post.author_id != actor.user_id {
            return Err(DomainError::Forbidden(format!("post {post_id} belongs to another user")));
        }
        if !self.posts.delete_post(post.id).await? {
            return Err(DomainError::not_found("Post", post_id));
        }
        info!(%post_id, "post deleted");
        Ok(PostDeleted { post_id })
    }

    async fn require_post(&self, post_id: Uuid) -> Result<Post> {
        self.posts.find_post(post_id).await?.ok_or_else(|| DomainError::not_found("Post", post_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{Comment, MockPostRepo, MockSocialRepo, NotificationKind, ToggleOutcome};
    use mockall::predicate::eq;

    fn actor() -> Actor {
        Actor { user_id: Uuid::now_v7(), external_id: "ext".into() }
    }

    fn post_by(author_id: Uuid) -> Post {
        Post { id: Uuid::now_v7(), author_id, content: Some("hello".into()), image: None, created_at: Utc::now() }
    }

    fn posts_returning(post: Post) -> MockPostRepo {
        let id = post.id;
        let mut posts = MockPostRepo::new();
        posts.expect_find_post().with(eq(id)).returning(move |_| Ok(Some(post.clone())));
        posts
    }

    #[tokio::test]
    async fn test_create_post_persists_under_actor() {
        let me = actor();
        let my_id = me.user_id;

        let mut posts = MockPostRepo::new();
        posts
            .expect_create_post()
            .withf(move |p| p.author_id == my_id && p.content.as_deref() == Some("Hello World") && p.image.as_deref() == Some("image.png"))
            .times(1)
            .returning(|p| {
                Ok(Post { id: Uuid::now_v7(), author_id: p.author_id, content: p.content, image: p.image, created_at: Utc::now() })
            });

        let svc = PostService::new(Arc::new(posts), Arc::new(MockSocialRepo::new()));
        let outcome = svc.create_post(&me, Some(" Hello World "), Some("image.png")).await;

        assert!(outcome.success);
        let post = outcome.payload.unwrap().post;
        assert_eq!(post.author_id, my_id);
        assert_eq!(post.content.as_deref(), Some("Hello World"));
    }

    #[tokio::test]
    async fn test_create_post_rejects_empty_and_oversized() {
        let mut posts = MockPostRepo::new();
        posts.expect_create_post().never();
        let svc = PostService::new(Arc::new(posts), Arc::new(MockSocialRepo::new()));
        let me = actor();

        let empty = svc.create_post(&me, Some("   "), None).await;
        assert_eq!(empty.error.as_deref(), Some("Failed to create post"));

        let long = "a".repeat(MAX_CONTENT_LENGTH + 1);
        assert!(!svc.create_post(&me, Some(&long), None).await.success);
    }

    #[tokio::test]
    async fn test_like_notifies_author() {
        let me = actor();
        let author = Uuid::now_v7();
        let post = post_by(author);
        let post_id = post.id;

        let mut social = MockSocialRepo::new();
        social
            .expect_toggle_like()
            .withf(move |_, p, notify| {
                *p == post_id
                    && notify
                        .as_ref()
                        .is_some_and(|n| n.user_id == author && n.kind == NotificationKind::Like && n.post_id == Some(post_id))
            })
            .times(1)
            .returning(|_, _, _| Ok(ToggleOutcome::Created));

        let svc = PostService::new(Arc::new(posts_returning(post)), Arc::new(social));
        let outcome = svc.toggle_like(&me, post_id).await;
        assert_eq!(outcome.payload, Some(LikeToggled { liked: true }));
    }

    #[tokio::test]
    async fn test_liking_own_post_sends_no_notification() {
        let me = actor();
        let post = post_by(me.user_id);
        let post_id = post.id;

        let mut social = MockSocialRepo::new();
        social
            .expect_toggle_like()
            .withf(|_, _, notify| notify.is_none())
            .times(1)
            .returning(|_, _, _| Ok(ToggleOutcome::Removed));

        let svc = PostService::new(Arc::new(posts_returning(post)), Arc::new(social));
        let outcome = svc.toggle_like(&me, post_id).await;
        assert!(outcome.success);
        assert_eq!(outcome.payload, Some(LikeToggled { liked: false }));
    }

    #[tokio::test]
    async fn test_concurrent_like_race_is_success() {
        let post = post_by(Uuid::now_v7());
        let post_id = post.id;

        let mut social = MockSocialRepo::new();
        social.expect_toggle_like().returning(|_, _, _| Ok(ToggleOutcome::AlreadyPresent));

        let svc = PostService::new(Arc::new(posts_returning(post)), Arc::new(social));
        let outcome = svc.toggle_like(&actor(), post_id).await;
        assert!(outcome.success);
        assert_eq!(outcome.payload, Some(LikeToggled { liked: true }));
    }

    #[tokio::test]
    async fn test_like_on_missing_post_fails() {
        let mut posts = MockPostRepo::new();
        posts.expect_find_post().returning(|_| Ok(None));
        let mut social = MockSocialRepo::new();
        social.expect_toggle_like().never();

        let svc = PostService::new(Arc::new(posts), Arc::new(social));
        let outcome = svc.toggle_like(&actor(), Uuid::now_v7()).await;
        assert_eq!(outcome.error.as_deref(), Some("Failed to toggle like"));
    }

    #[tokio::test]
    async fn test_comment_notifies_author() {
        let me = actor();
        let author = Uuid::now_v7();
        let post = post_by(author);
        let post_id = post.id;

        let mut social = MockSocialRepo::new();
        social
            .expect_create_comment()
            .withf(move |c, notify| {
                c.content == "New comment"
                    && c.post_id == post_id
                    && notify.as_ref().is_some_and(|n| n.kind == NotificationKind::Comment && n.user_id == author)
            })
            .times(1)
            .returning(|c, _| {
                Ok(Comment { id: Uuid::now_v7(), author_id: c.author_id, post_id: c.post_id, content: c.content, created_at: Utc::now() })
            });

        let svc = PostService::new(Arc::new(posts_returning(post)), Arc::new(social));
        let outcome = svc.create_comment(&me, post_id, "New comment").await;
        assert!(outcome.success);
        assert_eq!(outcome.payload.unwrap().comment.content, "New comment");
    }

    #[tokio::test]
    async fn test_empty_comment_is_rejected() {
        let mut social = MockSocialRepo::new();
        social.expect_create_comment().never();
        let svc = PostService::new(Arc::new(MockPostRepo::new()), Arc::new(social));

        let outcome = svc.create_comment(&actor(), Uuid::now_v7(), "  ").await;
        assert_eq!(outcome.error.as_deref(), Some("Failed to create comment"));
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let me = actor();
        let post = post_by(Uuid::now_v7());
        let post_id = post.id;

        let mut posts = posts_returning(post);
        posts.expect_delete_post().never();

        let svc = PostService::new(Arc::new(posts), Arc::new(MockSocialRepo::new()));
        let outcome = svc.delete_post(&me, post_id).await;
        assert_eq!(outcome.error.as_deref(), Some("Failed to delete post"));
    }

    #[tokio::test]
    async fn test_delete_own_post() {
        let me = actor();
        let post = post_by(me.user_id);
        let post_id = post.id;

        let mut posts = posts_returning(post);
        posts.expect_delete_post().with(eq(post_id)).times(1).returning(|_| Ok(true));

        let svc = PostService::new(Arc::new(posts), Arc::new(MockSocialRepo::new()));
        let outcome = svc.delete_post(&me, post_id).await;
        assert_eq!(outcome.payload, Some(PostDeleted { post_id }));
    }
}
