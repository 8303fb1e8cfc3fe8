use async_trait::async_trait;
use chrono::Utc;
use domains::{Comment, NewComment, NewNotification, Result, SocialRepo, ToggleOutcome};
use sqlx::sqlite::SqliteArguments;
use sqlx::query::Query;
use sqlx::Sqlite;
use tracing::debug;
use uuid::Uuid;

use super::{insert_notification, is_unique_violation, DbResultExt, SqliteStore};

impl SqliteStore {
    /// Delete-or-insert of a single edge inside one transaction.
    ///
    /// A unique violation on insert means a concurrent toggle created the
    /// edge between our delete and insert; that is reported as
    /// `AlreadyPresent` and nothing is written.
    async fn toggle_edge<'q>(
        &self,
        delete: Query<'q, Sqlite, SqliteArguments<'q>>,
        insert: Query<'q, Sqlite, SqliteArguments<'q>>,
        notify: Option<&NewNotification>,
    ) -> Result<ToggleOutcome> {
        let mut tx = self.pool().begin().await.db()?;

        let removed = delete.execute(&mut *tx).await.db()?.rows_affected();
        if removed > 0 {
            tx.commit().await.db()?;
            return Ok(ToggleOutcome::Removed);
        }

        if let Err(err) = insert.execute(&mut *tx).await {
            if is_unique_violation(&err) {
                tx.rollback().await.db()?;
                debug!("edge created concurrently, keeping it");
                return Ok(ToggleOutcome::AlreadyPresent);
            }
            return Err(err).db();
        }

        if let Some(notification) = notify {
            insert_notification(&mut *tx, notification, None).await.db()?;
        }

        tx.commit().await.db()?;
        Ok(ToggleOutcome::Created)
    }
}

#[async_trait]
impl SocialRepo for SqliteStore {
    async fn toggle_like(&self, user_id: Uuid, post_id: Uuid, notify: Option<NewNotification>) -> Result<ToggleOutcome> {
        let delete = sqlx::query("DELETE FROM likes WHERE user_id = ? AND post_id = ?").bind(user_id).bind(post_id);
        let insert = sqlx::query("INSERT INTO likes (id, user_id, post_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(Uuid::now_v7())
            .bind(user_id)
            .bind(post_id)
            .bind(Utc::now());
        self.toggle_edge(delete, insert, notify.as_ref()).await
    }

    async fn toggle_follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
        notify: Option<NewNotification>,
    ) -> Result<ToggleOutcome> {
        let delete = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND following_id = ?")
            .bind(follower_id)
            .bind(following_id);
        let insert = sqlx::query("INSERT INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)")
            .bind(follower_id)
            .bind(following_id)
            .bind(Utc::now());
        self.toggle_edge(delete, insert, notify.as_ref()).await
    }

    async fn create_comment(&self, comment: NewComment, notify: Option<NewNotification>) -> Result<Comment> {
        let created = Comment {
            id: Uuid::now_v7(),
            author_id: comment.author_id,
            post_id: comment.post_id,
            content: comment.content,
            created_at: Utc::now(),
        };

        let mut tx = self.pool().begin().await.db()?;

        sqlx::query("INSERT INTO comments (id, author_id, post_id, content, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(created.id)
            .bind(created.author_id)
            .bind(created.post_id)
            .bind(&created.content)
            .bind(created.created_at)
            .execute(&mut *tx)
            .await
            .db()?;

        if let Some(notification) = notify {
            insert_notification(&mut *tx, &notification, Some(created.id)).await.db()?;
        }

        tx.commit().await.db()?;
        Ok(created)
    }

    async fn is_following(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = ? AND following_id = ?)")
            .bind(follower_id)
            .bind(following_id)
            .fetch_one(self.pool())
            .await
            .db()
    }
}
