use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use domains::{
    Comment, CommentDetails, NewPost, Post, PostCounts, PostDetails, PostFilter, PostRepo, Result,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use super::{summary_from_row, DbResultExt, SqliteStore};

fn post_from_row(row: &SqliteRow) -> std::result::Result<Post, sqlx::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        author_id: row.try_get("author_id")?,
        content: row.try_get("content")?,
        image: row.try_get("image")?,
        created_at: row.try_get("created_at")?,
    })
}

fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[Uuid]) {
    builder.push(" (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

impl SqliteStore {
    /// Comments for the given posts, oldest first, grouped by post.
    async fn comments_for(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<CommentDetails>>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT c.id, c.author_id, c.post_id, c.content, c.created_at, \
               u.username AS author_username, u.name AS author_name, u.image AS author_image \
             FROM comments c JOIN users u ON u.id = c.author_id \
             WHERE c.post_id IN",
        );
        push_id_list(&mut builder, post_ids);
        builder.push(" ORDER BY c.created_at ASC, c.id ASC");

        let rows = builder.build().fetch_all(self.pool()).await.db()?;
        let mut grouped: HashMap<Uuid, Vec<CommentDetails>> = HashMap::new();
        for row in &rows {
            let comment = Comment {
                id: row.try_get("id").db()?,
                author_id: row.try_get("author_id").db()?,
                post_id: row.try_get("post_id").db()?,
                content: row.try_get("content").db()?,
                created_at: row.try_get("created_at").db()?,
            };
            let author = summary_from_row(row, "author").db()?;
            grouped.entry(comment.post_id).or_default().push(CommentDetails { comment, author });
        }
        Ok(grouped)
    }

    async fn likes_for(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Uuid>>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT post_id, user_id FROM likes WHERE post_id IN");
        push_id_list(&mut builder, post_ids);
        builder.push(" ORDER BY created_at ASC");

        let rows = builder.build().fetch_all(self.pool()).await.db()?;
        let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in &rows {
            let post_id: Uuid = row.try_get("post_id").db()?;
            grouped.entry(post_id).or_default().push(row.try_get("user_id").db()?);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl PostRepo for SqliteStore {
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query("SELECT id, author_id, content, image, created_at FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .db()?;
        row.as_ref().map(post_from_row).transpose().db()
    }

    async fn create_post(&self, post: NewPost) -> Result<Post> {
        let created = Post {
            id: Uuid::now_v7(),
            author_id: post.author_id,
            content: post.content,
            image: post.image,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO posts (id, author_id, content, image, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(created.id)
            .bind(created.author_id)
            .bind(&created.content)
            .bind(&created.image)
            .bind(created.created_at)
            .execute(self.pool())
            .await
            .db()?;

        Ok(created)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        // Comments, likes and notifications go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM posts WHERE id = ?").bind(id).execute(self.pool()).await.db()?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<PostDetails>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT p.id, p.author_id, p.content, p.image, p.created_at, \
               u.username AS author_username, u.name AS author_name, u.image AS author_image \
             FROM posts p JOIN users u ON u.id = p.author_id",
        );
        match filter {
            PostFilter::All => {}
            PostFilter::Author(author_id) => {
                builder.push(" WHERE p.author_id = ").push_bind(author_id);
            }
            PostFilter::LikedBy(user_id) => {
                builder.push(" WHERE p.id IN (SELECT post_id FROM likes WHERE user_id = ").push_bind(user_id).push(")");
            }
        }
        builder.push(" ORDER BY p.created_at DESC, p.id DESC");

        let rows = builder.build().fetch_all(self.pool()).await.db()?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::with_capacity(rows.len());
        for row in &rows {
            let post = post_from_row(row).db()?;
            let author = summary_from_row(row, "author").db()?;
            posts.push((post, author));
        }

        let ids: Vec<Uuid> = posts.iter().map(|(post, _)| post.id).collect();
        let mut comments = self.comments_for(&ids).await?;
        let mut likes = self.likes_for(&ids).await?;

        Ok(posts
            .into_iter()
            .map(|(post, author)| {
                let comments = comments.remove(&post.id).unwrap_or_default();
                let liked_by = likes.remove(&post.id).unwrap_or_default();
                let counts = PostCounts { likes: liked_by.len() as i64, comments: comments.len() as i64 };
                PostDetails { post, author, comments, liked_by, counts }
            })
            .collect())
    }
}
