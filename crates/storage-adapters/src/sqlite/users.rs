use async_trait::async_trait;
use chrono::Utc;
use domains::{
    DomainError, FollowerCount, NewUser, ProfileCounts, ProfileUpdate, Result, SuggestedUser, User, UserRepo,
    UserSummary,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{DbResultExt, SqliteStore};

const USER_COLUMNS: &str = "id, external_id, username, email, name, bio, image, location, website, created_at";

fn user_from_row(row: &SqliteRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        external_id: row.try_get("external_id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        bio: row.try_get("bio")?,
        image: row.try_get("image")?,
        location: row.try_get("location")?,
        website: row.try_get("website")?,
        created_at: row.try_get("created_at")?,
    })
}

impl SqliteStore {
    async fn find_user_where(&self, column: &str, value: impl ToString) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?");
        let row = sqlx::query(&sql).bind(value.to_string()).fetch_optional(self.pool()).await.db()?;
        row.as_ref().map(user_from_row).transpose().db()
    }
}

#[async_trait]
impl UserRepo for SqliteStore {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = sqlx::query(&sql).bind(id).fetch_optional(self.pool()).await.db()?;
        row.as_ref().map(user_from_row).transpose().db()
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        self.find_user_where("external_id", external_id).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_user_where("username", username).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_user_where("email", email).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let created = User {
            id: Uuid::now_v7(),
            external_id: user.external_id,
            username: user.username,
            email: user.email,
            name: user.name,
            bio: None,
            image: user.image,
            location: None,
            website: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO users (id, external_id, username, email, name, image, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(created.id)
        .bind(&created.external_id)
        .bind(&created.username)
        .bind(&created.email)
        .bind(&created.name)
        .bind(&created.image)
        .bind(created.created_at)
        .execute(self.pool())
        .await
        .db()?;

        Ok(created)
    }

    async fn profile_counts(&self, user_id: Uuid) -> Result<ProfileCounts> {
        let row = sqlx::query(
            "SELECT \
               (SELECT COUNT(*) FROM posts WHERE author_id = ?) AS posts, \
               (SELECT COUNT(*) FROM follows WHERE following_id = ?) AS followers, \
               (SELECT COUNT(*) FROM follows WHERE follower_id = ?) AS following",
        )
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_one(self.pool())
        .await
        .db()?;

        Ok(ProfileCounts {
            posts: row.try_get("posts").db()?,
            followers: row.try_get("followers").db()?,
            following: row.try_get("following").db()?,
        })
    }

    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<User> {
        // NULL binds keep the column; an empty string clears it.
        let sql = format!(
            "UPDATE users SET \
               name = NULLIF(COALESCE(?, name), ''), \
               bio = NULLIF(COALESCE(?, bio), ''), \
               location = NULLIF(COALESCE(?, location), ''), \
               website = NULLIF(COALESCE(?, website), '') \
             WHERE id = ? RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(update.name)
            .bind(update.bio)
            .bind(update.location)
            .bind(update.website)
            .bind(user_id)
            .fetch_optional(self.pool())
            .await
            .db()?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        user_from_row(&row).db()
    }

    async fn suggested_users(&self, user_id: Uuid, limit: i64) -> Result<Vec<SuggestedUser>> {
        let rows = sqlx::query(
            "SELECT u.id, u.username, u.name, u.image, \
               (SELECT COUNT(*) FROM follows f WHERE f.following_id = u.id) AS followers \
             FROM users u \
             WHERE u.id <> ? \
               AND u.id NOT IN (SELECT following_id FROM follows WHERE follower_id = ?) \
             ORDER BY RANDOM() \
             LIMIT ?",
        )
        .bind(user_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .db()?;

        rows.iter()
            .map(|row| {
                Ok(SuggestedUser {
                    user: UserSummary {
                        id: row.try_get("id")?,
                        username: row.try_get("username")?,
                        name: row.try_get("name")?,
                        image: row.try_get("image")?,
                    },
                    counts: FollowerCount { followers: row.try_get("followers")? },
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .db()
    }
}
