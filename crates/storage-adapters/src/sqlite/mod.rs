//! # SQLite store
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `domains` models. Every multi-row write (an edge plus its
//! notification, a comment plus its notification) runs in one transaction.

mod notifications;
mod posts;
mod social;
mod tasks;
mod users;

use std::str::FromStr;
use std::time::Duration;

use domains::{DomainError, NewNotification, UserSummary};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `url` and applies pending
    /// migrations.
    pub async fn open(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let in_memory = url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // An in-memory database lives and dies with its connection.
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?
        };

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// A fresh, migrated in-memory database.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        Self::open("sqlite::memory:", 1).await
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        MIGRATOR.run(&self.pool).await?;
        info!("database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Maps driver failures onto the domain taxonomy.
pub(crate) fn map_sqlx(err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::RowNotFound => DomainError::NotFound("row".to_string(), "unknown".to_string()),
        sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::Conflict(db.message().to_string()),
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            DomainError::NotFound("referenced row".to_string(), db.message().to_string())
        }
        _ => DomainError::Internal(err.to_string()),
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub(crate) trait DbResultExt<T> {
    fn db(self) -> domains::Result<T>;
}

impl<T> DbResultExt<T> for Result<T, sqlx::Error> {
    fn db(self) -> domains::Result<T> {
        self.map_err(map_sqlx)
    }
}

/// Reads a user summary from columns named `{prefix}_id`, `{prefix}_username`,
/// `{prefix}_name` and `{prefix}_image`.
pub(crate) fn summary_from_row(row: &SqliteRow, prefix: &str) -> Result<UserSummary, sqlx::Error> {
    Ok(UserSummary {
        id: row.try_get(format!("{prefix}_id").as_str())?,
        username: row.try_get(format!("{prefix}_username").as_str())?,
        name: row.try_get(format!("{prefix}_name").as_str())?,
        image: row.try_get(format!("{prefix}_image").as_str())?,
    })
}

pub(crate) async fn insert_notification(
    conn: &mut SqliteConnection,
    notification: &NewNotification,
    comment_id: Option<Uuid>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO notifications (id, user_id, creator_id, type, post_id, comment_id, read, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(Uuid::now_v7())
    .bind(notification.user_id)
    .bind(notification.creator_id)
    .bind(notification.kind.as_str())
    .bind(notification.post_id)
    .bind(comment_id.or(notification.comment_id))
    .bind(chrono::Utc::now())
    .execute(conn)
    .await?;
    Ok(())
}
