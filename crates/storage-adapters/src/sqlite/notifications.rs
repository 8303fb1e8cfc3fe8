use async_trait::async_trait;
use domains::{
    Notification, NotificationComment, NotificationDetails, NotificationKind, NotificationPost, NotificationRepo,
    Result,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use super::{summary_from_row, DbResultExt, SqliteStore};

fn details_from_row(row: &SqliteRow) -> std::result::Result<NotificationDetails, sqlx::Error> {
    let kind: String = row.try_get("type")?;
    let kind = kind
        .parse::<NotificationKind>()
        .map_err(|err| sqlx::Error::Decode(err.to_string().into()))?;

    let notification = Notification {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        creator_id: row.try_get("creator_id")?,
        kind,
        post_id: row.try_get("post_id")?,
        comment_id: row.try_get("comment_id")?,
        read: row.try_get("read")?,
        created_at: row.try_get("created_at")?,
    };

    let post = match row.try_get::<Option<Uuid>, _>("post_ref")? {
        Some(id) => Some(NotificationPost {
            id,
            content: row.try_get("post_content")?,
            image: row.try_get("post_image")?,
        }),
        None => None,
    };

    let comment = match row.try_get::<Option<Uuid>, _>("comment_ref")? {
        Some(id) => Some(NotificationComment {
            id,
            content: row.try_get("comment_content")?,
            created_at: row.try_get("comment_created_at")?,
        }),
        None => None,
    };

    Ok(NotificationDetails { notification, creator: summary_from_row(row, "creator")?, post, comment })
}

#[async_trait]
impl NotificationRepo for SqliteStore {
    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<NotificationDetails>> {
        let rows = sqlx::query(
            "SELECT n.id, n.user_id, n.creator_id, n.type, n.post_id, n.comment_id, n.read, n.created_at, \
               u.username AS creator_username, u.name AS creator_name, u.image AS creator_image, \
               p.id AS post_ref, p.content AS post_content, p.image AS post_image, \
               c.id AS comment_ref, c.content AS comment_content, c.created_at AS comment_created_at \
             FROM notifications n \
             JOIN users u ON u.id = n.creator_id \
             LEFT JOIN posts p ON p.id = n.post_id \
             LEFT JOIN comments c ON c.id = n.comment_id \
             WHERE n.user_id = ? \
             ORDER BY n.created_at DESC, n.id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .db()?;

        rows.iter().map(details_from_row).collect::<std::result::Result<Vec<_>, _>>().db()
    }

    async fn mark_read(&self, user_id: Uuid, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        // The recipient filter keeps one user from touching another's inbox.
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE notifications SET read = 1 WHERE user_id = ");
        builder.push_bind(user_id).push(" AND id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(self.pool()).await.db()?;
        Ok(result.rows_affected())
    }
}
