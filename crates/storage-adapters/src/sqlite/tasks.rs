use async_trait::async_trait;
use domains::{Result, Task, TaskRepo};
use sqlx::Row;

use super::{DbResultExt, SqliteStore};

#[async_trait]
impl TaskRepo for SqliteStore {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let rows = sqlx::query("SELECT id, title, completed FROM tasks ORDER BY id")
            .fetch_all(self.pool())
            .await
            .db()?;

        rows.iter()
            .map(|row| {
                Ok(Task {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    completed: row.try_get("completed")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .db()
    }

    async fn create_task(&self, title: &str) -> Result<Task> {
        let result = sqlx::query("INSERT INTO tasks (title, completed) VALUES (?, 0)")
            .bind(title)
            .execute(self.pool())
            .await
            .db()?;

        Ok(Task { id: result.last_insert_rowid(), title: title.to_string(), completed: false })
    }

    async fn delete_task(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?").bind(id).execute(self.pool()).await.db()?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;

    #[tokio::test]
    async fn test_seeded_tasks() {
        let store = fixtures::store().await;
        let tasks = store.list_tasks().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].completed);
        assert!(!tasks[1].completed);
    }

    #[tokio::test]
    async fn test_create_then_delete() {
        let store = fixtures::store().await;
        let task = store.create_task("Ship it").await.unwrap();
        assert!(task.id > 2);
        assert!(!task.completed);
        assert_eq!(store.list_tasks().await.unwrap().len(), 3);

        assert!(store.delete_task(task.id).await.unwrap());
        assert!(!store.delete_task(task.id).await.unwrap());
        assert_eq!(store.list_tasks().await.unwrap().len(), 2);
    }
}
