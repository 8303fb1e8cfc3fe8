//! The task list resource.

use std::sync::Arc;

use domains::{DomainError, Result, Task, TaskRepo};
use tracing::info;

pub struct TaskService {
    tasks: Arc<dyn TaskRepo>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepo>) -> Self {
        Self { tasks }
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.tasks.list_tasks().await
    }

    pub async fn create_task(&self, title: Option<&str>) -> Result<Task> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DomainError::validation("Title is required"))?;
        let task = self.tasks.create_task(title).await?;
        info!(task_id = task.id, "task created");
        Ok(task)
    }

    /// `id` is the raw query value. Ids that do not parse cannot exist and
    /// are reported as not found.
    pub async fn delete_task(&self, id: Option<&str>) -> Result<()> {
        let raw = id
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .ok_or_else(|| DomainError::validation("Task ID is required"))?;
        let id: i64 = raw.parse().map_err(|_| DomainError::not_found("Task", raw))?;

        if !self.tasks.delete_task(id).await? {
            return Err(DomainError::not_found("Task", id));
        }
        info!(task_id = id, "task deleted");
        Ok(())
    }
}
