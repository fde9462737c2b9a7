/// Task service: mutate, re-read, publish
///
/// The task directory owns every task mutation. Each state-changing
/// operation follows the same contract:
///
/// 1. persist the change
/// 2. re-read the joined projection
/// 3. publish the corresponding event to all live connections
///
/// The re-read after write ensures broadcast payloads always carry
/// denormalized creator/assignee names rather than raw foreign keys, at
/// the cost of an extra read per mutation. A failed persist step never
/// reaches the publish step.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::tasks::TaskService;
/// use taskboard_shared::models::task::NewTask;
/// use taskboard_shared::realtime::{broadcast::EventBroadcaster, registry::ConnectionRegistry};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let broadcaster = EventBroadcaster::new(ConnectionRegistry::new());
/// let tasks = TaskService::new(pool, broadcaster);
///
/// let task = tasks.create(NewTask {
///     title: "Write spec".to_string(),
///     description: None,
///     assigned_to: None,
/// }, 1).await?;
/// # Ok(())
/// # }
/// ```

use crate::events::BoardEvent;
use crate::models::task::{NewTask, Task, TaskStatus, TaskWithUsers};
use crate::realtime::broadcast::EventBroadcaster;
use sqlx::PgPool;
use tracing::info;

/// Error type for task directory operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Input failed validation (user-correctable)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Referenced task does not exist (user-correctable)
    #[error("Task {0} not found")]
    NotFound(i64),

    /// Storage failure (not user-correctable)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Task directory over the persistent store and the broadcast dispatcher
///
/// Cheap to clone; clones share the pool and the dispatcher.
#[derive(Debug, Clone)]
pub struct TaskService {
    db: PgPool,
    broadcaster: EventBroadcaster,
}

impl TaskService {
    /// Creates a task service
    pub fn new(db: PgPool, broadcaster: EventBroadcaster) -> Self {
        Self { db, broadcaster }
    }

    /// Lists all tasks with denormalized user summaries, newest first
    pub async fn list_all(&self) -> Result<Vec<TaskWithUsers>, TaskError> {
        Ok(Task::list_with_users(&self.db).await?)
    }

    /// Creates a task and announces it
    ///
    /// The new task starts in `TODO` status. Publishes `TASK_CREATED`
    /// with the full joined projection.
    ///
    /// # Errors
    ///
    /// - `TaskError::Validation` if the title is empty
    /// - `TaskError::Database` on storage failure (nothing is published)
    pub async fn create(&self, data: NewTask, created_by: i64) -> Result<TaskWithUsers, TaskError> {
        if data.title.trim().is_empty() {
            return Err(TaskError::Validation("title must not be empty".to_string()));
        }

        let id = Task::insert(&self.db, data, created_by).await?;

        let task = Task::find_with_users(&self.db, id)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        info!(task_id = id, created_by, "Task created");
        self.broadcaster
            .publish(&BoardEvent::TaskCreated(task.clone()))
            .await;

        Ok(task)
    }

    /// Updates a task's status and announces the change
    ///
    /// Status validity is the boundary's concern; this method accepts
    /// any [`TaskStatus`]. Publishes `TASK_UPDATED` with the re-read
    /// projection.
    ///
    /// # Errors
    ///
    /// - `TaskError::NotFound` if the id does not resolve
    /// - `TaskError::Database` on storage failure (nothing is published)
    pub async fn set_status(
        &self,
        task_id: i64,
        status: TaskStatus,
    ) -> Result<TaskWithUsers, TaskError> {
        Task::update_status(&self.db, task_id, status).await?;

        let task = Task::find_with_users(&self.db, task_id)
            .await?
            .ok_or(TaskError::NotFound(task_id))?;

        info!(task_id, status = status.as_str(), "Task status updated");
        self.broadcaster
            .publish(&BoardEvent::TaskUpdated(task.clone()))
            .await;

        Ok(task)
    }

    /// Deletes a task and announces the deletion
    ///
    /// Publishes `TASK_DELETED` carrying only the id; consumers must
    /// treat this payload shape differently from create/update.
    ///
    /// # Errors
    ///
    /// - `TaskError::NotFound` if the id does not exist (nothing is published)
    /// - `TaskError::Database` on storage failure (nothing is published)
    pub async fn remove(&self, task_id: i64) -> Result<(), TaskError> {
        let deleted = Task::delete(&self.db, task_id).await?;

        if !deleted {
            return Err(TaskError::NotFound(task_id));
        }

        info!(task_id, "Task deleted");
        self.broadcaster
            .publish(&BoardEvent::TaskDeleted { id: task_id })
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::registry::ConnectionRegistry;

    fn service_without_db() -> TaskService {
        // Lazy pool: no connection is attempted until a query runs.
        let pool = PgPool::connect_lazy("postgresql://localhost/unreachable")
            .expect("lazy pool construction cannot fail");
        TaskService::new(pool, EventBroadcaster::new(ConnectionRegistry::new()))
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title_before_touching_storage() {
        let service = service_without_db();

        let result = service
            .create(
                NewTask {
                    title: "   ".to_string(),
                    description: None,
                    assigned_to: None,
                },
                1,
            )
            .await;

        assert!(matches!(result, Err(TaskError::Validation(_))));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(TaskError::NotFound(42).to_string(), "Task 42 not found");
        assert_eq!(
            TaskError::Validation("title must not be empty".to_string()).to_string(),
            "Validation failed: title must not be empty"
        );
    }

    // The persist → re-read → publish path is covered end to end by the
    // API integration tests; broadcast behavior on its own is covered in
    // realtime::broadcast.
}
