/// Task model and database operations
///
/// Tasks are the board's core entity. Reads always go through the
/// joined projection ([`TaskWithUsers`]) so responses and broadcast
/// payloads carry denormalized creator/assignee summaries instead of
/// raw foreign keys.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('TODO', 'IN_PROGRESS', 'DONE');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'TODO',
///     assigned_to BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     created_by BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{Task, NewTask, TaskStatus};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let id = Task::insert(&pool, NewTask {
///     title: "Write spec".to_string(),
///     description: None,
///     assigned_to: None,
/// }, 1).await?;
///
/// let task = Task::find_with_users(&pool, id).await?.unwrap();
/// assert_eq!(task.status, TaskStatus::Todo);
/// # Ok(())
/// # }
/// ```

use crate::models::user::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Task board column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Newly created, not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to its wire/database label
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            _ => Err(()),
        }
    }
}

/// Input for creating a new task
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    /// Task title (must be non-empty)
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional assignee user ID
    pub assigned_to: Option<i64>,
}

/// Task read projection with denormalized user summaries
///
/// This is the shape returned by list/create/update operations and
/// carried in `TASK_CREATED`/`TASK_UPDATED` broadcast payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskWithUsers {
    /// Unique task ID
    pub id: i64,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Current board column
    pub status: TaskStatus,

    /// Assignee user ID (null when unassigned)
    pub assigned_to: Option<i64>,

    /// Creator user ID
    pub created_by: i64,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// Denormalized assignee summary (null when unassigned)
    pub assignee: Option<UserSummary>,

    /// Denormalized creator summary
    pub creator: UserSummary,
}

/// Flat row produced by the joined projection query
#[derive(Debug, sqlx::FromRow)]
struct TaskUserRow {
    id: i64,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    assigned_to: Option<i64>,
    created_by: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    assignee_id: Option<i64>,
    assignee_name: Option<String>,
    assignee_image: Option<String>,
    creator_id: i64,
    creator_name: String,
    creator_image: Option<String>,
}

impl From<TaskUserRow> for TaskWithUsers {
    fn from(row: TaskUserRow) -> Self {
        let assignee = match (row.assignee_id, row.assignee_name) {
            (Some(id), Some(name)) => Some(UserSummary {
                id,
                name,
                profile_image: row.assignee_image,
            }),
            _ => None,
        };

        TaskWithUsers {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status,
            assigned_to: row.assigned_to,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            assignee,
            creator: UserSummary {
                id: row.creator_id,
                name: row.creator_name,
                profile_image: row.creator_image,
            },
        }
    }
}

/// Joined projection over tasks and both referenced users.
///
/// Creator is an inner join (always resolvable); assignee is a left
/// join (tasks with no assignee are a valid, queryable state).
const TASK_WITH_USERS: &str = r#"
    SELECT
        t.id, t.title, t.description, t.status, t.assigned_to, t.created_by,
        t.created_at, t.updated_at,
        a.id AS assignee_id, a.name AS assignee_name, a.profile_image AS assignee_image,
        c.id AS creator_id, c.name AS creator_name, c.profile_image AS creator_image
    FROM tasks t
    LEFT JOIN users a ON t.assigned_to = a.id
    JOIN users c ON t.created_by = c.id
"#;

/// Namespace for task queries
///
/// Tasks have no standalone row struct in the public API; every read
/// goes through [`TaskWithUsers`].
pub struct Task;

impl Task {
    /// Inserts a new task, returning its ID
    ///
    /// The row is created in `TODO` status with database-assigned
    /// timestamps. Callers re-read the joined projection afterwards.
    pub async fn insert(pool: &PgPool, data: NewTask, created_by: i64) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO tasks (title, description, assigned_to, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.assigned_to)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    /// Fetches one task through the joined projection
    pub async fn find_with_users(
        pool: &PgPool,
        id: i64,
    ) -> Result<Option<TaskWithUsers>, sqlx::Error> {
        let row = sqlx::query_as::<_, TaskUserRow>(&format!("{TASK_WITH_USERS} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(TaskWithUsers::from))
    }

    /// Lists all tasks through the joined projection, newest first
    pub async fn list_with_users(pool: &PgPool) -> Result<Vec<TaskWithUsers>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TaskUserRow>(&format!(
            "{TASK_WITH_USERS} ORDER BY t.created_at DESC"
        ))
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(TaskWithUsers::from).collect())
    }

    /// Updates a task's status
    ///
    /// Last write wins; there is no optimistic concurrency token.
    /// Returns whether any row was updated.
    pub async fn update_status(
        pool: &PgPool,
        id: i64,
        status: TaskStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE tasks SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a task, returning whether it existed
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "TODO");
        assert_eq!(TaskStatus::InProgress.as_str(), "IN_PROGRESS");
        assert_eq!(TaskStatus::Done.as_str(), "DONE");
    }

    #[test]
    fn test_task_status_serde_labels() {
        assert_eq!(serde_json::to_string(&TaskStatus::Todo).unwrap(), "\"TODO\"");
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );

        let status: TaskStatus = serde_json::from_str("\"DONE\"").unwrap();
        assert_eq!(status, TaskStatus::Done);
    }

    #[test]
    fn test_unknown_status_label_rejected() {
        let result = serde_json::from_str::<TaskStatus>("\"BLOCKED\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_task_status_from_str() {
        assert_eq!("TODO".parse::<TaskStatus>(), Ok(TaskStatus::Todo));
        assert_eq!("IN_PROGRESS".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("DONE".parse::<TaskStatus>(), Ok(TaskStatus::Done));
        assert!("todo".parse::<TaskStatus>().is_err());
        assert!("BLOCKED".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_projection_maps_absent_assignee_to_none() {
        let row = TaskUserRow {
            id: 1,
            title: "Write spec".to_string(),
            description: None,
            status: TaskStatus::Todo,
            assigned_to: None,
            created_by: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            assignee_id: None,
            assignee_name: None,
            assignee_image: None,
            creator_id: 2,
            creator_name: "Sam".to_string(),
            creator_image: None,
        };

        let task = TaskWithUsers::from(row);
        assert!(task.assignee.is_none());
        assert_eq!(task.creator.id, 2);
        assert_eq!(task.creator.name, "Sam");
    }

    #[test]
    fn test_projection_maps_assignee_summary() {
        let row = TaskUserRow {
            id: 1,
            title: "Review PR".to_string(),
            description: Some("left some comments".to_string()),
            status: TaskStatus::InProgress,
            assigned_to: Some(3),
            created_by: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            assignee_id: Some(3),
            assignee_name: Some("Alex".to_string()),
            assignee_image: Some("https://cdn.example.com/u3.jpg".to_string()),
            creator_id: 2,
            creator_name: "Sam".to_string(),
            creator_image: None,
        };

        let task = TaskWithUsers::from(row);
        let assignee = task.assignee.unwrap();
        assert_eq!(assignee.id, 3);
        assert_eq!(assignee.name, "Alex");
        assert!(assignee.profile_image.is_some());
    }
}
