/// Domain events broadcast to live connections
///
/// Every broadcast payload is a JSON object with exactly two top-level
/// fields: `type` (the event-type string) and `payload`. Create and
/// update events carry the full joined task projection; delete events
/// carry only the task ID, so consumers must treat that payload shape
/// differently.
///
/// # Wire Format
///
/// ```json
/// {"type": "TASK_CREATED", "payload": {"id": 1, "title": "Write spec", ...}}
/// {"type": "TASK_UPDATED", "payload": {"id": 1, "title": "Write spec", ...}}
/// {"type": "TASK_DELETED", "payload": {"id": 42}}
/// ```

use crate::models::task::TaskWithUsers;
use serde::{Deserialize, Serialize};

/// Task lifecycle notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum BoardEvent {
    /// A task was created; carries the full task snapshot
    #[serde(rename = "TASK_CREATED")]
    TaskCreated(TaskWithUsers),

    /// A task changed; carries the full task snapshot
    #[serde(rename = "TASK_UPDATED")]
    TaskUpdated(TaskWithUsers),

    /// A task was deleted; carries only the deletion reference
    #[serde(rename = "TASK_DELETED")]
    TaskDeleted {
        /// ID of the deleted task
        id: i64,
    },
}

impl BoardEvent {
    /// Returns the wire-level event-type string
    pub fn event_type(&self) -> &'static str {
        match self {
            BoardEvent::TaskCreated(_) => "TASK_CREATED",
            BoardEvent::TaskUpdated(_) => "TASK_UPDATED",
            BoardEvent::TaskDeleted { .. } => "TASK_DELETED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus;
    use crate::models::user::UserSummary;
    use chrono::Utc;

    fn sample_task() -> TaskWithUsers {
        TaskWithUsers {
            id: 1,
            title: "Write spec".to_string(),
            description: None,
            status: TaskStatus::Todo,
            assigned_to: None,
            created_by: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            assignee: None,
            creator: UserSummary {
                id: 2,
                name: "Sam".to_string(),
                profile_image: None,
            },
        }
    }

    #[test]
    fn test_created_event_shape() {
        let event = BoardEvent::TaskCreated(sample_task());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "TASK_CREATED");
        assert_eq!(json["payload"]["title"], "Write spec");
        assert_eq!(json["payload"]["status"], "TODO");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_deleted_event_carries_id_only() {
        let event = BoardEvent::TaskDeleted { id: 42 };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "TASK_DELETED");
        assert_eq!(json["payload"], serde_json::json!({ "id": 42 }));
    }

    #[test]
    fn test_event_type_strings() {
        assert_eq!(
            BoardEvent::TaskCreated(sample_task()).event_type(),
            "TASK_CREATED"
        );
        assert_eq!(
            BoardEvent::TaskUpdated(sample_task()).event_type(),
            "TASK_UPDATED"
        );
        assert_eq!(BoardEvent::TaskDeleted { id: 1 }.event_type(), "TASK_DELETED");
    }
}
