//! Operation records - durable entries in the offline mutation queue
//!
//! Each record captures one not-yet-confirmed local mutation: the operation
//! (kind + payload) together with its queue bookkeeping. Records are created
//! by the local mutation path, mutated only by the reconciliation engine, and
//! destroyed on confirmed success or on retry-budget exhaustion.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::{GoalId, Priority, RecordId, TodoId, WorkspaceId};

/// Attempts after which a record is abandoned
pub const RETRY_LIMIT: u32 = 3;

/// One queued mutation, one variant per operation kind.
///
/// The serialized kind tags keep the remote service's historical spellings
/// (`INCREAMENT_GOAL` / `DECREAMENT_GOAL`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum Operation {
    #[serde(rename = "CREATE_WORKSPACE", rename_all = "camelCase")]
    CreateWorkspace { temp_id: WorkspaceId, name: String },

    #[serde(rename = "UPDATE_WORKSPACE", rename_all = "camelCase")]
    UpdateWorkspace { id: WorkspaceId, updated_name: String },

    #[serde(rename = "DELETE_WORKSPACE", rename_all = "camelCase")]
    DeleteWorkspace { id: WorkspaceId },

    #[serde(rename = "CREATE_TODO", rename_all = "camelCase")]
    CreateTodo {
        temp_id: TodoId,
        workspace_id: WorkspaceId,
        text: String,
        priority: Priority,
    },

    #[serde(rename = "TOGGLE_TODO", rename_all = "camelCase")]
    ToggleTodo {
        id: TodoId,
        workspace_id: WorkspaceId,
        completed: bool,
    },

    #[serde(rename = "UPDATE_TODO", rename_all = "camelCase")]
    UpdateTodo {
        id: TodoId,
        workspace_id: WorkspaceId,
        text: String,
        priority: Priority,
    },

    #[serde(rename = "DELETE_TODO", rename_all = "camelCase")]
    DeleteTodo { id: TodoId, workspace_id: WorkspaceId },

    #[serde(rename = "ADD_GOAL", rename_all = "camelCase")]
    AddGoal {
        temp_id: GoalId,
        workspace_id: WorkspaceId,
        title: String,
        target: i64,
    },

    #[serde(rename = "INCREAMENT_GOAL", rename_all = "camelCase")]
    IncrementGoal { goal_id: GoalId },

    #[serde(rename = "DECREAMENT_GOAL", rename_all = "camelCase")]
    DecrementGoal { goal_id: GoalId },
}

impl Operation {
    /// The serialized kind tag, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::CreateWorkspace { .. } => "CREATE_WORKSPACE",
            Operation::UpdateWorkspace { .. } => "UPDATE_WORKSPACE",
            Operation::DeleteWorkspace { .. } => "DELETE_WORKSPACE",
            Operation::CreateTodo { .. } => "CREATE_TODO",
            Operation::ToggleTodo { .. } => "TOGGLE_TODO",
            Operation::UpdateTodo { .. } => "UPDATE_TODO",
            Operation::DeleteTodo { .. } => "DELETE_TODO",
            Operation::AddGoal { .. } => "ADD_GOAL",
            Operation::IncrementGoal { .. } => "INCREAMENT_GOAL",
            Operation::DecrementGoal { .. } => "DECREAMENT_GOAL",
        }
    }
}

/// Queue status of a record.
///
/// There is deliberately no `Success` variant: success causes immediate
/// removal, so a successful record is never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    #[default]
    Pending,
    Failed,
}

/// A durable operation record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub op: Operation,
    pub status: RecordStatus,
    pub retry_count: u32,
    pub created_at_ms: i64,
}

impl OperationRecord {
    /// Create a fresh pending record for an operation
    pub fn new(op: Operation) -> Self {
        OperationRecord {
            id: RecordId::generate(),
            op,
            status: RecordStatus::Pending,
            retry_count: 0,
            created_at_ms: unix_millis(),
        }
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = id;
        self
    }

    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }
}

fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_keep_remote_spelling() {
        let op = Operation::IncrementGoal {
            goal_id: GoalId::new("g-1"),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["kind"], "INCREAMENT_GOAL");

        let op = Operation::DecrementGoal {
            goal_id: GoalId::new("g-1"),
        };
        assert_eq!(op.kind(), "DECREAMENT_GOAL");
    }

    #[test]
    fn test_payload_fields_are_camel_case() {
        let op = Operation::CreateWorkspace {
            temp_id: WorkspaceId::new("tmp-ws-1"),
            name: "Personal".into(),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["payload"]["tempId"], "tmp-ws-1");
        assert_eq!(json["payload"]["name"], "Personal");
    }

    #[test]
    fn test_record_roundtrip() {
        let record = OperationRecord::new(Operation::ToggleTodo {
            id: TodoId::new("t-1"),
            workspace_id: WorkspaceId::new("w-1"),
            completed: true,
        })
        .with_retry_count(2);

        let json = serde_json::to_string(&record).unwrap();
        let back: OperationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_new_record_is_pending_with_zero_retries() {
        let record = OperationRecord::new(Operation::DeleteWorkspace {
            id: WorkspaceId::new("w-1"),
        });
        assert_eq!(record.status, RecordStatus::Pending);
        assert_eq!(record.retry_count, 0);
        assert!(record.created_at_ms > 0);
    }
}
