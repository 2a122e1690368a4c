//! Scripted remote-service double

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use ebb_core::{EbbError, EbbResult, GoalId, TodoId, WorkspaceId};
use ebb_remote::{
    CreatedGoal, CreatedTodo, CreatedWorkspace, NewGoal, NewTodo, RemoteService, TodoPatch,
};
use parking_lot::Mutex;
use tokio::sync::Notify;

/// One scripted reply, consumed per call in FIFO order.
///
/// When the script runs dry every call succeeds; creation calls then receive
/// an auto-generated server id.
#[derive(Clone, Debug)]
pub enum Reply {
    /// Confirm; creation kinds get an auto-generated server id
    Ok,
    /// Confirm a creation with this server id
    Created(String),
    /// Confirm a creation without an identifier (malformed reply)
    CreatedWithoutId,
    /// Call completes but the service refuses the operation
    Rejected,
    /// Transport failure
    Unreachable,
}

/// Log entry for one observed call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteCall {
    CreateWorkspace { temp_id: WorkspaceId, name: String },
    UpdateWorkspace { id: WorkspaceId, updated_name: String },
    DeleteWorkspace { id: WorkspaceId },
    CreateTodo { temp_id: TodoId, workspace_id: WorkspaceId },
    ToggleTodo { id: TodoId, completed: bool },
    UpdateTodo { id: TodoId },
    DeleteTodo { id: TodoId },
    AddGoal { temp_id: GoalId, workspace_id: WorkspaceId },
    IncrementGoal { goal_id: GoalId, magnitude: u32 },
    DecrementGoal { goal_id: GoalId, magnitude: u32 },
}

/// Remote service double driven by a queued script
#[derive(Default)]
pub struct ScriptedRemote {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<RemoteCall>>,
    next_auto_id: Mutex<u64>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        ScriptedRemote::default()
    }

    /// Queue one reply
    pub fn script(&self, reply: Reply) {
        self.replies.lock().push_back(reply);
    }

    /// Queue several replies in order
    pub fn script_all(&self, replies: impl IntoIterator<Item = Reply>) {
        self.replies.lock().extend(replies);
    }

    /// Hold every subsequent call open until the returned gate is notified
    pub fn hold_calls(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// All calls observed so far, in order
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    async fn observe(&self, call: RemoteCall) {
        self.calls.lock().push(call);
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn next_reply(&self) -> Reply {
        self.replies.lock().pop_front().unwrap_or(Reply::Ok)
    }

    fn auto_id(&self, prefix: &str) -> String {
        let mut next = self.next_auto_id.lock();
        *next += 1;
        format!("srv-{prefix}-{next}")
    }

    fn confirm(&self, operation: &'static str) -> EbbResult<()> {
        match self.next_reply() {
            Reply::Ok | Reply::Created(_) | Reply::CreatedWithoutId => Ok(()),
            Reply::Rejected => Err(EbbError::Rejected {
                operation,
                discriminant: Some("false".into()),
            }),
            Reply::Unreachable => Err(EbbError::Transport("scripted outage".into())),
        }
    }

    fn confirm_created(&self, operation: &'static str, prefix: &str) -> EbbResult<String> {
        match self.next_reply() {
            Reply::Created(id) => Ok(id),
            Reply::Ok => Ok(self.auto_id(prefix)),
            Reply::CreatedWithoutId => Err(EbbError::MalformedResponse {
                operation,
                field: "_id",
            }),
            Reply::Rejected => Err(EbbError::Rejected {
                operation,
                discriminant: Some("false".into()),
            }),
            Reply::Unreachable => Err(EbbError::Transport("scripted outage".into())),
        }
    }
}

#[async_trait]
impl RemoteService for ScriptedRemote {
    async fn create_workspace(
        &self,
        temp_id: &WorkspaceId,
        name: &str,
    ) -> EbbResult<CreatedWorkspace> {
        self.observe(RemoteCall::CreateWorkspace {
            temp_id: temp_id.clone(),
            name: name.to_string(),
        })
        .await;
        let id = self.confirm_created("CREATE_WORKSPACE", "ws")?;
        Ok(CreatedWorkspace {
            workspace_id: WorkspaceId::new(id),
        })
    }

    async fn update_workspace(&self, id: &WorkspaceId, updated_name: &str) -> EbbResult<()> {
        self.observe(RemoteCall::UpdateWorkspace {
            id: id.clone(),
            updated_name: updated_name.to_string(),
        })
        .await;
        self.confirm("UPDATE_WORKSPACE")
    }

    async fn delete_workspace(&self, id: &WorkspaceId) -> EbbResult<()> {
        self.observe(RemoteCall::DeleteWorkspace { id: id.clone() }).await;
        self.confirm("DELETE_WORKSPACE")
    }

    async fn create_todo(&self, todo: &NewTodo) -> EbbResult<CreatedTodo> {
        self.observe(RemoteCall::CreateTodo {
            temp_id: todo.temp_id.clone(),
            workspace_id: todo.workspace_id.clone(),
        })
        .await;
        let id = self.confirm_created("CREATE_TODO", "todo")?;
        Ok(CreatedTodo {
            todo_id: TodoId::new(id),
        })
    }

    async fn toggle_todo(
        &self,
        id: &TodoId,
        _workspace_id: &WorkspaceId,
        completed: bool,
    ) -> EbbResult<()> {
        self.observe(RemoteCall::ToggleTodo {
            id: id.clone(),
            completed,
        })
        .await;
        self.confirm("TOGGLE_TODO")
    }

    async fn update_todo(&self, todo: &TodoPatch) -> EbbResult<()> {
        self.observe(RemoteCall::UpdateTodo { id: todo.id.clone() }).await;
        self.confirm("UPDATE_TODO")
    }

    async fn delete_todo(&self, id: &TodoId, _workspace_id: &WorkspaceId) -> EbbResult<()> {
        self.observe(RemoteCall::DeleteTodo { id: id.clone() }).await;
        self.confirm("DELETE_TODO")
    }

    async fn add_goal(&self, goal: &NewGoal) -> EbbResult<CreatedGoal> {
        self.observe(RemoteCall::AddGoal {
            temp_id: goal.temp_id.clone(),
            workspace_id: goal.workspace_id.clone(),
        })
        .await;
        let id = self.confirm_created("ADD_GOAL", "goal")?;
        Ok(CreatedGoal {
            goal_id: GoalId::new(id),
        })
    }

    async fn increment_goal(&self, goal_id: &GoalId, magnitude: u32) -> EbbResult<()> {
        self.observe(RemoteCall::IncrementGoal {
            goal_id: goal_id.clone(),
            magnitude,
        })
        .await;
        self.confirm("INCREAMENT_GOAL")
    }

    async fn decrement_goal(&self, goal_id: &GoalId, magnitude: u32) -> EbbResult<()> {
        self.observe(RemoteCall::DecrementGoal {
            goal_id: goal_id.clone(),
            magnitude,
        })
        .await;
        self.confirm("DECREAMENT_GOAL")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_is_consumed_in_order() {
        let remote = ScriptedRemote::new();
        remote.script_all([Reply::Unreachable, Reply::Ok]);

        let goal = GoalId::new("g-1");
        assert!(remote.increment_goal(&goal, 1).await.is_err());
        assert!(remote.increment_goal(&goal, 1).await.is_ok());
        assert_eq!(remote.call_count(), 2);
    }

    #[tokio::test]
    async fn test_dry_script_defaults_to_success() {
        let remote = ScriptedRemote::new();
        let created = remote
            .create_workspace(&WorkspaceId::temp(), "Personal")
            .await
            .unwrap();
        assert!(!created.workspace_id.is_temp());
    }

    #[tokio::test]
    async fn test_created_without_id_is_malformed() {
        let remote = ScriptedRemote::new();
        remote.script(Reply::CreatedWithoutId);
        let err = remote
            .create_todo(&NewTodo {
                temp_id: TodoId::temp(),
                workspace_id: WorkspaceId::new("w-1"),
                text: "task".into(),
                priority: ebb_core::Priority::Medium,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EbbError::MalformedResponse { .. }));
    }
}
