//! Remote service contract
//!
//! One call per operation kind. Creation calls return the server-issued
//! identifier; everything else is a bare confirmation. Failure surfaces as
//! `EbbError::Transport`, `EbbError::Rejected`, or
//! `EbbError::MalformedResponse` - the engine treats all three identically
//! for retry-budget purposes.

use async_trait::async_trait;
use ebb_core::{EbbResult, GoalId, Priority, TodoId, WorkspaceId};

/// Payload for a to-do created while offline
#[derive(Clone, Debug)]
pub struct NewTodo {
    pub temp_id: TodoId,
    pub workspace_id: WorkspaceId,
    pub text: String,
    pub priority: Priority,
}

/// Payload for a to-do text/priority update
#[derive(Clone, Debug)]
pub struct TodoPatch {
    pub id: TodoId,
    pub workspace_id: WorkspaceId,
    pub text: String,
    pub priority: Priority,
}

/// Payload for a goal created while offline
#[derive(Clone, Debug)]
pub struct NewGoal {
    pub temp_id: GoalId,
    pub workspace_id: WorkspaceId,
    pub title: String,
    pub target: i64,
}

/// Server-issued identifier for a confirmed workspace creation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedWorkspace {
    pub workspace_id: WorkspaceId,
}

/// Server-issued identifier for a confirmed to-do creation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedTodo {
    pub todo_id: TodoId,
}

/// Server-issued identifier for a confirmed goal creation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedGoal {
    pub goal_id: GoalId,
}

/// The authoritative remote service, one async call per operation kind
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn create_workspace(
        &self,
        temp_id: &WorkspaceId,
        name: &str,
    ) -> EbbResult<CreatedWorkspace>;

    async fn update_workspace(&self, id: &WorkspaceId, updated_name: &str) -> EbbResult<()>;

    async fn delete_workspace(&self, id: &WorkspaceId) -> EbbResult<()>;

    async fn create_todo(&self, todo: &NewTodo) -> EbbResult<CreatedTodo>;

    async fn toggle_todo(
        &self,
        id: &TodoId,
        workspace_id: &WorkspaceId,
        completed: bool,
    ) -> EbbResult<()>;

    async fn update_todo(&self, todo: &TodoPatch) -> EbbResult<()>;

    async fn delete_todo(&self, id: &TodoId, workspace_id: &WorkspaceId) -> EbbResult<()>;

    async fn add_goal(&self, goal: &NewGoal) -> EbbResult<CreatedGoal>;

    /// Apply a coalesced increment; `magnitude` is the aggregate delta
    async fn increment_goal(&self, goal_id: &GoalId, magnitude: u32) -> EbbResult<()>;

    /// Apply a coalesced decrement; `magnitude` is the aggregate delta
    async fn decrement_goal(&self, goal_id: &GoalId, magnitude: u32) -> EbbResult<()>;
}
