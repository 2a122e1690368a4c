//! Local mutation path
//!
//! The instant a user action occurs it is applied optimistically to the
//! domain state store and recorded as a durable operation record. Created
//! entities carry a temporary id until reconciliation adopts the
//! server-issued one. The engine itself never creates records.

use std::sync::Arc;

use ebb_core::{
    EbbResult, Goal, GoalId, Operation, OperationRecord, Priority, Todo, TodoId, Workspace,
    WorkspaceId,
};
use ebb_store::{DomainStore, OperationStore};

/// Optimistic mutations paired with queue appends
pub struct LocalActions {
    domain: Arc<DomainStore>,
    ops: Arc<dyn OperationStore>,
}

impl LocalActions {
    pub fn new(domain: Arc<DomainStore>, ops: Arc<dyn OperationStore>) -> Self {
        LocalActions { domain, ops }
    }

    /// Create a workspace under a temporary id
    pub fn create_workspace(&self, name: &str) -> EbbResult<WorkspaceId> {
        let temp_id = WorkspaceId::temp();
        let ws = Workspace::new(temp_id.clone(), name);
        self.domain.update(|all| all.push(ws));
        self.ops
            .append(OperationRecord::new(Operation::CreateWorkspace {
                temp_id: temp_id.clone(),
                name: name.to_string(),
            }))?;
        Ok(temp_id)
    }

    /// Rename a workspace
    pub fn rename_workspace(&self, id: &WorkspaceId, name: &str) -> EbbResult<()> {
        self.domain.update(|all| {
            if let Some(ws) = all.iter_mut().find(|ws| &ws.id == id) {
                ws.name = name.to_string();
            }
        });
        self.domain.realign_current(id);
        self.ops
            .append(OperationRecord::new(Operation::UpdateWorkspace {
                id: id.clone(),
                updated_name: name.to_string(),
            }))
    }

    /// Delete a workspace.
    ///
    /// The entity is removed here, before the record is enqueued; the engine
    /// performs no further local action when the deletion is confirmed.
    pub fn delete_workspace(&self, id: &WorkspaceId) -> EbbResult<()> {
        let existed = self.domain.update(|all| {
            let before = all.len();
            all.retain(|ws| &ws.id != id);
            all.len() != before
        });
        if !existed {
            return Ok(());
        }
        if self.domain.current_is(id) {
            self.domain
                .set_current(self.domain.workspaces().into_iter().next());
        }
        self.ops
            .append(OperationRecord::new(Operation::DeleteWorkspace {
                id: id.clone(),
            }))
    }

    /// Add a to-do under a temporary id
    pub fn add_todo(
        &self,
        workspace_id: &WorkspaceId,
        text: &str,
        priority: Priority,
    ) -> EbbResult<TodoId> {
        let temp_id = TodoId::temp();
        self.domain.update(|all| {
            if let Some(ws) = all.iter_mut().find(|ws| &ws.id == workspace_id) {
                ws.todos.push(Todo::new(temp_id.clone(), text, priority));
            }
        });
        self.domain.realign_current(workspace_id);
        self.ops.append(OperationRecord::new(Operation::CreateTodo {
            temp_id: temp_id.clone(),
            workspace_id: workspace_id.clone(),
            text: text.to_string(),
            priority,
        }))?;
        Ok(temp_id)
    }

    /// Flip a to-do's completed flag
    pub fn toggle_todo(&self, workspace_id: &WorkspaceId, id: &TodoId) -> EbbResult<()> {
        let mut completed = None;
        self.domain.update(|all| {
            if let Some(ws) = all.iter_mut().find(|ws| &ws.id == workspace_id) {
                if let Some(todo) = ws.todo_mut(id) {
                    todo.completed = !todo.completed;
                    completed = Some(todo.completed);
                }
            }
        });
        self.domain.realign_current(workspace_id);
        if let Some(completed) = completed {
            self.ops.append(OperationRecord::new(Operation::ToggleTodo {
                id: id.clone(),
                workspace_id: workspace_id.clone(),
                completed,
            }))?;
        }
        Ok(())
    }

    /// Replace a to-do's text and priority
    pub fn update_todo(
        &self,
        workspace_id: &WorkspaceId,
        id: &TodoId,
        text: &str,
        priority: Priority,
    ) -> EbbResult<()> {
        let mut found = false;
        self.domain.update(|all| {
            if let Some(ws) = all.iter_mut().find(|ws| &ws.id == workspace_id) {
                if let Some(todo) = ws.todo_mut(id) {
                    todo.text = text.to_string();
                    todo.priority = priority;
                    found = true;
                }
            }
        });
        self.domain.realign_current(workspace_id);
        if found {
            self.ops.append(OperationRecord::new(Operation::UpdateTodo {
                id: id.clone(),
                workspace_id: workspace_id.clone(),
                text: text.to_string(),
                priority,
            }))?;
        }
        Ok(())
    }

    /// Delete a to-do (removed here, before the record is enqueued)
    pub fn delete_todo(&self, workspace_id: &WorkspaceId, id: &TodoId) -> EbbResult<()> {
        let mut existed = false;
        self.domain.update(|all| {
            if let Some(ws) = all.iter_mut().find(|ws| &ws.id == workspace_id) {
                let before = ws.todos.len();
                ws.todos.retain(|t| &t.id != id);
                existed = ws.todos.len() != before;
            }
        });
        self.domain.realign_current(workspace_id);
        if existed {
            self.ops.append(OperationRecord::new(Operation::DeleteTodo {
                id: id.clone(),
                workspace_id: workspace_id.clone(),
            }))?;
        }
        Ok(())
    }

    /// Add a goal under a temporary id
    pub fn add_goal(
        &self,
        workspace_id: &WorkspaceId,
        title: &str,
        target: i64,
    ) -> EbbResult<GoalId> {
        let temp_id = GoalId::temp();
        self.domain.update(|all| {
            if let Some(ws) = all.iter_mut().find(|ws| &ws.id == workspace_id) {
                ws.goals.push(Goal::new(temp_id.clone(), title, target));
            }
        });
        self.domain.realign_current(workspace_id);
        self.ops.append(OperationRecord::new(Operation::AddGoal {
            temp_id: temp_id.clone(),
            workspace_id: workspace_id.clone(),
            title: title.to_string(),
            target,
        }))?;
        Ok(temp_id)
    }

    /// Bump a goal's progress by one
    pub fn increment_goal(&self, workspace_id: &WorkspaceId, goal_id: &GoalId) -> EbbResult<()> {
        let mut found = false;
        self.domain.update(|all| {
            if let Some(ws) = all.iter_mut().find(|ws| &ws.id == workspace_id) {
                if let Some(goal) = ws.goal_mut(goal_id) {
                    goal.progress += 1;
                    found = true;
                }
            }
        });
        self.domain.realign_current(workspace_id);
        if found {
            self.ops
                .append(OperationRecord::new(Operation::IncrementGoal {
                    goal_id: goal_id.clone(),
                }))?;
        }
        Ok(())
    }

    /// Drop a goal's progress by one, floored at zero
    pub fn decrement_goal(&self, workspace_id: &WorkspaceId, goal_id: &GoalId) -> EbbResult<()> {
        let mut found = false;
        self.domain.update(|all| {
            if let Some(ws) = all.iter_mut().find(|ws| &ws.id == workspace_id) {
                if let Some(goal) = ws.goal_mut(goal_id) {
                    goal.progress = (goal.progress - 1).max(0);
                    found = true;
                }
            }
        });
        self.domain.realign_current(workspace_id);
        if found {
            self.ops
                .append(OperationRecord::new(Operation::DecrementGoal {
                    goal_id: goal_id.clone(),
                }))?;
        }
        Ok(())
    }
}
