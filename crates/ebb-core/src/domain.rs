//! Domain aggregates
//!
//! A workspace owns ordered lists of to-do items and goals. Entities created
//! while offline hold a temporary id and PENDING status until reconciliation
//! confirms them against the remote service.

use serde::{Deserialize, Serialize};

use crate::{GoalId, TodoId, WorkspaceId};

/// Confirmation state of an optimistically created entity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    /// Recorded locally, not yet confirmed by the remote service
    #[default]
    Pending,
    /// Confirmed by the remote service
    Success,
    /// Abandoned after exhausting the retry budget
    Failed,
}

/// To-do priority
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// A to-do item within a workspace
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub status: EntityStatus,
}

impl Todo {
    pub fn new(id: TodoId, text: impl Into<String>, priority: Priority) -> Self {
        Todo {
            id,
            text: text.into(),
            completed: false,
            priority,
            status: EntityStatus::Pending,
        }
    }

    pub fn with_status(mut self, status: EntityStatus) -> Self {
        self.status = status;
        self
    }
}

/// A progress-counter goal within a workspace
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub title: String,
    pub progress: i64,
    pub target: i64,
    pub status: EntityStatus,
}

impl Goal {
    pub fn new(id: GoalId, title: impl Into<String>, target: i64) -> Self {
        Goal {
            id,
            title: title.into(),
            progress: 0,
            target,
            status: EntityStatus::Pending,
        }
    }

    pub fn with_status(mut self, status: EntityStatus) -> Self {
        self.status = status;
        self
    }
}

/// A workspace - the domain aggregate root
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub todos: Vec<Todo>,
    pub goals: Vec<Goal>,
    pub status: EntityStatus,
}

impl Workspace {
    pub fn new(id: WorkspaceId, name: impl Into<String>) -> Self {
        Workspace {
            id,
            name: name.into(),
            todos: Vec::new(),
            goals: Vec::new(),
            status: EntityStatus::Pending,
        }
    }

    pub fn with_status(mut self, status: EntityStatus) -> Self {
        self.status = status;
        self
    }

    pub fn todo(&self, id: &TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| &t.id == id)
    }

    pub fn todo_mut(&mut self, id: &TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| &t.id == id)
    }

    pub fn goal(&self, id: &GoalId) -> Option<&Goal> {
        self.goals.iter().find(|g| &g.id == id)
    }

    pub fn goal_mut(&mut self, id: &GoalId) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| &g.id == id)
    }

    /// Replace a temporary to-do id with the server-issued id, in place.
    ///
    /// List position and all other fields are preserved; the entity is marked
    /// confirmed. The list is deduplicated afterwards because the record that
    /// produced the server id may be a replay of an attempt that already
    /// succeeded server-side.
    pub fn adopt_todo_id(&mut self, temp_id: &TodoId, server_id: &TodoId) {
        if let Some(todo) = self.todo_mut(temp_id) {
            todo.id = server_id.clone();
            todo.status = EntityStatus::Success;
        }
        dedup_keep_first(&mut self.todos, |t| t.id.clone());
    }

    /// Replace a temporary goal id with the server-issued id, in place.
    pub fn adopt_goal_id(&mut self, temp_id: &GoalId, server_id: &GoalId) {
        if let Some(goal) = self.goal_mut(temp_id) {
            goal.id = server_id.clone();
            goal.status = EntityStatus::Success;
        }
        dedup_keep_first(&mut self.goals, |g| g.id.clone());
    }
}

/// Remove later duplicates, keeping the first occurrence of each key.
pub fn dedup_keep_first<T, K, F>(items: &mut Vec<T>, key: F)
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(key(item)));
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn workspace_with_todos(ids: &[&str]) -> Workspace {
        let mut ws = Workspace::new(WorkspaceId::new("w-1"), "Personal");
        ws.todos = ids
            .iter()
            .map(|id| Todo::new(TodoId::new(*id), "task", Priority::Medium))
            .collect();
        ws
    }

    #[test]
    fn test_adopt_todo_id_preserves_position() {
        let mut ws = workspace_with_todos(&["a", "tmp-todo-1", "c"]);
        ws.adopt_todo_id(&TodoId::new("tmp-todo-1"), &TodoId::new("srv-9"));

        let ids: Vec<_> = ws.todos.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "srv-9", "c"]);
        assert_eq!(ws.todos[1].status, EntityStatus::Success);
    }

    #[test]
    fn test_adopt_todo_id_dedups_replayed_create() {
        // The server id is already present: a previous attempt succeeded
        // server-side before the record was replayed.
        let mut ws = workspace_with_todos(&["srv-9", "tmp-todo-1"]);
        ws.adopt_todo_id(&TodoId::new("tmp-todo-1"), &TodoId::new("srv-9"));

        let ids: Vec<_> = ws.todos.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["srv-9"]);
    }

    #[test]
    fn test_adopt_goal_id() {
        let mut ws = Workspace::new(WorkspaceId::new("w-1"), "Personal");
        ws.goals.push(Goal::new(GoalId::new("tmp-goal-1"), "read", 10));
        ws.adopt_goal_id(&GoalId::new("tmp-goal-1"), &GoalId::new("g-7"));

        assert_eq!(ws.goals[0].id, GoalId::new("g-7"));
        assert_eq!(ws.goals[0].status, EntityStatus::Success);
    }

    #[test]
    fn test_dedup_keep_first_keeps_order() {
        let mut items = vec!["a", "b", "a", "c", "b"];
        dedup_keep_first(&mut items, |s| s.to_string());
        assert_eq!(items, vec!["a", "b", "c"]);
    }

    proptest! {
        #[test]
        fn prop_dedup_leaves_no_duplicate_ids(ids in proptest::collection::vec("[a-d]{1,2}", 0..12)) {
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let mut ws = workspace_with_todos(&refs);
            dedup_keep_first(&mut ws.todos, |t| t.id.clone());

            let mut seen = std::collections::HashSet::new();
            for todo in &ws.todos {
                prop_assert!(seen.insert(todo.id.clone()));
            }
        }

        #[test]
        fn prop_dedup_is_idempotent(ids in proptest::collection::vec("[a-d]{1,2}", 0..12)) {
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let mut ws = workspace_with_todos(&refs);
            dedup_keep_first(&mut ws.todos, |t| t.id.clone());
            let once = ws.todos.clone();
            dedup_keep_first(&mut ws.todos, |t| t.id.clone());
            prop_assert_eq!(once, ws.todos);
        }
    }
}
