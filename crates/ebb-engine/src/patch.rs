//! Patches applied to the Domain State Store on reconciliation outcomes
//!
//! Server-id adoption replaces a temporary id in place, preserving list
//! position and every other field, then deduplicates by id (keep first) in
//! case the confirmed record was a replay. Whenever a workspace entry is
//! patched, the current-workspace alias is re-pointed so it carries the same
//! patch.

use ebb_core::{EntityStatus, GoalId, TodoId, WorkspaceId};
use ebb_store::DomainStore;

/// CREATE_WORKSPACE success: adopt the server-issued workspace id
pub fn adopt_workspace_id(domain: &DomainStore, temp_id: &WorkspaceId, server_id: &WorkspaceId) {
    let was_current = domain.current_is(temp_id);
    domain.update(|all| {
        for ws in all.iter_mut() {
            if &ws.id == temp_id {
                ws.id = server_id.clone();
                ws.status = EntityStatus::Success;
            }
        }
    });
    // The alias still holds the temporary id, so realigning by the new id
    // must be explicit here.
    if was_current {
        domain.set_current(domain.workspace(server_id));
    }
}

/// UPDATE_WORKSPACE success: apply the confirmed rename
pub fn rename_workspace(domain: &DomainStore, id: &WorkspaceId, name: &str) {
    domain.update(|all| {
        if let Some(ws) = all.iter_mut().find(|ws| &ws.id == id) {
            ws.name = name.to_string();
            ws.status = EntityStatus::Success;
        }
    });
    domain.realign_current(id);
}

/// CREATE_TODO success: adopt the server-issued todo id inside the owning
/// workspace, then dedup by id
pub fn adopt_todo_id(
    domain: &DomainStore,
    workspace_id: &WorkspaceId,
    temp_id: &TodoId,
    server_id: &TodoId,
) {
    domain.update(|all| {
        if let Some(ws) = all.iter_mut().find(|ws| &ws.id == workspace_id) {
            ws.adopt_todo_id(temp_id, server_id);
        }
    });
    domain.realign_current(workspace_id);
}

/// ADD_GOAL success: adopt the server-issued goal id inside the owning
/// workspace, then dedup by id
pub fn adopt_goal_id(
    domain: &DomainStore,
    workspace_id: &WorkspaceId,
    temp_id: &GoalId,
    server_id: &GoalId,
) {
    domain.update(|all| {
        if let Some(ws) = all.iter_mut().find(|ws| &ws.id == workspace_id) {
            ws.adopt_goal_id(temp_id, server_id);
        }
    });
    domain.realign_current(workspace_id);
}

/// CREATE_WORKSPACE abandonment: keep the entity, mark it failed
pub fn mark_workspace_failed(domain: &DomainStore, id: &WorkspaceId) {
    domain.update(|all| {
        if let Some(ws) = all.iter_mut().find(|ws| &ws.id == id) {
            ws.status = EntityStatus::Failed;
        }
    });
    domain.realign_current(id);
}

/// CREATE_TODO abandonment: keep the entity, mark it failed
pub fn mark_todo_failed(domain: &DomainStore, workspace_id: &WorkspaceId, todo_id: &TodoId) {
    domain.update(|all| {
        if let Some(ws) = all.iter_mut().find(|ws| &ws.id == workspace_id) {
            if let Some(todo) = ws.todo_mut(todo_id) {
                todo.status = EntityStatus::Failed;
            }
        }
    });
    domain.realign_current(workspace_id);
}

/// ADD_GOAL abandonment: keep the entity, mark it failed
pub fn mark_goal_failed(domain: &DomainStore, workspace_id: &WorkspaceId, goal_id: &GoalId) {
    domain.update(|all| {
        if let Some(ws) = all.iter_mut().find(|ws| &ws.id == workspace_id) {
            if let Some(goal) = ws.goal_mut(goal_id) {
                goal.status = EntityStatus::Failed;
            }
        }
    });
    domain.realign_current(workspace_id);
}

#[cfg(test)]
mod tests {
    use ebb_core::{Goal, Priority, Todo, Workspace};

    use super::*;

    fn store_with(ws: Workspace) -> DomainStore {
        DomainStore::with_workspaces(vec![ws])
    }

    #[test]
    fn test_adopt_workspace_id_follows_current_alias() {
        let temp = WorkspaceId::new("tmp-ws-1");
        let ws = Workspace::new(temp.clone(), "Personal");
        let domain = store_with(ws.clone());
        domain.set_current(Some(ws));

        adopt_workspace_id(&domain, &temp, &WorkspaceId::new("w-42"));

        let current = domain.current_workspace().unwrap();
        assert_eq!(current.id, WorkspaceId::new("w-42"));
        assert_eq!(current.name, "Personal");
        assert_eq!(current.status, EntityStatus::Success);
    }

    #[test]
    fn test_adopt_workspace_id_leaves_other_alias_alone() {
        let temp = WorkspaceId::new("tmp-ws-1");
        let other = Workspace::new(WorkspaceId::new("w-other"), "Other");
        let domain = DomainStore::with_workspaces(vec![
            Workspace::new(temp.clone(), "Personal"),
            other.clone(),
        ]);
        domain.set_current(Some(other));

        adopt_workspace_id(&domain, &temp, &WorkspaceId::new("w-42"));

        assert_eq!(
            domain.current_workspace().unwrap().id,
            WorkspaceId::new("w-other")
        );
    }

    #[test]
    fn test_rename_workspace_propagates_to_alias() {
        let id = WorkspaceId::new("w-1");
        let ws = Workspace::new(id.clone(), "Old");
        let domain = store_with(ws.clone());
        domain.set_current(Some(ws));

        rename_workspace(&domain, &id, "New");

        assert_eq!(domain.workspace(&id).unwrap().name, "New");
        assert_eq!(domain.current_workspace().unwrap().name, "New");
    }

    #[test]
    fn test_adopt_todo_id_keeps_position_and_dedups() {
        let ws_id = WorkspaceId::new("w-1");
        let mut ws = Workspace::new(ws_id.clone(), "Personal");
        ws.todos = vec![
            Todo::new(TodoId::new("srv-1"), "first", Priority::Low),
            Todo::new(TodoId::new("tmp-todo-1"), "second", Priority::High),
        ];
        let domain = store_with(ws);

        adopt_todo_id(
            &domain,
            &ws_id,
            &TodoId::new("tmp-todo-1"),
            &TodoId::new("srv-2"),
        );

        let todos = domain.workspace(&ws_id).unwrap().todos;
        let ids: Vec<_> = todos.iter().map(|t| t.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["srv-1", "srv-2"]);
        assert_eq!(todos[1].text, "second");
        assert_eq!(todos[1].status, EntityStatus::Success);
    }

    #[test]
    fn test_mark_goal_failed_keeps_entity() {
        let ws_id = WorkspaceId::new("w-1");
        let goal_id = GoalId::new("tmp-goal-1");
        let mut ws = Workspace::new(ws_id.clone(), "Personal");
        ws.goals.push(Goal::new(goal_id.clone(), "read", 10));
        let domain = store_with(ws);

        mark_goal_failed(&domain, &ws_id, &goal_id);

        let goals = domain.workspace(&ws_id).unwrap().goals;
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].id, goal_id);
        assert_eq!(goals[0].status, EntityStatus::Failed);
    }
}
