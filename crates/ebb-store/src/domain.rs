//! Domain State Store - the canonical local copy of workspaces
//!
//! Holds the whole workspace collection plus the current-workspace pointer,
//! which aliases one entry of the collection by identity. Mutations go
//! through short closure-scoped write locks; callers never hold a lock across
//! an await point.

use ebb_core::{Workspace, WorkspaceId};
use parking_lot::RwLock;

/// In-memory canonical domain state
#[derive(Default)]
pub struct DomainStore {
    workspaces: RwLock<Vec<Workspace>>,
    current: RwLock<Option<Workspace>>,
}

impl DomainStore {
    pub fn new() -> Self {
        DomainStore::default()
    }

    pub fn with_workspaces(workspaces: Vec<Workspace>) -> Self {
        DomainStore {
            workspaces: RwLock::new(workspaces),
            current: RwLock::new(None),
        }
    }

    /// Snapshot of the workspace collection
    pub fn workspaces(&self) -> Vec<Workspace> {
        self.workspaces.read().clone()
    }

    /// Atomic whole-collection replace
    pub fn replace_workspaces(&self, next: Vec<Workspace>) {
        *self.workspaces.write() = next;
    }

    /// Mutate the collection under the write lock
    pub fn update<R>(&self, f: impl FnOnce(&mut Vec<Workspace>) -> R) -> R {
        f(&mut self.workspaces.write())
    }

    pub fn workspace(&self, id: &WorkspaceId) -> Option<Workspace> {
        self.workspaces.read().iter().find(|ws| &ws.id == id).cloned()
    }

    pub fn current_workspace(&self) -> Option<Workspace> {
        self.current.read().clone()
    }

    pub fn set_current(&self, ws: Option<Workspace>) {
        *self.current.write() = ws;
    }

    /// Re-point the current-workspace alias at the collection entry with the
    /// given id, if the alias refers to that id.
    ///
    /// Used after patching a workspace in place so the alias reflects the
    /// same patch. When a workspace just adopted a server id the alias still
    /// holds the old id, so callers handle that case with `set_current`.
    pub fn realign_current(&self, id: &WorkspaceId) {
        let replacement = self.workspace(id);
        if let Some(replacement) = replacement {
            let mut current = self.current.write();
            if current.as_ref().map(|ws| &ws.id) == Some(id) {
                *current = Some(replacement);
            }
        }
    }

    /// True if the current-workspace alias points at the given id
    pub fn current_is(&self, id: &WorkspaceId) -> bool {
        self.current.read().as_ref().map(|ws| &ws.id) == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use ebb_core::EntityStatus;

    use super::*;

    fn ws(id: &str, name: &str) -> Workspace {
        Workspace::new(WorkspaceId::new(id), name)
    }

    #[test]
    fn test_replace_workspaces_is_whole_collection() {
        let store = DomainStore::with_workspaces(vec![ws("a", "A"), ws("b", "B")]);
        store.replace_workspaces(vec![ws("c", "C")]);

        let names: Vec<_> = store.workspaces().into_iter().map(|w| w.name).collect();
        assert_eq!(names, vec!["C"]);
    }

    #[test]
    fn test_update_mutates_under_lock() {
        let store = DomainStore::with_workspaces(vec![ws("a", "A")]);
        store.update(|all| {
            all[0].name = "renamed".into();
            all[0].status = EntityStatus::Success;
        });

        assert_eq!(store.workspace(&WorkspaceId::new("a")).unwrap().name, "renamed");
    }

    #[test]
    fn test_realign_current_follows_patch() {
        let store = DomainStore::with_workspaces(vec![ws("a", "A")]);
        store.set_current(Some(ws("a", "A")));

        store.update(|all| all[0].name = "renamed".into());
        store.realign_current(&WorkspaceId::new("a"));

        assert_eq!(store.current_workspace().unwrap().name, "renamed");
    }

    #[test]
    fn test_realign_current_ignores_unknown_id() {
        let store = DomainStore::with_workspaces(vec![ws("a", "A")]);
        store.set_current(Some(ws("a", "A")));

        store.realign_current(&WorkspaceId::new("missing"));
        assert_eq!(store.current_workspace().unwrap().name, "A");
    }

    #[test]
    fn test_current_is() {
        let store = DomainStore::new();
        assert!(!store.current_is(&WorkspaceId::new("a")));

        store.set_current(Some(ws("a", "A")));
        assert!(store.current_is(&WorkspaceId::new("a")));
        assert!(!store.current_is(&WorkspaceId::new("b")));
    }
}
