//! Identity types for the Ebb sync engine
//!
//! Entity identifiers are string-backed: entities created while offline carry
//! a locally generated temporary id (`tmp-` prefixed) until the remote
//! service confirms the creation and issues its own id.

use std::fmt;

use serde::{Deserialize, Serialize};

const TEMP_PREFIX: &str = "tmp-";

fn random_suffix() -> String {
    format!("{:012x}", rand::random::<u64>() & 0x0000_FFFF_FFFF_FFFF)
}

/// Workspace identity
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    pub fn new(id: impl Into<String>) -> Self {
        WorkspaceId(id.into())
    }

    /// Generate a temporary id for a workspace created while offline
    pub fn temp() -> Self {
        WorkspaceId(format!("{TEMP_PREFIX}ws-{}", random_suffix()))
    }

    pub fn is_temp(&self) -> bool {
        self.0.starts_with(TEMP_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Workspace({})", self.0)
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// To-do item identity
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn new(id: impl Into<String>) -> Self {
        TodoId(id.into())
    }

    /// Generate a temporary id for a to-do created while offline
    pub fn temp() -> Self {
        TodoId(format!("{TEMP_PREFIX}todo-{}", random_suffix()))
    }

    pub fn is_temp(&self) -> bool {
        self.0.starts_with(TEMP_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Todo({})", self.0)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Goal identity
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(String);

impl GoalId {
    pub fn new(id: impl Into<String>) -> Self {
        GoalId(id.into())
    }

    /// Generate a temporary id for a goal created while offline
    pub fn temp() -> Self {
        GoalId(format!("{TEMP_PREFIX}goal-{}", random_suffix()))
    }

    pub fn is_temp(&self) -> bool {
        self.0.starts_with(TEMP_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Goal({})", self.0)
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operation record identity - the opaque queue key
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    /// Generate a fresh record key
    pub fn generate() -> Self {
        RecordId(format!("op-{:016x}", rand::random::<u64>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_ids_are_marked() {
        assert!(WorkspaceId::temp().is_temp());
        assert!(TodoId::temp().is_temp());
        assert!(GoalId::temp().is_temp());
    }

    #[test]
    fn test_server_ids_are_not_temp() {
        assert!(!WorkspaceId::new("w-42").is_temp());
        assert!(!TodoId::new("663f1a2b").is_temp());
    }

    #[test]
    fn test_temp_ids_are_distinct() {
        let a = GoalId::temp();
        let b = GoalId::temp();
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let id = WorkspaceId::new("w-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"w-42\"");
    }
}
