//! Durable SQLite-backed operation record store

use std::path::Path;

use ebb_core::{EbbError, EbbResult, OperationRecord, RecordId};
use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::OperationStore;

/// Durable operation store.
///
/// Records are persisted as JSON rows keyed by record id; a monotonic `seq`
/// column carries the insertion order. Upserting a known id rewrites the row
/// but leaves its `seq` untouched, so the order of first insertion survives
/// retry-count updates and process restarts.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at the given database path
    pub fn open(db_path: impl AsRef<Path>) -> EbbResult<Self> {
        let conn = Connection::open(db_path).map_err(sql_err)?;
        let store = SqliteStore {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open a private in-memory store (tests, throwaway sessions)
    pub fn in_memory() -> EbbResult<Self> {
        let conn = Connection::open_in_memory().map_err(sql_err)?;
        let store = SqliteStore {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> EbbResult<()> {
        self.conn
            .lock()
            .execute_batch(
                r#"
                PRAGMA journal_mode=WAL;
                PRAGMA synchronous=NORMAL;

                CREATE TABLE IF NOT EXISTS operations (
                  seq INTEGER PRIMARY KEY AUTOINCREMENT,
                  id TEXT NOT NULL UNIQUE,
                  record TEXT NOT NULL
                );
                "#,
            )
            .map_err(sql_err)
    }
}

impl OperationStore for SqliteStore {
    fn append(&self, record: OperationRecord) -> EbbResult<()> {
        let json = serde_json::to_string(&record).map_err(|e| EbbError::CorruptRecord {
            id: record.id.to_string(),
            detail: e.to_string(),
        })?;
        self.conn
            .lock()
            .execute(
                "INSERT INTO operations (id, record) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET record = excluded.record",
                params![record.id.as_str(), json],
            )
            .map_err(sql_err)?;
        Ok(())
    }

    fn list(&self) -> EbbResult<Vec<OperationRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT id, record FROM operations ORDER BY seq")
            .map_err(sql_err)?;
        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let json: String = row.get(1)?;
                Ok((id, json))
            })
            .map_err(sql_err)?;

        let mut records = Vec::new();
        for row in rows {
            let (id, json) = row.map_err(sql_err)?;
            let record =
                serde_json::from_str(&json).map_err(|e| EbbError::CorruptRecord {
                    id,
                    detail: e.to_string(),
                })?;
            records.push(record);
        }
        Ok(records)
    }

    fn remove(&self, id: &RecordId) -> EbbResult<()> {
        self.conn
            .lock()
            .execute("DELETE FROM operations WHERE id = ?1", params![id.as_str()])
            .map_err(sql_err)?;
        Ok(())
    }
}

fn sql_err(err: rusqlite::Error) -> EbbError {
    EbbError::StoreSql(err.to_string())
}

#[cfg(test)]
mod tests {
    use ebb_core::{GoalId, Operation, RecordStatus, TodoId, WorkspaceId};

    use super::*;

    fn record(op: Operation) -> OperationRecord {
        OperationRecord::new(op)
    }

    #[test]
    fn test_list_orders_by_first_insertion() {
        let store = SqliteStore::in_memory().unwrap();
        let a = record(Operation::IncrementGoal {
            goal_id: GoalId::new("g-1"),
        });
        let b = record(Operation::DeleteTodo {
            id: TodoId::new("t-1"),
            workspace_id: WorkspaceId::new("w-1"),
        });
        store.append(a.clone()).unwrap();
        store.append(b.clone()).unwrap();

        // Upsert does not move the record to the tail
        let bumped = a.clone().with_retry_count(1);
        store.append(bumped.clone()).unwrap();

        let ids: Vec<_> = store.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_upsert_rewrites_record_fields() {
        let store = SqliteStore::in_memory().unwrap();
        let a = record(Operation::CreateWorkspace {
            temp_id: WorkspaceId::temp(),
            name: "Personal".into(),
        });
        store.append(a.clone()).unwrap();
        store
            .append(a.clone().with_retry_count(2).with_status(RecordStatus::Failed))
            .unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].retry_count, 2);
        assert_eq!(listed[0].status, RecordStatus::Failed);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ebb.db");

        let a = record(Operation::ToggleTodo {
            id: TodoId::new("t-1"),
            workspace_id: WorkspaceId::new("w-1"),
            completed: true,
        });
        let b = record(Operation::IncrementGoal {
            goal_id: GoalId::new("g-1"),
        });

        {
            let store = SqliteStore::open(&path).unwrap();
            store.append(a.clone()).unwrap();
            store.append(b.clone()).unwrap();
            store.remove(&a.id).unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.list().unwrap(), vec![b]);
    }
}
