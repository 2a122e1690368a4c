//! Operation Record Store contract and the in-memory implementation

use ebb_core::{EbbResult, OperationRecord, RecordId};
use parking_lot::Mutex;

/// Durable, insertion-ordered store of queued mutations.
///
/// `append` upserts by record id: a new id is added at the tail, a known id
/// is replaced in place so the stored order of first insertion is preserved.
/// `list` returns all current records in that order and must reflect every
/// prior append/remove, including across process restarts for durable
/// implementations.
pub trait OperationStore: Send + Sync {
    fn append(&self, record: OperationRecord) -> EbbResult<()>;
    fn list(&self) -> EbbResult<Vec<OperationRecord>>;
    fn remove(&self, id: &RecordId) -> EbbResult<()>;
}

/// Non-durable operation store backed by an ordered vector.
///
/// Used by tests and by configurations that accept losing the queue on exit.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<OperationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl OperationStore for MemoryStore {
    fn append(&self, record: OperationRecord) -> EbbResult<()> {
        let mut records = self.records.lock();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Ok(())
    }

    fn list(&self) -> EbbResult<Vec<OperationRecord>> {
        Ok(self.records.lock().clone())
    }

    fn remove(&self, id: &RecordId) -> EbbResult<()> {
        self.records.lock().retain(|r| &r.id != id);
        Ok(())
    }
}
