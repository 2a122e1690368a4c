//! The reconciliation engine
//!
//! Drains the operation record store in insertion order, dispatches each
//! pending record to the remote call for its kind, and applies the kind's
//! success or abandonment patch to the domain state store. At most one drain
//! pass runs at a time; overlapping invocations are coalesced into a no-op.

use std::sync::Arc;

use ebb_core::{EbbResult, Operation, OperationRecord, RecordStatus, RETRY_LIMIT};
use ebb_remote::{NewGoal, NewTodo, RemoteService, TodoPatch};
use ebb_store::{DomainStore, OperationStore};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::coalesce::{self, CounterKind, CounterTally};
use crate::patch;

/// Tally of one completed drain pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Records dispatched to the remote service
    pub processed: u32,
    /// Records confirmed and removed
    pub succeeded: u32,
    /// Records left pending with a bumped retry count
    pub retried: u32,
    /// Records removed after exhausting the retry budget
    pub abandoned: u32,
    /// Counter records absorbed by the coalescing pass without a call
    pub coalesced: u32,
    /// Records skipped because their status is not PENDING
    pub skipped: u32,
}

/// Outcome of one drain invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrainOutcome {
    /// The pass ran to completion
    Completed(DrainReport),
    /// Another pass was in flight; this invocation touched nothing
    AlreadyDraining,
}

impl DrainOutcome {
    pub fn report(&self) -> Option<&DrainReport> {
        match self {
            DrainOutcome::Completed(report) => Some(report),
            DrainOutcome::AlreadyDraining => None,
        }
    }
}

/// The reconciliation engine
pub struct ReconcileEngine {
    ops: Arc<dyn OperationStore>,
    domain: Arc<DomainStore>,
    remote: Arc<dyn RemoteService>,
    /// Single-flight guard: the scheduler may trigger a drain from a timer
    /// tick while a connectivity-regained drain is still in flight.
    gate: Mutex<()>,
}

impl ReconcileEngine {
    pub fn new(
        ops: Arc<dyn OperationStore>,
        domain: Arc<DomainStore>,
        remote: Arc<dyn RemoteService>,
    ) -> Self {
        ReconcileEngine {
            ops,
            domain,
            remote,
            gate: Mutex::new(()),
        }
    }

    pub fn domain(&self) -> Arc<DomainStore> {
        Arc::clone(&self.domain)
    }

    pub fn ops(&self) -> Arc<dyn OperationStore> {
        Arc::clone(&self.ops)
    }

    /// One full sweep of the operation record store.
    ///
    /// Records are processed strictly sequentially in store order; per-record
    /// remote failures never escape, only store failures abort the pass.
    pub async fn drain(&self) -> EbbResult<DrainOutcome> {
        let Ok(_guard) = self.gate.try_lock() else {
            debug!("drain already in flight, coalescing invocation");
            return Ok(DrainOutcome::AlreadyDraining);
        };

        let records = self.ops.list()?;
        let mut report = DrainReport::default();
        let mut tally = CounterTally::new();

        for (idx, record) in records.iter().enumerate() {
            if record.status != RecordStatus::Pending {
                report.skipped += 1;
                continue;
            }

            if coalesce::absorbed_by_next(&record.op, records.get(idx + 1)) {
                let Some((kind, _)) = coalesce::counter_axis(&record.op) else {
                    continue;
                };
                self.ops.remove(&record.id)?;
                tally.bump(kind);
                report.coalesced += 1;
                continue;
            }

            report.processed += 1;
            match self.attempt(record, &mut tally).await {
                Ok(()) => {
                    self.ops.remove(&record.id)?;
                    report.succeeded += 1;
                }
                Err(err) => {
                    let retried = record.clone().with_retry_count(record.retry_count + 1);
                    warn!(
                        "reconcile {} failed (attempt {}): {}",
                        record.op.kind(),
                        retried.retry_count,
                        err
                    );
                    if retried.retry_count >= RETRY_LIMIT {
                        warn!(
                            "retry budget exhausted for {}, abandoning {}",
                            record.op.kind(),
                            record.id
                        );
                        self.abandon(&retried.op);
                        self.ops.remove(&record.id)?;
                        report.abandoned += 1;
                    } else {
                        self.ops.append(retried)?;
                        report.retried += 1;
                    }
                }
            }
        }

        Ok(DrainOutcome::Completed(report))
    }

    /// Dispatch one record to the remote call for its kind and apply the
    /// kind's success patch.
    async fn attempt(&self, record: &OperationRecord, tally: &mut CounterTally) -> EbbResult<()> {
        match &record.op {
            Operation::CreateWorkspace { temp_id, name } => {
                let created = self.remote.create_workspace(temp_id, name).await?;
                patch::adopt_workspace_id(&self.domain, temp_id, &created.workspace_id);
            }
            Operation::UpdateWorkspace { id, updated_name } => {
                self.remote.update_workspace(id, updated_name).await?;
                patch::rename_workspace(&self.domain, id, updated_name);
            }
            Operation::DeleteWorkspace { id } => {
                // The entity was removed optimistically when the record was
                // enqueued; confirmation needs no further local action.
                self.remote.delete_workspace(id).await?;
            }
            Operation::CreateTodo {
                temp_id,
                workspace_id,
                text,
                priority,
            } => {
                let todo = NewTodo {
                    temp_id: temp_id.clone(),
                    workspace_id: workspace_id.clone(),
                    text: text.clone(),
                    priority: *priority,
                };
                let created = self.remote.create_todo(&todo).await?;
                patch::adopt_todo_id(&self.domain, workspace_id, temp_id, &created.todo_id);
            }
            Operation::ToggleTodo {
                id,
                workspace_id,
                completed,
            } => {
                self.remote.toggle_todo(id, workspace_id, *completed).await?;
            }
            Operation::UpdateTodo {
                id,
                workspace_id,
                text,
                priority,
            } => {
                let todo = TodoPatch {
                    id: id.clone(),
                    workspace_id: workspace_id.clone(),
                    text: text.clone(),
                    priority: *priority,
                };
                self.remote.update_todo(&todo).await?;
            }
            Operation::DeleteTodo { id, workspace_id } => {
                self.remote.delete_todo(id, workspace_id).await?;
            }
            Operation::AddGoal {
                temp_id,
                workspace_id,
                title,
                target,
            } => {
                let goal = NewGoal {
                    temp_id: temp_id.clone(),
                    workspace_id: workspace_id.clone(),
                    title: title.clone(),
                    target: *target,
                };
                let created = self.remote.add_goal(&goal).await?;
                patch::adopt_goal_id(&self.domain, workspace_id, temp_id, &created.goal_id);
            }
            Operation::IncrementGoal { goal_id } => {
                let magnitude = tally.take(CounterKind::Increment) + 1;
                self.remote.increment_goal(goal_id, magnitude).await?;
            }
            Operation::DecrementGoal { goal_id } => {
                let magnitude = tally.take(CounterKind::Decrement) + 1;
                self.remote.decrement_goal(goal_id, magnitude).await?;
            }
        }
        Ok(())
    }

    /// Apply the abandonment patch for a record that exhausted its retries.
    ///
    /// Creation kinds keep the optimistic entity and mark it failed; the
    /// remaining kinds define no entity status change.
    fn abandon(&self, op: &Operation) {
        match op {
            Operation::CreateWorkspace { temp_id, .. } => {
                patch::mark_workspace_failed(&self.domain, temp_id);
            }
            Operation::CreateTodo {
                temp_id,
                workspace_id,
                ..
            } => {
                patch::mark_todo_failed(&self.domain, workspace_id, temp_id);
            }
            Operation::AddGoal {
                temp_id,
                workspace_id,
                ..
            } => {
                patch::mark_goal_failed(&self.domain, workspace_id, temp_id);
            }
            _ => {}
        }
    }
}
