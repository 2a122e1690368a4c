//! Coalescing of contiguous counter runs
//!
//! Rapid repeated increment/decrement taps on one goal must not generate one
//! round trip per tap. While the drain walks records in store order, every
//! counter record whose immediate successor targets the same goal with the
//! same kind is absorbed: removed without a network call, counted into a
//! pass-scoped accumulator. The last record of the run carries the aggregate
//! delta in a single call.

use ebb_core::{GoalId, Operation, OperationRecord};

/// Counter direction, the accumulator axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterKind {
    Increment,
    Decrement,
}

/// Pass-scoped accumulators for absorbed counter records.
///
/// Never outlives a single drain invocation.
#[derive(Debug, Default)]
pub struct CounterTally {
    increments: u32,
    decrements: u32,
}

impl CounterTally {
    pub fn new() -> Self {
        CounterTally::default()
    }

    /// Count one absorbed record
    pub fn bump(&mut self, kind: CounterKind) {
        match kind {
            CounterKind::Increment => self.increments += 1,
            CounterKind::Decrement => self.decrements += 1,
        }
    }

    /// Take the accumulated count for a run's terminal call.
    ///
    /// Resets the axis to zero so a later run in the same pass starts fresh.
    pub fn take(&mut self, kind: CounterKind) -> u32 {
        match kind {
            CounterKind::Increment => std::mem::take(&mut self.increments),
            CounterKind::Decrement => std::mem::take(&mut self.decrements),
        }
    }
}

/// The counter axis of an operation, if it is a counter mutation
pub fn counter_axis(op: &Operation) -> Option<(CounterKind, &GoalId)> {
    match op {
        Operation::IncrementGoal { goal_id } => Some((CounterKind::Increment, goal_id)),
        Operation::DecrementGoal { goal_id } => Some((CounterKind::Decrement, goal_id)),
        _ => None,
    }
}

/// True when the next record continues the same-kind, same-goal run begun by
/// `op`, i.e. `op` can be absorbed without a network call.
pub fn absorbed_by_next(op: &Operation, next: Option<&OperationRecord>) -> bool {
    let Some((kind, goal)) = counter_axis(op) else {
        return false;
    };
    let Some(next) = next else {
        return false;
    };
    matches!(counter_axis(&next.op), Some((next_kind, next_goal))
        if next_kind == kind && next_goal == goal)
}
