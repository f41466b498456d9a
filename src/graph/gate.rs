//! Reader/writer gate shared between the simplification pipeline and renderers
//!
//! The gate has a reader counter and one exclusive lock. The first reader of
//! a group takes the lock on behalf of the whole group and the last reader to
//! leave releases it, so a writer blocks until every reader is gone.
//!
//! Known limitation: there is no fairness. While the reader count never
//! drops to zero a waiting writer is starved; downstream renderers rely on
//! reads never queueing behind a pending write.
//!
//! Read access is re-entrant: taking a second read guard while holding one
//! only bumps the counter. Taking a write guard while holding a read guard on
//! the same thread deadlocks.

use super::store::GraphStore;
use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct GateState {
    readers: usize,
    /// Held either by the reader group or by a single writer
    locked: bool,
}

/// Counter-plus-lock gate where the reader group collectively owns the lock
#[derive(Debug, Default)]
pub struct ReadWriteGate {
    state: Mutex<GateState>,
    released: Condvar,
}

impl ReadWriteGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, GateState> {
        // A panic while holding the state mutex cannot leave the counters
        // half-updated, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Enter as a reader, blocking only while a writer holds the lock
    pub fn read(&self) -> ReadGuard<'_> {
        let mut state = self.state();
        if state.readers == 0 {
            while state.locked {
                state = self
                    .released
                    .wait(state)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
            state.locked = true;
        }
        state.readers += 1;
        ReadGuard { gate: self }
    }

    /// Enter as the exclusive writer, blocking until all readers are gone
    pub fn write(&self) -> WriteGuard<'_> {
        let mut state = self.state();
        while state.locked {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        state.locked = true;
        WriteGuard { gate: self }
    }

    /// Non-blocking write attempt
    pub fn try_write(&self) -> Option<WriteGuard<'_>> {
        let mut state = self.state();
        if state.locked {
            return None;
        }
        state.locked = true;
        Some(WriteGuard { gate: self })
    }

    pub fn reader_count(&self) -> usize {
        self.state().readers
    }

    fn leave_read(&self) {
        let mut state = self.state();
        state.readers -= 1;
        if state.readers == 0 {
            state.locked = false;
            self.released.notify_all();
        }
    }

    fn leave_write(&self) {
        let mut state = self.state();
        state.locked = false;
        self.released.notify_all();
    }
}

/// Membership in the reader group; leaving the last one releases the lock
pub struct ReadGuard<'a> {
    gate: &'a ReadWriteGate,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.gate.leave_read();
    }
}

/// Exclusive write access
pub struct WriteGuard<'a> {
    gate: &'a ReadWriteGate,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.gate.leave_write();
    }
}

/// A `GraphStore` behind a `ReadWriteGate`
///
/// The gate decides who may enter; the inner `RwLock` only provides safe
/// shared/exclusive borrows and is never contended, because the gate already
/// keeps writers and readers apart.
#[derive(Debug)]
pub struct SharedGraph {
    gate: ReadWriteGate,
    graph: RwLock<GraphStore>,
}

impl SharedGraph {
    pub fn new(graph: GraphStore) -> Self {
        SharedGraph {
            gate: ReadWriteGate::new(),
            graph: RwLock::new(graph),
        }
    }

    pub fn gate(&self) -> &ReadWriteGate {
        &self.gate
    }

    pub fn read(&self) -> GraphReadGuard<'_> {
        let gate = self.gate.read();
        let graph = self.graph.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        GraphReadGuard { graph, _gate: gate }
    }

    pub fn write(&self) -> GraphWriteGuard<'_> {
        let gate = self.gate.write();
        let graph = self.graph.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        GraphWriteGuard { graph, _gate: gate }
    }

    pub fn into_inner(self) -> GraphStore {
        self.graph.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Shared access to a `SharedGraph`
pub struct GraphReadGuard<'a> {
    // Field order matters: the borrow is released before the gate
    graph: RwLockReadGuard<'a, GraphStore>,
    _gate: ReadGuard<'a>,
}

impl Deref for GraphReadGuard<'_> {
    type Target = GraphStore;

    fn deref(&self) -> &GraphStore {
        &self.graph
    }
}

/// Exclusive access to a `SharedGraph`
pub struct GraphWriteGuard<'a> {
    graph: RwLockWriteGuard<'a, GraphStore>,
    _gate: WriteGuard<'a>,
}

impl Deref for GraphWriteGuard<'_> {
    type Target = GraphStore;

    fn deref(&self) -> &GraphStore {
        &self.graph
    }
}

impl DerefMut for GraphWriteGuard<'_> {
    fn deref_mut(&mut self) -> &mut GraphStore {
        &mut self.graph
    }
}
