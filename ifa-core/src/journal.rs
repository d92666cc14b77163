//! Rollback Journal
//!
//! Graph mutations rewrite several links at once: a relation insert touches
//! the new relation, two chain heads, up to two neighbours, a free-list
//! head, a liveness bit and a counter. If anything goes wrong half way the
//! graph must look as if the operation never started.
//!
//! # How It Works
//!
//! 1. A mutating operation opens a [`Transaction`] over the state it owns.
//!
//! 2. Every write goes through the transaction. [`Transaction::set`] swaps
//!    the new value into a location and records an undo entry that writes
//!    the old value back. [`Transaction::perform`] runs an arbitrary change
//!    (an arena push, a bit flip) together with a caller-supplied undo.
//!
//! 3. On success the operation calls [`Transaction::commit`], which throws
//!    the journal away.
//!
//! 4. If the transaction is dropped without a commit (an early `?` return,
//!    or a panic unwinding through the operation), the guard replays the
//!    undo entries in reverse order before the error or panic continues to
//!    the caller.
//!
//! This gives atomicity for in-memory pointer surgery only. Nothing is
//! written anywhere durable.

use std::ops::Deref;

use smallvec::SmallVec;
use tracing::warn;

/// A single undo action against state `S`.
type Undo<S> = Box<dyn FnOnce(&mut S)>;

/// An ordered log of undo actions.
///
/// Most graph operations record fewer than a dozen entries, so the log
/// keeps them inline.
pub struct Journal<S> {
    entries: SmallVec<[Undo<S>; 12]>,
}

impl<S> Journal<S> {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// Number of recorded undo entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record an undo action.
    pub fn record<F>(&mut self, undo: F)
    where
        F: FnOnce(&mut S) + 'static,
    {
        self.entries.push(Box::new(undo));
    }

    /// Replay every recorded action, newest first, and empty the journal.
    pub fn rollback(&mut self, state: &mut S) {
        while let Some(undo) = self.entries.pop() {
            undo(state);
        }
    }

    /// Forget every recorded action.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<S> Default for Journal<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped guard that journals writes to `S` and rolls them back unless
/// committed.
///
/// Reads go through `Deref`; writes must go through the journaling methods
/// so that they can be undone.
pub struct Transaction<'a, S> {
    state: &'a mut S,
    journal: Journal<S>,
    operation: &'static str,
    committed: bool,
}

impl<'a, S> Transaction<'a, S> {
    /// Open a transaction over `state`. `operation` names the transaction
    /// in log output.
    pub fn begin(state: &'a mut S, operation: &'static str) -> Self {
        Self {
            state,
            journal: Journal::new(),
            operation,
            committed: false,
        }
    }

    /// Write `value` into the location selected by `location`, journaling
    /// the value it replaces.
    pub fn set<T, L>(&mut self, location: L, value: T)
    where
        T: 'static,
        L: for<'s> Fn(&'s mut S) -> &'s mut T + 'static,
    {
        let old = std::mem::replace(location(&mut *self.state), value);
        self.journal.record(move |state| {
            *location(state) = old;
        });
    }

    /// Add one to a counter.
    pub fn increment<L>(&mut self, location: L)
    where
        L: for<'s> Fn(&'s mut S) -> &'s mut usize + 'static,
    {
        *location(&mut *self.state) += 1;
        self.journal.record(move |state| {
            *location(state) -= 1;
        });
    }

    /// Subtract one from a counter.
    pub fn decrement<L>(&mut self, location: L)
    where
        L: for<'s> Fn(&'s mut S) -> &'s mut usize + 'static,
    {
        *location(&mut *self.state) -= 1;
        self.journal.record(move |state| {
            *location(state) += 1;
        });
    }

    /// Apply `change` now and register `undo` to reverse it on rollback.
    pub fn perform<R, F, U>(&mut self, change: F, undo: U) -> R
    where
        F: FnOnce(&mut S) -> R,
        U: FnOnce(&mut S) + 'static,
    {
        let result = change(&mut *self.state);
        self.journal.record(undo);
        result
    }

    /// Register an undo action for a side effect applied elsewhere.
    pub fn on_abort<U>(&mut self, undo: U)
    where
        U: FnOnce(&mut S) + 'static,
    {
        self.journal.record(undo);
    }

    /// Number of undo entries recorded so far.
    pub fn pending(&self) -> usize {
        self.journal.len()
    }

    /// Keep every write and close the transaction.
    pub fn commit(mut self) {
        self.committed = true;
        self.journal.clear();
    }
}

impl<S> Deref for Transaction<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.state
    }
}

impl<S> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if !self.journal.is_empty() {
            warn!(
                operation = self.operation,
                undo_records = self.journal.len(),
                panicking = std::thread::panicking(),
                "rolling back aborted graph operation"
            );
        }
        self.journal.rollback(&mut *self.state);
    }
}
