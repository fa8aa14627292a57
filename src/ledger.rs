//! Bounded undo/redo ledger shared by every annotation tool.
//!
//! Entries are plain command data, never closures. The ledger stores them
//! opaquely and hands them back to the caller; interpretation (detaching and
//! re-attaching layer elements, adjusting the marker counter) lives in
//! [`crate::context::ToolContext`].

use crate::layer::{ElementId, LayerKind};

/// Maximum number of undoable actions kept per session. The oldest entry is
/// evicted once the stack grows past this.
pub const LEDGER_CAPACITY: usize = 50;

/// One completed annotation recorded as command data. Reverse interpretation
/// detaches `element` from `layer` and subtracts `counter_delta` from the
/// marker counter; forward interpretation re-attaches at `z_index` and adds
/// the delta back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub layer: LayerKind,
    pub element: ElementId,
    pub z_index: usize,
    pub counter_delta: u32,
}

#[derive(Debug, Default)]
pub struct Ledger {
    undo: Vec<LedgerEntry>,
    redo: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed annotation. Pushing drops every redoable entry and
    /// evicts the oldest undo entry past capacity, preserving the relative
    /// order of the remainder.
    pub fn push(&mut self, entry: LedgerEntry) {
        self.undo.push(entry);
        self.redo.clear();
        while self.undo.len() > LEDGER_CAPACITY {
            self.undo.remove(0);
        }
    }

    /// Pops the most recent entry onto the redo stack and returns it for
    /// reverse interpretation. No-op on an empty stack.
    pub fn undo(&mut self) -> Option<LedgerEntry> {
        let entry = self.undo.pop()?;
        self.redo.push(entry);
        Some(entry)
    }

    /// Mirror of [`Ledger::undo`] for forward interpretation.
    pub fn redo(&mut self) -> Option<LedgerEntry> {
        let entry = self.redo.pop()?;
        self.undo.push(entry);
        Some(entry)
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
