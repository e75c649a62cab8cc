//! Undo/redo history of serialized content.
//!
//! Every committed change pushes the root's HTML together with a selection
//! snapshot. The bottom entry is the initial state and is never undone past.
//! Restoring an entry is the caller's job (see [`crate::Editor`]): it needs
//! the DOM, the selection codec and the observation gate.

use std::collections::VecDeque;

use crate::selection::SelectionSnapshot;

pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub html: String,
    pub selection: Option<SelectionSnapshot>,
}

/// Bounded linear history with a redo stack.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// A history keeping at most `limit` entries (at least one).
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Append an entry, evicting the oldest ones beyond the limit.
    pub fn push(&mut self, html: impl Into<String>, selection: Option<SelectionSnapshot>) {
        self.entries.push_back(HistoryEntry {
            html: html.into(),
            selection,
        });
        self.evict();
    }

    /// Record `html` as a new committed state unless it matches the current
    /// top. Clears the redo stack and captures the selection only when an
    /// entry is actually pushed.
    pub fn record_change(
        &mut self,
        html: &str,
        capture: impl FnOnce() -> Option<SelectionSnapshot>,
    ) -> bool {
        if self.current().is_some_and(|top| top.html == html) {
            return false;
        }
        self.redo.clear();
        self.push(html, capture());
        tracing::debug!(target: "frost::history", len = self.entries.len(), "change recorded");
        true
    }

    /// Step back. Returns the entry to restore, `None` at the initial state.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if self.entries.len() < 2 {
            return None;
        }
        let top = self.entries.pop_back()?;
        self.redo.push(top);
        tracing::trace!(target: "frost::history", len = self.entries.len(), "undo");
        self.entries.back()
    }

    /// Step forward. Returns the entry to restore, `None` with nothing to redo.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let entry = self.redo.pop()?;
        self.entries.push_back(entry);
        self.evict();
        tracing::trace!(target: "frost::history", len = self.entries.len(), "redo");
        self.entries.back()
    }

    fn evict(&mut self) {
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.redo.clear();
    }
}
