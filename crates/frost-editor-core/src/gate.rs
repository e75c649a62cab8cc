//! Mutation observation gate.
//!
//! Programmatic DOM changes (normalization, command execution, history
//! restoration) happen inside a `suppress`/`resume` scope so they don't feed
//! back into the reactive pipeline. Scopes nest; only the outermost one
//! disconnects and reconnects the observer. Records still queued when the
//! observer is disconnected are counted, and the outermost `resume` reports
//! that one reactive pass is owed for all of them together.

/// Something that watches the editable root for mutations.
pub trait MutationSource {
    /// Start (or restart) delivering mutation records.
    fn observe(&mut self);

    /// Stop observing. Returns how many records were queued but not yet
    /// delivered.
    fn disconnect(&mut self) -> usize;
}

/// Re-entrant suppress/resume counter around a [`MutationSource`].
#[derive(Debug)]
pub struct ObserveGate<O> {
    source: O,
    depth: u32,
    pending: usize,
}

impl<O: MutationSource> ObserveGate<O> {
    /// Wrap `source` and start observing.
    pub fn new(mut source: O) -> Self {
        source.observe();
        Self {
            source,
            depth: 0,
            pending: 0,
        }
    }

    pub fn suppress(&mut self) {
        self.depth += 1;
        if self.depth == 1 {
            let taken = self.source.disconnect();
            self.pending += taken;
            tracing::trace!(target: "frost::gate", taken, "observation suppressed");
        }
    }

    /// Leave a suppressed scope.
    ///
    /// Returns `true` exactly when this was the outermost scope and records
    /// were taken while suppressing; the caller then runs the reactive handler
    /// once.
    #[must_use = "a true result means a reactive pass is owed"]
    pub fn resume(&mut self) -> bool {
        if self.depth == 0 {
            tracing::warn!(target: "frost::gate", "resume without matching suppress");
            return false;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return false;
        }
        self.source.observe();
        let pending = std::mem::take(&mut self.pending);
        tracing::trace!(target: "frost::gate", pending, "observation resumed");
        pending > 0
    }

    /// True when mutations are currently being observed.
    pub fn is_observing(&self) -> bool {
        self.depth == 0
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Disconnect for good, discarding anything queued.
    pub fn shutdown(&mut self) {
        let dropped = self.source.disconnect();
        self.pending = 0;
        tracing::trace!(target: "frost::gate", dropped, "observation shut down");
    }

    pub fn source(&self) -> &O {
        &self.source
    }
}
