//! Change notifications for views observing a [`PartTree`](super::PartTree).
//!
//! Structural changes come in pairs: the "about to" event fires before any
//! node is touched, the completion event after. A view can fix up its own
//! row bookkeeping before removed nodes are freed.

use super::PartId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// Rows `first..=last` under `parent` are about to appear
    RowsAboutToBeInserted { parent: PartId, first: usize, last: usize },
    RowsInserted { parent: PartId, first: usize, last: usize },
    /// Rows `first..=last` under `parent` are about to be destroyed
    RowsAboutToBeRemoved { parent: PartId, first: usize, last: usize },
    RowsRemoved { parent: PartId, first: usize, last: usize },
    DataChanged { node: PartId, column: usize },
    /// Generic "structure changed", after every structural mutation
    LayoutChanged,
}

impl TreeEvent {
    pub fn is_structural(&self) -> bool {
        !matches!(self, TreeEvent::DataChanged { .. })
    }
}

/// Returns `false` once it should be dropped
pub(crate) type Observer = Box<dyn FnMut(&TreeEvent) -> bool + Send>;
