//! Row/column addressing for tree views.
//!
//! A view walks the tree by `(row, column, parent)` triples. `None` stands
//! for "the invisible root", so top-level rows have no parent index.

use shared::ColumnValue;

use super::{PartId, PartTree};

/// Position of one cell in the tree view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelIndex {
    pub row: usize,
    pub column: usize,
    pub id: PartId,
}

impl PartTree {
    /// Node under which rows live. Only first-column indices have rows.
    fn resolve(&self, parent: Option<&ModelIndex>) -> Option<PartId> {
        match parent {
            None => Some(self.root()),
            Some(index) if index.column == 0 && self.contains(index.id) => Some(index.id),
            Some(_) => None,
        }
    }

    /// Columns shown by the view, taken from the header row
    pub fn model_column_count(&self) -> usize {
        self.column_count(self.root())
    }

    pub fn index(&self, row: usize, column: usize, parent: Option<&ModelIndex>) -> Option<ModelIndex> {
        if column >= self.model_column_count() {
            return None;
        }
        let id = self.child_at(self.resolve(parent)?, row)?;
        Some(ModelIndex { row, column, id })
    }

    /// Index of the part itself (column 0 unless asked otherwise)
    pub fn index_of(&self, id: PartId, column: usize) -> Option<ModelIndex> {
        if id == self.root() || column >= self.model_column_count() {
            return None;
        }
        Some(ModelIndex {
            row: self.row_of(id)?,
            column,
            id,
        })
    }

    /// `None` for top-level rows and stale indices
    pub fn parent_index(&self, index: &ModelIndex) -> Option<ModelIndex> {
        let parent = self.parent_of(index.id)?;
        self.index_of(parent, 0)
    }

    /// Children under `parent`; only column 0 has children
    pub fn row_count(&self, parent: Option<&ModelIndex>) -> usize {
        if parent.is_some_and(|p| p.column > 0) {
            return 0;
        }
        self.resolve(parent).map_or(0, |id| self.child_count(id))
    }

    pub fn data(&self, index: &ModelIndex) -> ColumnValue {
        self.value_at(index.id, index.column)
    }

    pub fn header_data(&self, section: usize) -> ColumnValue {
        self.header(section)
    }

    pub fn append_row(&mut self, parent: Option<&ModelIndex>, columns: Vec<ColumnValue>) -> Option<ModelIndex> {
        let parent = self.resolve(parent)?;
        let id = self.append_new(parent, columns)?;
        self.index_of(id, 0)
    }

    pub fn remove_rows(&mut self, row: usize, count: usize, parent: Option<&ModelIndex>) -> bool {
        match self.resolve(parent) {
            Some(id) => self.remove_children(id, row, count),
            None => false,
        }
    }
}
