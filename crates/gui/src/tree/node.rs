use std::fmt;
use std::sync::Arc;

use shared::{ColumnValue, DisplayFilters, Rgb};

use super::VISIBLE_COLUMN;
use crate::mesh::MeshData;
use crate::render::Renderable;

/// Handle to a node in a [`PartTree`](super::PartTree).
///
/// Slot index plus generation: once the node is destroyed the id stops
/// resolving, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId {
    index: u32,
    generation: u32,
}

impl PartId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn slot(self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// One part: its row of column values, tree links and display state
#[derive(Debug)]
pub struct PartNode {
    pub(crate) columns: Vec<ColumnValue>,
    pub(crate) parent: Option<PartId>,
    pub(crate) children: Vec<PartId>,
    pub(crate) visible: bool,
    pub(crate) filters: DisplayFilters,
    pub(crate) color: Rgb,
    pub(crate) mesh: Option<Arc<MeshData>>,
    /// On-screen renderable; present only while a mesh is loaded
    pub(crate) renderable: Option<Renderable>,
}

impl PartNode {
    pub(crate) fn new(columns: Vec<ColumnValue>, color: Rgb) -> Self {
        let visible = columns
            .get(VISIBLE_COLUMN)
            .and_then(ColumnValue::as_bool)
            .unwrap_or(true);
        Self {
            columns,
            parent: None,
            children: Vec::new(),
            visible,
            filters: DisplayFilters::default(),
            color,
            mesh: None,
            renderable: None,
        }
    }

    pub fn columns(&self) -> &[ColumnValue] {
        &self.columns
    }

    pub fn parent(&self) -> Option<PartId> {
        self.parent
    }

    pub fn children(&self) -> &[PartId] {
        &self.children
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn filters(&self) -> DisplayFilters {
        self.filters
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn mesh(&self) -> Option<&Arc<MeshData>> {
        self.mesh.as_ref()
    }

    pub fn renderable(&self) -> Option<&Renderable> {
        self.renderable.as_ref()
    }

    /// Visible and backed by a mesh
    pub fn is_shown(&self) -> bool {
        self.visible && self.renderable.is_some()
    }
}
