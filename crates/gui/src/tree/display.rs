//! Mesh loading and the display pipeline of a part

use std::path::Path;
use std::sync::Arc;

use super::{PartId, PartTree};
use crate::error::MeshLoadError;
use crate::mesh::{apply_filters, MeshReader, StlReader};
use crate::render::Renderable;

impl PartTree {
    /// Load an STL file into `id`
    pub fn load_mesh(&mut self, id: PartId, path: &Path) -> Result<(), MeshLoadError> {
        self.load_mesh_with(id, path, &StlReader)
    }

    /// Load a mesh through `reader` and create the part's default renderable.
    ///
    /// On failure any previous mesh is dropped: the part stays in the tree
    /// but is no longer shown.
    pub fn load_mesh_with(
        &mut self,
        id: PartId,
        path: &Path,
        reader: &dyn MeshReader,
    ) -> Result<(), MeshLoadError> {
        if !self.contains(id) {
            return Err(MeshLoadError::UnknownPart);
        }

        let mesh = match reader.read(path).and_then(|mesh| mesh.validate().map(|()| mesh)) {
            Ok(mesh) => Arc::new(mesh),
            Err(e) => {
                tracing::error!("Failed to load mesh {} into part {id}: {e}", path.display());
                if let Some(node) = self.node_mut(id) {
                    node.mesh = None;
                    node.renderable = None;
                }
                return Err(e);
            }
        };

        let triangles = mesh.triangle_count();
        if let Some(node) = self.node_mut(id) {
            node.renderable = Some(Renderable::new(mesh.clone(), node.color, node.visible));
            node.mesh = Some(mesh);
        }
        self.refresh_pipeline(id);
        tracing::info!("Loaded {} ({triangles} triangles) into part {id}", path.display());
        Ok(())
    }

    /// Recompute the filtered geometry shown by the part's renderables.
    /// Returns false when the part has no mesh.
    pub fn refresh_pipeline(&mut self, id: PartId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let (Some(mesh), Some(renderable)) = (&node.mesh, &node.renderable) else {
            return false;
        };
        let geometry = if node.filters == Default::default() {
            mesh.clone()
        } else {
            Arc::new(apply_filters(mesh, node.filters, &self.filter_settings))
        };
        tracing::debug!(
            "Part {id} pipeline: {:?}, {} triangles shown",
            node.filters,
            geometry.triangle_count()
        );
        renderable.set_geometry(geometry);
        true
    }

    pub fn has_mesh(&self, id: PartId) -> bool {
        self.node(id).is_some_and(|n| n.mesh.is_some())
    }

    /// The on-screen renderable, if a mesh is loaded
    pub fn default_renderable(&self, id: PartId) -> Option<Renderable> {
        self.node(id)?.renderable.clone()
    }

    /// A new handle for another display surface, sharing mesh and visual
    /// properties with the default renderable
    pub fn create_independent_renderable(&self, id: PartId) -> Option<Renderable> {
        self.node(id)?.renderable.as_ref().map(Renderable::link)
    }

    /// Parts with a mesh, in tree order, paired with their renderables
    pub fn renderables(&self) -> Vec<(PartId, Renderable)> {
        self.descendants(self.root())
            .into_iter()
            .filter_map(|id| Some((id, self.node(id)?.renderable.clone()?)))
            .collect()
    }

    /// Parts that are currently shown: visible, with a mesh, and not hidden
    /// by a hidden ancestor
    pub fn shown_parts(&self) -> Vec<PartId> {
        let mut out = Vec::new();
        let mut stack: Vec<PartId> = self
            .node(self.root())
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            if node.renderable.is_some() {
                out.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }
}
