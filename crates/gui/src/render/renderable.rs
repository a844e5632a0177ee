//! Renderable handles.
//!
//! A part with a loaded mesh owns one default renderable for the on-screen
//! viewport. Extra handles for other surfaces (the headset) are derived with
//! [`Renderable::link`]: they get their own id but share the source mesh and
//! the visual property cell, so color, visibility and filtered geometry set
//! through any handle show up on every surface.

use std::sync::{Arc, Mutex, MutexGuard};

use shared::Rgb;
use uuid::Uuid;

use crate::mesh::MeshData;

/// Visual state shared by linked renderables
#[derive(Debug, Clone)]
pub struct VisualProps {
    pub color: Rgb,
    pub visible: bool,
    /// Geometry after display filters
    pub geometry: Arc<MeshData>,
}

#[derive(Debug, Clone)]
pub struct Renderable {
    id: Uuid,
    source: Arc<MeshData>,
    props: Arc<Mutex<VisualProps>>,
}

impl Renderable {
    pub fn new(source: Arc<MeshData>, color: Rgb, visible: bool) -> Self {
        let props = VisualProps {
            color,
            visible,
            geometry: source.clone(),
        };
        Self {
            id: Uuid::new_v4(),
            source,
            props: Arc::new(Mutex::new(props)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Mesh as loaded, before filters
    pub fn source(&self) -> &Arc<MeshData> {
        &self.source
    }

    /// A second handle for another display surface.
    ///
    /// No mesh data is copied.
    pub fn link(&self) -> Renderable {
        Renderable {
            id: Uuid::new_v4(),
            source: self.source.clone(),
            props: self.props.clone(),
        }
    }

    pub fn is_linked_to(&self, other: &Renderable) -> bool {
        Arc::ptr_eq(&self.props, &other.props)
    }

    fn lock(&self) -> MutexGuard<'_, VisualProps> {
        self.props.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn color(&self) -> Rgb {
        self.lock().color
    }

    pub fn set_color(&self, color: Rgb) {
        self.lock().color = color;
    }

    pub fn is_visible(&self) -> bool {
        self.lock().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.lock().visible = visible;
    }

    pub fn geometry(&self) -> Arc<MeshData> {
        self.lock().geometry.clone()
    }

    pub fn set_geometry(&self, geometry: Arc<MeshData>) {
        self.lock().geometry = geometry;
    }

    /// Copy of the current visual state (geometry is shared, not copied)
    pub fn snapshot(&self) -> VisualProps {
        self.lock().clone()
    }
}
