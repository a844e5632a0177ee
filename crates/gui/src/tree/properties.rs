//! Property commands on parts: name, visibility, color and display filters.

use shared::{ColumnValue, DisplayFilters, PartProperties, Rgb};

use super::{PartId, PartTree, TreeEvent, NAME_COLUMN, VISIBLE_COLUMN};

impl PartTree {
    pub fn name(&self, id: PartId) -> String {
        self.value_at(id, NAME_COLUMN).to_string()
    }

    pub fn set_name(&mut self, id: PartId, name: impl Into<String>) -> bool {
        self.set_value_at(id, NAME_COLUMN, ColumnValue::Text(name.into()))
    }

    pub fn is_visible(&self, id: PartId) -> bool {
        self.node(id).is_some_and(|n| n.visible)
    }

    /// Set the flag, mirror it into the visibility column and push it to
    /// every linked renderable
    pub fn set_visible(&mut self, id: PartId, visible: bool) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        node.visible = visible;
        let mirrored = VISIBLE_COLUMN < node.columns.len();
        if mirrored {
            node.columns[VISIBLE_COLUMN] = ColumnValue::Bool(visible);
        }
        if let Some(r) = &node.renderable {
            r.set_visible(visible);
        }
        if mirrored {
            self.emit(TreeEvent::DataChanged {
                node: id,
                column: VISIBLE_COLUMN,
            });
        }
        true
    }

    pub fn color(&self, id: PartId) -> Option<Rgb> {
        self.node(id).map(|n| n.color)
    }

    pub fn set_color(&mut self, id: PartId, color: Rgb) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        node.color = color;
        if let Some(r) = &node.renderable {
            r.set_color(color);
        }
        true
    }

    pub fn clip(&self, id: PartId) -> bool {
        self.node(id).is_some_and(|n| n.filters.clip)
    }

    /// Takes visual effect on the next [`refresh_pipeline`](Self::refresh_pipeline)
    pub fn set_clip(&mut self, id: PartId, on: bool) -> bool {
        self.node_mut(id).map(|n| n.filters.clip = on).is_some()
    }

    pub fn shrink(&self, id: PartId) -> bool {
        self.node(id).is_some_and(|n| n.filters.shrink)
    }

    /// Takes visual effect on the next [`refresh_pipeline`](Self::refresh_pipeline)
    pub fn set_shrink(&mut self, id: PartId, on: bool) -> bool {
        self.node_mut(id).map(|n| n.filters.shrink = on).is_some()
    }

    pub fn filters(&self, id: PartId) -> DisplayFilters {
        self.node(id).map(|n| n.filters).unwrap_or_default()
    }

    /// Snapshot for the property form
    pub fn properties(&self, id: PartId) -> Option<PartProperties> {
        let node = self.node(id)?;
        Some(PartProperties {
            name: self.name(id),
            visible: node.visible,
            color: node.color,
            clip: node.filters.clip,
            shrink: node.filters.shrink,
        })
    }

    /// Write back an edited form and rebuild the displayed geometry
    pub fn apply_properties(&mut self, id: PartId, props: &PartProperties) -> bool {
        if !self.contains(id) {
            return false;
        }
        if self.name(id) != props.name {
            self.set_name(id, props.name.clone());
        }
        if self.is_visible(id) != props.visible {
            self.set_visible(id, props.visible);
        }
        self.set_color(id, props.color);
        self.set_clip(id, props.clip);
        self.set_shrink(id, props.shrink);
        self.refresh_pipeline(id);
        true
    }
}
