//! Part tree
//!
//! An arena of [`PartNode`]s addressed by [`PartId`]. Each node owns its
//! ordered children; the parent link is a plain id, so the structure is
//! acyclic by construction and removing a node frees its subtree depth-first.
//! Rows are never stored: `row_of` looks the node up in its parent's list.

mod display;
mod events;
mod model;
mod node;
mod properties;

use std::sync::mpsc::{self, Receiver};

use shared::{ColumnValue, Rgb};

pub use events::TreeEvent;
pub use model::ModelIndex;
pub use node::{PartId, PartNode};

use crate::config::{FilterSettings, ViewerSettings};
use events::Observer;

/// Column holding the part name
pub const NAME_COLUMN: usize = 0;
/// Column mirroring the visibility flag
pub const VISIBLE_COLUMN: usize = 1;

struct Slot {
    generation: u32,
    node: Option<PartNode>,
}

pub struct PartTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: PartId,
    observers: Vec<Observer>,
    pub(crate) default_color: Rgb,
    pub(crate) filter_settings: FilterSettings,
}

impl Default for PartTree {
    fn default() -> Self {
        Self::with_settings(&ViewerSettings::default())
    }
}

impl PartTree {
    /// Create a tree whose root row holds `headers`
    pub fn new(headers: Vec<ColumnValue>) -> Self {
        let default_color = Rgb::default();
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: PartId::new(0, 0),
            observers: Vec::new(),
            default_color,
            filter_settings: FilterSettings::default(),
        };
        tree.root = tree.alloc(PartNode::new(headers, default_color));
        tree
    }

    pub fn with_settings(settings: &ViewerSettings) -> Self {
        let mut tree = Self::new(settings.header_row());
        tree.default_color = settings.default_color;
        tree.filter_settings = settings.filters.clone();
        tree
    }

    pub fn root(&self) -> PartId {
        self.root
    }

    /// Live nodes, including the root and detached nodes
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn contains(&self, id: PartId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: PartId) -> Option<&PartNode> {
        self.slots
            .get(id.slot())
            .filter(|s| s.generation == id.generation())
            .and_then(|s| s.node.as_ref())
    }

    pub(crate) fn node_mut(&mut self, id: PartId) -> Option<&mut PartNode> {
        self.slots
            .get_mut(id.slot())
            .filter(|s| s.generation == id.generation())
            .and_then(|s| s.node.as_mut())
    }

    fn alloc(&mut self, node: PartNode) -> PartId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return PartId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        PartId::new(index, 0)
    }

    // ── Structure ─────────────────────────────────────────────

    /// Create a node that is not yet part of the tree. Its visibility cell
    /// is stored as the `Bool` the flag was read from.
    pub fn create_node(&mut self, columns: Vec<ColumnValue>) -> PartId {
        let mut node = PartNode::new(columns, self.default_color);
        if let Some(cell) = node.columns.get_mut(VISIBLE_COLUMN) {
            *cell = ColumnValue::Bool(node.visible);
        }
        self.alloc(node)
    }

    /// Attach `node` as the last child of `parent`.
    ///
    /// A node already in the tree is moved. Refused if either id is stale,
    /// if `node` is the root, or if `parent` lies inside `node`'s subtree.
    pub fn append_child(&mut self, parent: PartId, node: PartId) -> bool {
        if !self.contains(parent) || !self.contains(node) || node == self.root {
            return false;
        }
        if parent == node || self.is_ancestor(node, parent) {
            tracing::warn!("Refusing to append part {node} under its own subtree");
            return false;
        }

        if let Some(old_parent) = self.parent_of(node) {
            if let Some(row) = self.row_of(node) {
                self.emit(TreeEvent::RowsAboutToBeRemoved {
                    parent: old_parent,
                    first: row,
                    last: row,
                });
                if let Some(p) = self.node_mut(old_parent) {
                    p.children.remove(row);
                }
                self.emit(TreeEvent::RowsRemoved {
                    parent: old_parent,
                    first: row,
                    last: row,
                });
            }
        }

        let row = self.child_count(parent);
        self.emit(TreeEvent::RowsAboutToBeInserted {
            parent,
            first: row,
            last: row,
        });
        if let Some(p) = self.node_mut(parent) {
            p.children.push(node);
        }
        if let Some(n) = self.node_mut(node) {
            n.parent = Some(parent);
        }
        self.emit(TreeEvent::RowsInserted {
            parent,
            first: row,
            last: row,
        });
        self.emit(TreeEvent::LayoutChanged);
        true
    }

    /// Create a node and append it under `parent` in one step
    pub fn append_new(&mut self, parent: PartId, columns: Vec<ColumnValue>) -> Option<PartId> {
        if !self.contains(parent) {
            return None;
        }
        let id = self.create_node(columns);
        self.append_child(parent, id);
        Some(id)
    }

    /// Remove `count` children of `parent` starting at `start_row` and free
    /// their subtrees. Out-of-range requests change nothing and return false.
    pub fn remove_children(&mut self, parent: PartId, start_row: usize, count: usize) -> bool {
        let n = self.child_count(parent);
        let end = match start_row.checked_add(count) {
            Some(end) if count > 0 && end <= n && self.contains(parent) => end,
            _ => return false,
        };

        self.emit(TreeEvent::RowsAboutToBeRemoved {
            parent,
            first: start_row,
            last: end - 1,
        });
        let removed: Vec<PartId> = match self.node_mut(parent) {
            Some(p) => p.children.drain(start_row..end).collect(),
            None => Vec::new(),
        };
        let freed: usize = removed.into_iter().map(|id| self.destroy_subtree(id)).sum();
        self.emit(TreeEvent::RowsRemoved {
            parent,
            first: start_row,
            last: end - 1,
        });
        self.emit(TreeEvent::LayoutChanged);

        tracing::debug!("Removed {count} rows under part {parent} ({freed} nodes freed)");
        true
    }

    /// Free a node that was created but never attached (or has been moved
    /// out), together with its children
    pub fn discard(&mut self, id: PartId) -> bool {
        match self.node(id) {
            Some(n) if n.parent.is_none() && id != self.root => {
                self.destroy_subtree(id);
                true
            }
            _ => false,
        }
    }

    fn destroy_subtree(&mut self, id: PartId) -> usize {
        let mut freed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self.slots.get_mut(current.slot()) else {
                continue;
            };
            if slot.generation != current.generation() {
                continue;
            }
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.slot() as u32);
                freed += 1;
            }
        }
        freed
    }

    /// Remove every top-level part
    pub fn clear(&mut self) {
        let n = self.child_count(self.root);
        if n > 0 {
            self.remove_children(self.root, 0, n);
        }
    }

    // ── Addressing ────────────────────────────────────────────

    pub fn child_at(&self, parent: PartId, row: usize) -> Option<PartId> {
        self.node(parent)?.children.get(row).copied()
    }

    pub fn child_count(&self, parent: PartId) -> usize {
        self.node(parent).map_or(0, |n| n.children.len())
    }

    pub fn column_count(&self, node: PartId) -> usize {
        self.node(node).map_or(0, |n| n.columns.len())
    }

    pub fn value_at(&self, node: PartId, column: usize) -> ColumnValue {
        self.node(node)
            .and_then(|n| n.columns.get(column))
            .cloned()
            .unwrap_or_default()
    }

    /// Replace a column value. Below the header row the visibility column
    /// only takes booleans (or "true"/"false"), stored as `Bool`, and
    /// updates the visibility flag.
    pub fn set_value_at(&mut self, node: PartId, column: usize, value: ColumnValue) -> bool {
        let is_header = node == self.root;
        let Some(n) = self.node_mut(node) else {
            return false;
        };
        if column >= n.columns.len() {
            return false;
        }
        let value = if column == VISIBLE_COLUMN && !is_header {
            let Some(visible) = value.as_bool() else {
                tracing::warn!("Refusing non-boolean visibility {value:?} for part {node}");
                return false;
            };
            n.visible = visible;
            if let Some(r) = &n.renderable {
                r.set_visible(visible);
            }
            ColumnValue::Bool(visible)
        } else {
            value
        };
        n.columns[column] = value;
        self.emit(TreeEvent::DataChanged { node, column });
        true
    }

    /// Position among siblings, found by scanning the parent's children.
    /// The root is row 0; detached or stale nodes have no row.
    pub fn row_of(&self, node: PartId) -> Option<usize> {
        if node == self.root {
            return Some(0);
        }
        let parent = self.node(node)?.parent?;
        self.node(parent)?.children.iter().position(|c| *c == node)
    }

    pub fn parent_of(&self, node: PartId) -> Option<PartId> {
        self.node(node)?.parent
    }

    /// True if `ancestor` is a strict ancestor of `node`
    pub fn is_ancestor(&self, ancestor: PartId, node: PartId) -> bool {
        let mut current = self.parent_of(node);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent_of(p);
        }
        false
    }

    /// Every node below `id`, depth-first pre-order, `id` excluded
    pub fn descendants(&self, id: PartId) -> Vec<PartId> {
        let mut out = Vec::new();
        let mut stack: Vec<PartId> = match self.node(id) {
            Some(n) => n.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(n) = self.node(current) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    /// Rows from the root down to `id`
    pub fn path_of(&self, id: PartId) -> Option<Vec<usize>> {
        if !self.contains(id) {
            return None;
        }
        let mut path = Vec::new();
        let mut current = id;
        while current != self.root {
            path.push(self.row_of(current)?);
            current = self.parent_of(current)?;
        }
        path.reverse();
        Some(path)
    }

    pub fn node_at_path(&self, path: &[usize]) -> Option<PartId> {
        path.iter()
            .try_fold(self.root, |current, row| self.child_at(current, *row))
    }

    /// Column header (the root's value for `column`)
    pub fn header(&self, column: usize) -> ColumnValue {
        self.value_at(self.root, column)
    }

    // ── Notifications ─────────────────────────────────────────

    pub fn subscribe(&mut self, mut observer: impl FnMut(&TreeEvent) + Send + 'static) {
        self.observers.push(Box::new(move |event| {
            observer(event);
            true
        }));
    }

    /// Receive every future event on a channel. The subscription ends at the
    /// first event emitted after the receiver is dropped.
    pub fn event_channel(&mut self) -> Receiver<TreeEvent> {
        let (tx, rx) = mpsc::channel();
        self.observers
            .push(Box::new(move |event| tx.send(event.clone()).is_ok()));
        rx
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn emit(&mut self, event: TreeEvent) {
        self.observers.retain_mut(|observer| observer(&event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str) -> Vec<ColumnValue> {
        vec![ColumnValue::from(name), ColumnValue::from("true")]
    }

    fn tree_with(n: usize) -> (PartTree, Vec<PartId>) {
        let mut tree = PartTree::default();
        let root = tree.root();
        let ids = (0..n)
            .map(|i| tree.append_new(root, row(&format!("P{i}"))).unwrap())
            .collect();
        (tree, ids)
    }

    #[test]
    fn test_append_sets_parent_and_row() {
        let (tree, ids) = tree_with(3);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(tree.parent_of(*id), Some(tree.root()));
            assert_eq!(tree.row_of(*id), Some(i));
            assert_eq!(tree.child_at(tree.root(), i), Some(*id));
        }
        assert_eq!(tree.parent_of(tree.root()), None);
        assert_eq!(tree.row_of(tree.root()), Some(0));
    }

    #[test]
    fn test_detached_node_is_unreachable() {
        let mut tree = PartTree::default();
        let id = tree.create_node(row("loose"));
        assert!(tree.contains(id));
        assert_eq!(tree.row_of(id), None);
        assert!(tree.descendants(tree.root()).is_empty());
        assert!(tree.discard(id));
        assert!(!tree.contains(id));
    }

    #[test]
    fn test_remove_shifts_following_rows() {
        let (mut tree, ids) = tree_with(5);
        let root = tree.root();
        assert!(tree.remove_children(root, 1, 2));
        assert_eq!(tree.child_count(root), 3);
        assert_eq!(tree.child_at(root, 1), Some(ids[3]));
        assert_eq!(tree.row_of(ids[3]), Some(1));
        assert!(!tree.contains(ids[1]));
        assert!(!tree.contains(ids[2]));
        assert_eq!(tree.row_of(ids[2]), None);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let (mut tree, _) = tree_with(3);
        let root = tree.root();
        let events = tree.event_channel();
        assert!(!tree.remove_children(root, 3, 1));
        assert!(!tree.remove_children(root, 2, 2));
        assert!(!tree.remove_children(root, 0, 0));
        assert!(!tree.remove_children(root, usize::MAX, 2));
        assert_eq!(tree.child_count(root), 3);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_remove_frees_whole_subtree() {
        let (mut tree, ids) = tree_with(1);
        let child = tree.append_new(ids[0], row("c")).unwrap();
        let grandchild = tree.append_new(child, row("g")).unwrap();
        assert_eq!(tree.node_count(), 4);

        assert!(tree.remove_children(tree.root(), 0, 1));
        assert_eq!(tree.node_count(), 1);
        assert!(!tree.contains(child));
        assert!(!tree.contains(grandchild));
    }

    #[test]
    fn test_stale_id_does_not_resolve_after_slot_reuse() {
        let (mut tree, ids) = tree_with(1);
        tree.remove_children(tree.root(), 0, 1);
        let fresh = tree.append_new(tree.root(), row("new")).unwrap();
        assert_ne!(fresh, ids[0]);
        assert!(!tree.contains(ids[0]));
        assert_eq!(tree.value_at(ids[0], 0), ColumnValue::Empty);
        assert!(!tree.set_value_at(ids[0], 0, "x".into()));
    }

    #[test]
    fn test_append_refuses_cycles() {
        let (mut tree, ids) = tree_with(1);
        let child = tree.append_new(ids[0], row("c")).unwrap();
        assert!(!tree.append_child(child, ids[0]));
        assert!(!tree.append_child(ids[0], ids[0]));
        assert!(!tree.append_child(child, tree.root()));
        assert_eq!(tree.parent_of(ids[0]), Some(tree.root()));
    }

    #[test]
    fn test_append_moves_attached_node() {
        let (mut tree, ids) = tree_with(3);
        assert!(tree.append_child(ids[2], ids[0]));
        assert_eq!(tree.child_count(tree.root()), 2);
        assert_eq!(tree.row_of(ids[1]), Some(0));
        assert_eq!(tree.parent_of(ids[0]), Some(ids[2]));
        assert_eq!(tree.path_of(ids[0]), Some(vec![1, 0]));
    }

    #[test]
    fn test_out_of_range_accessors() {
        let (mut tree, ids) = tree_with(1);
        assert_eq!(tree.child_at(ids[0], 0), None);
        assert_eq!(tree.child_at(tree.root(), 7), None);
        assert_eq!(tree.value_at(ids[0], 2), ColumnValue::Empty);
        assert!(!tree.set_value_at(ids[0], 2, "x".into()));
        assert_eq!(tree.column_count(ids[0]), 2);
    }

    #[test]
    fn test_visibility_column_drives_flag() {
        let (mut tree, ids) = tree_with(1);
        assert!(tree.node(ids[0]).unwrap().is_visible());
        assert!(tree.set_value_at(ids[0], VISIBLE_COLUMN, ColumnValue::Bool(false)));
        assert!(!tree.node(ids[0]).unwrap().is_visible());

        let hidden = tree.create_node(vec!["h".into(), "false".into()]);
        assert!(!tree.node(hidden).unwrap().is_visible());
        assert_eq!(tree.value_at(hidden, VISIBLE_COLUMN), ColumnValue::Bool(false));
    }

    #[test]
    fn test_visibility_column_refuses_non_booleans() {
        let (mut tree, ids) = tree_with(1);
        let id = ids[0];
        tree.set_visible(id, false);

        assert!(!tree.set_value_at(id, VISIBLE_COLUMN, ColumnValue::Number(1.0)));
        assert!(!tree.set_value_at(id, VISIBLE_COLUMN, ColumnValue::from("hidden")));
        assert_eq!(tree.value_at(id, VISIBLE_COLUMN), ColumnValue::Bool(false));
        assert!(!tree.is_visible(id));

        assert!(tree.set_value_at(id, VISIBLE_COLUMN, ColumnValue::from("true")));
        assert_eq!(tree.value_at(id, VISIBLE_COLUMN), ColumnValue::Bool(true));
        assert!(tree.is_visible(id));

        // Other columns take anything
        assert!(tree.set_value_at(id, 0, ColumnValue::Number(7.0)));

        // Stored as Bool from creation; the header row keeps its text
        assert_eq!(tree.value_at(id, VISIBLE_COLUMN), ColumnValue::Bool(true));
        let fresh = tree.create_node(row("Fresh"));
        assert_eq!(tree.value_at(fresh, VISIBLE_COLUMN), ColumnValue::Bool(true));
        assert_eq!(tree.header(VISIBLE_COLUMN), ColumnValue::from("Visible?"));
        assert!(tree.set_value_at(tree.root(), VISIBLE_COLUMN, ColumnValue::from("Shown")));
        assert_eq!(tree.header(VISIBLE_COLUMN), ColumnValue::from("Shown"));
    }

    #[test]
    fn test_dropped_event_channel_unsubscribes() {
        let mut tree = PartTree::default();
        let root = tree.root();
        tree.subscribe(|_| {});
        let kept = tree.event_channel();
        let dropped = tree.event_channel();
        assert_eq!(tree.observer_count(), 3);

        drop(dropped);
        let a = tree.append_new(root, row("A")).unwrap();
        assert_eq!(tree.observer_count(), 2);
        assert_eq!(kept.try_iter().count(), 3);

        drop(kept);
        tree.set_name(a, "B");
        assert_eq!(tree.observer_count(), 1);
    }

    #[test]
    fn test_removal_events_bracket_destruction() {
        let (mut tree, ids) = tree_with(3);
        let root = tree.root();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        {
            let seen = seen.clone();
            tree.subscribe(move |e| seen.lock().unwrap().push(e.clone()));
        }
        tree.remove_children(root, 0, 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                TreeEvent::RowsAboutToBeRemoved { parent: root, first: 0, last: 1 },
                TreeEvent::RowsRemoved { parent: root, first: 0, last: 1 },
                TreeEvent::LayoutChanged,
            ]
        );
        assert!(tree.contains(ids[2]));
    }

    #[test]
    fn test_path_round_trip() {
        let (mut tree, ids) = tree_with(2);
        let deep = tree.append_new(ids[1], row("deep")).unwrap();
        let path = tree.path_of(deep).unwrap();
        assert_eq!(path, vec![1, 0]);
        assert_eq!(tree.node_at_path(&path), Some(deep));
        assert_eq!(tree.node_at_path(&[]), Some(tree.root()));
        assert_eq!(tree.node_at_path(&[5]), None);
    }

    #[test]
    fn test_headers_come_from_settings() {
        let tree = PartTree::default();
        assert_eq!(tree.header(0), ColumnValue::from("Part"));
        assert_eq!(tree.header(1), ColumnValue::from("Visible?"));
        assert_eq!(tree.header(2), ColumnValue::Empty);
    }

    /// Deterministic xorshift so the sequence test is reproducible
    struct Rng(u64);

    impl Rng {
        fn next(&mut self, bound: usize) -> usize {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            (self.0 % bound as u64) as usize
        }
    }

    #[test]
    fn test_random_append_remove_keeps_invariants() {
        let mut tree = PartTree::default();
        let mut rng = Rng(0x9E37_79B9_7F4A_7C15);
        let mut expected_parent = std::collections::HashMap::new();

        for step in 0..2000 {
            let mut live = vec![tree.root()];
            live.extend(tree.descendants(tree.root()));
            let parent = live[rng.next(live.len())];

            if rng.next(3) > 0 {
                let id = tree.append_new(parent, row(&format!("n{step}"))).unwrap();
                expected_parent.insert(id, parent);
            } else {
                let n = tree.child_count(parent);
                let start = rng.next(n + 2);
                let count = rng.next(3);
                let ok = tree.remove_children(parent, start, count);
                assert_eq!(ok, count > 0 && start + count <= n);
            }

            for id in tree.descendants(tree.root()) {
                let parent = tree.parent_of(id).unwrap();
                assert_eq!(expected_parent.get(&id), Some(&parent));
                let row = tree.row_of(id).unwrap();
                assert_eq!(tree.child_at(parent, row), Some(id));
                assert!(!tree.is_ancestor(id, parent));
            }
        }
        assert_eq!(tree.node_count(), tree.descendants(tree.root()).len() + 1);
    }
}
