//! Factory functions for test data and the demo session.
//!
//! Provides the demo part tree, ready-made meshes and STL files written to
//! a caller-supplied directory.

use std::path::{Path, PathBuf};

use shared::ColumnValue;

use crate::mesh::{cube, encode_binary_stl, MeshData};
use crate::tree::{PartId, PartTree};

// ── Part trees ──────────────────────────────────────────────────

/// Column values for a part row
pub fn part_row(name: &str, visible: bool) -> Vec<ColumnValue> {
    vec![ColumnValue::from(name), ColumnValue::Bool(visible)]
}

/// Three "TopLevel i" parts with five "Item i,j" children each
pub fn populate_demo(tree: &mut PartTree) -> Vec<PartId> {
    let root = tree.root();
    let mut top_level = Vec::new();
    for i in 0..3 {
        let Some(top) = tree.append_new(root, part_row(&format!("TopLevel {i}"), true)) else {
            continue;
        };
        for j in 0..5 {
            tree.append_new(top, part_row(&format!("Item {i},{j}"), true));
        }
        top_level.push(top);
    }
    top_level
}

pub fn demo_tree() -> PartTree {
    let mut tree = PartTree::default();
    populate_demo(&mut tree);
    tree
}

// ── Meshes ──────────────────────────────────────────────────────

pub fn unit_cube() -> MeshData {
    cube(1.0, 1.0, 1.0)
}

/// Single triangle in the XY plane
pub fn triangle() -> MeshData {
    let mut mesh = MeshData::new();
    mesh.push_triangle([
        glam::Vec3::ZERO,
        glam::Vec3::X,
        glam::Vec3::Y,
    ]);
    mesh
}

// ── STL files ───────────────────────────────────────────────────

/// Write `mesh` as binary STL to `dir/name`
pub fn write_stl(dir: &Path, name: &str, mesh: &MeshData) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, encode_binary_stl(mesh))?;
    Ok(path)
}

/// Binary STL of a `size` cube, written to `dir`
pub fn write_cube_stl(dir: &Path, size: f32) -> std::io::Result<PathBuf> {
    write_stl(dir, &format!("cube-{size}.stl"), &cube(size, size, size))
}

/// ASCII STL text with one facet
pub fn ascii_triangle_stl() -> String {
    "solid tri\n\
     facet normal 0 0 1\n\
     outer loop\n\
     vertex 0 0 0\n\
     vertex 1 0 0\n\
     vertex 0 1 0\n\
     endloop\n\
     endfacet\n\
     endsolid tri\n"
        .to_string()
}
