//! Integration tests for mesh loading and the viewer session.
//!
//! Loads real STL files from a temporary directory and checks what the
//! on-screen and headset renderables see.

use std::sync::Arc;
use std::time::{Duration, Instant};

use partview_lib::fixtures::{self, write_cube_stl};
use tempfile::TempDir;
use partview_lib::error::MeshLoadError;
use partview_lib::mesh::MeshData;
use partview_lib::render::RenderLoopState;
use partview_lib::session::ViewerSession;
use shared::{Axis, Rgb};

fn surface_area(mesh: &MeshData) -> f32 {
    mesh.triangles()
        .map(|[a, b, c]| (b - a).cross(c - a).length() * 0.5)
        .sum()
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}

#[test]
fn test_load_cube_and_hide_it() {
    let dir = TempDir::new().unwrap();
    let path = write_cube_stl(dir.path(), 2.0).unwrap();
    let mut session = ViewerSession::default();
    let part = session.add_part(None, "Cube").unwrap();

    session.load_mesh(part, &path).unwrap();
    assert!(session.tree.has_mesh(part));
    assert_eq!(session.tree.shown_parts(), vec![part]);

    session.tree.set_color(part, Rgb::new(255, 0, 0));
    session.tree.set_visible(part, false);

    let props = session.tree.default_renderable(part).unwrap().snapshot();
    assert_eq!(props.color, Rgb::new(255, 0, 0));
    assert!(!props.visible);
    assert_eq!(props.geometry.triangle_count(), 12);
    assert!(session.tree.shown_parts().is_empty());
    assert_eq!(session.last_status(), Some(format!(
        "Loaded {} into Cube",
        path.file_name().unwrap().to_string_lossy()
    ).as_str()));
}

#[test]
fn test_hidden_parent_hides_children() {
    let dir = TempDir::new().unwrap();
    let path = write_cube_stl(dir.path(), 1.0).unwrap();
    let mut session = ViewerSession::default();
    let assembly = session.add_part(None, "Assembly").unwrap();
    let wheel = session.add_part(Some(assembly), "Wheel").unwrap();
    session.load_mesh(wheel, &path).unwrap();

    assert_eq!(session.tree.shown_parts(), vec![wheel]);
    session.tree.set_visible(assembly, false);
    assert!(session.tree.shown_parts().is_empty());
    // The child keeps its own flag
    assert!(session.tree.is_visible(wheel));
}

#[test]
fn test_filters_change_shown_geometry_only() {
    let dir = TempDir::new().unwrap();
    let path = write_cube_stl(dir.path(), 2.0).unwrap();
    let mut session = ViewerSession::default();
    let part = session.add_part(None, "Block").unwrap();
    session.load_mesh(part, &path).unwrap();

    let renderable = session.tree.default_renderable(part).unwrap();
    let source = renderable.source().clone();

    session.tree.set_shrink(part, true);
    assert!(Arc::ptr_eq(&renderable.geometry(), &source));
    assert!(session.tree.refresh_pipeline(part));
    let shrunk = renderable.geometry();
    assert!(!Arc::ptr_eq(&shrunk, &source));
    assert_eq!(shrunk.triangle_count(), source.triangle_count());
    // Default shrink factor 0.8 scales every triangle's area by 0.64
    let ratio = surface_area(&shrunk) / surface_area(&source);
    assert!((ratio - 0.64).abs() < 1e-3);
    let full = source.bounds().unwrap();

    session.tree.set_shrink(part, false);
    session.tree.set_clip(part, true);
    session.tree.refresh_pipeline(part);
    let clipped = renderable.geometry().bounds().unwrap();
    assert!(clipped.min.y >= -1e-4);
    assert!((clipped.max.y - full.max.y).abs() < 1e-4);

    session.tree.set_clip(part, false);
    session.tree.refresh_pipeline(part);
    assert!(Arc::ptr_eq(&renderable.geometry(), &source));
}

#[test]
fn test_failed_load_keeps_part_without_mesh() {
    let dir = TempDir::new().unwrap();
    let good = write_cube_stl(dir.path(), 1.0).unwrap();
    let bad = dir.path().join("truncated.stl");
    let bytes = std::fs::read(&good).unwrap();
    std::fs::write(&bad, &bytes[..bytes.len() - 20]).unwrap();

    let mut session = ViewerSession::default();
    let part = session.add_part(None, "Broken").unwrap();
    session.load_mesh(part, &good).unwrap();

    let err = session.load_mesh(part, &bad).unwrap_err();
    assert!(matches!(err, MeshLoadError::Truncated { .. }));
    assert!(session.tree.contains(part));
    assert!(!session.tree.has_mesh(part));
    assert!(session.tree.default_renderable(part).is_none());
    assert!(session.last_status().unwrap().starts_with("Failed to load"));
}

#[test]
fn test_missing_file_is_io_error() {
    let mut session = ViewerSession::default();
    let part = session.add_part(None, "Ghost").unwrap();
    let dir = TempDir::new().unwrap();
    let err = session.load_mesh(part, &dir.path().join("ghost.stl")).unwrap_err();
    assert!(matches!(err, MeshLoadError::Io(_)));
}

#[test]
fn test_ascii_stl_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tri.stl");
    std::fs::write(&path, fixtures::ascii_triangle_stl()).unwrap();
    let mut session = ViewerSession::default();
    let part = session.add_part(None, "Tri").unwrap();
    session.load_mesh(part, &path).unwrap();
    assert_eq!(session.tree.node(part).unwrap().mesh().unwrap().triangle_count(), 1);
}

#[test]
fn test_headset_sees_property_changes() {
    let dir = TempDir::new().unwrap();
    let path = write_cube_stl(dir.path(), 1.0).unwrap();
    let mut session = ViewerSession::default();
    let a = session.add_part(None, "A").unwrap();
    let b = session.add_part(None, "B").unwrap();
    session.load_mesh(a, &path).unwrap();
    session.load_mesh(b, &path).unwrap();

    session.start_vr().unwrap();
    let mirror = session.mirror().unwrap().clone();
    assert!(wait_until(Duration::from_secs(5), || {
        mirror.latest_frame().is_some_and(|f| f.parts.len() == 2)
    }));

    session.tree.set_visible(b, false);
    assert!(wait_until(Duration::from_secs(5), || {
        mirror.latest_frame().is_some_and(|f| f.parts.len() == 1)
    }));

    session.tree.set_color(a, Rgb::new(0, 128, 255));
    assert!(wait_until(Duration::from_secs(5), || {
        mirror
            .latest_frame()
            .is_some_and(|f| f.parts.first().is_some_and(|p| p.color == Rgb::new(0, 128, 255)))
    }));

    assert!(session.rotate(Axis::Z, 30.0));
    assert!(wait_until(Duration::from_secs(5), || {
        mirror.stats().total_rotation[2] >= 30.0
    }));

    assert!(session.stop_vr());
    assert_eq!(session.vr_state(), RenderLoopState::Stopped);
    assert!(mirror.stats().released);
    assert!(!session.rotate(Axis::Z, 5.0));
    assert!(session
        .status_messages()
        .iter()
        .any(|m| m.starts_with("VR stopped after")));
}

#[test]
fn test_vr_can_restart_after_stop() {
    let mut session = ViewerSession::default();
    session.start_vr().unwrap();
    assert!(session.start_vr().is_err());
    session.stop_vr();
    session.start_vr().unwrap();
    assert!(session.stop_vr());
}
