//! Wireframe rendering with egui's painter

use egui::{Color32, Rect, Stroke};
use glam::{Mat4, Vec3};
use shared::Rgb;

use super::camera::{project_with, ArcBallCamera};
use crate::mesh::MeshData;

/// Above this, only every n-th triangle is outlined
const MAX_OUTLINED_TRIANGLES: usize = 20_000;

const GRID_RANGE: i32 = 10;

pub fn part_color(color: Rgb) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

pub fn paint_background(painter: &egui::Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(24, 24, 28));
}

/// Ground grid on the XZ plane, `step` apart
pub fn draw_grid(painter: &egui::Painter, rect: Rect, camera: &ArcBallCamera, step: f32) {
    let stroke = Stroke::new(0.5, Color32::from_rgba_premultiplied(60, 60, 60, 160));
    let extent = GRID_RANGE as f32 * step;

    for i in -GRID_RANGE..=GRID_RANGE {
        let f = i as f32 * step;
        // Lines along X
        if let (Some(a), Some(b)) = (
            camera.project(Vec3::new(f, 0.0, -extent), rect),
            camera.project(Vec3::new(f, 0.0, extent), rect),
        ) {
            if rect.contains(a) || rect.contains(b) {
                painter.line_segment([a, b], stroke);
            }
        }
        // Lines along Z
        if let (Some(a), Some(b)) = (
            camera.project(Vec3::new(-extent, 0.0, f), rect),
            camera.project(Vec3::new(extent, 0.0, f), rect),
        ) {
            if rect.contains(a) || rect.contains(b) {
                painter.line_segment([a, b], stroke);
            }
        }
    }
}

pub fn draw_axes(painter: &egui::Painter, rect: Rect, camera: &ArcBallCamera, len: f32) {
    let Some(o) = camera.project(Vec3::ZERO, rect) else {
        return;
    };
    let axes = [
        (Vec3::X, "X", Color32::from_rgb(220, 50, 50)),
        (Vec3::Y, "Y", Color32::from_rgb(50, 200, 50)),
        (Vec3::Z, "Z", Color32::from_rgb(50, 100, 220)),
    ];
    for (dir, label, color) in axes {
        if let Some(p) = camera.project(dir * len, rect) {
            painter.line_segment([o, p], Stroke::new(1.5, color));
            painter.text(p, egui::Align2::LEFT_BOTTOM, label, egui::FontId::monospace(10.0), color);
        }
    }
}

/// Outline every triangle of `mesh`, transformed by `model`, through the
/// view-projection `vp`
pub fn draw_mesh(painter: &egui::Painter, rect: Rect, vp: Mat4, model: Mat4, mesh: &MeshData, stroke: Stroke) {
    let mvp = vp * model;
    let step = mesh.triangle_count() / MAX_OUTLINED_TRIANGLES + 1;
    for tri in mesh.triangles().step_by(step) {
        let projected = tri.map(|p| project_with(mvp, p, rect));
        let [Some(a), Some(b), Some(c)] = projected else {
            continue;
        };
        if !(rect.contains(a) || rect.contains(b) || rect.contains(c)) {
            continue;
        }
        painter.line_segment([a, b], stroke);
        painter.line_segment([b, c], stroke);
        painter.line_segment([c, a], stroke);
    }
}
