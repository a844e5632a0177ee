//! On-screen 3D viewport drawn with egui's painter

mod camera;
pub mod renderer;

use egui::{Stroke, Ui};
use glam::Mat4;

use crate::app::AppState;
use crate::mesh::Aabb;
pub use camera::ArcBallCamera;

pub struct ViewportPanel {
    camera: ArcBallCamera,
    /// Bounds the camera was last framed on
    framed: Option<Aabb>,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            camera: ArcBallCamera::new(),
            framed: None,
        }
    }

    pub fn reset_camera(&mut self) {
        self.camera = ArcBallCamera::new();
        self.framed = None;
    }

    pub fn show(&mut self, ui: &mut Ui, state: &AppState) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        // ── Camera controls ─────────────────────────────────
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            self.camera.rotate(delta.x * 0.5, delta.y * 0.5);
        }
        if response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_delta();
            self.camera.pan(-delta.x * 0.01, delta.y * 0.01);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.camera.zoom(scroll * 0.01);
            }
        }
        if response.double_clicked() {
            self.framed = None;
        }

        if !ui.is_rect_visible(rect) {
            return;
        }

        let tree = &state.session.tree;
        let shown: Vec<_> = tree
            .shown_parts()
            .into_iter()
            .filter_map(|id| Some((id, tree.default_renderable(id)?.snapshot())))
            .collect();

        // Frame the scene the first time something appears
        let bounds = shown
            .iter()
            .filter_map(|(_, props)| props.geometry.bounds())
            .reduce(|a, b| a.union(&b));
        if self.framed.is_none() {
            if let Some(b) = bounds {
                self.camera.frame(&b);
                self.framed = Some(b);
            }
        }

        let painter = ui.painter_at(rect);
        renderer::paint_background(&painter, rect);
        let scale = self.framed.map_or(1.0, |b| b.radius().max(0.1));
        renderer::draw_grid(&painter, rect, &self.camera, scale * 0.25);
        renderer::draw_axes(&painter, rect, &self.camera, scale * 0.5);

        let vp = self.camera.view_projection(rect.width() / rect.height());
        for (id, props) in &shown {
            let selected = state.selection == Some(*id);
            let stroke = if selected {
                Stroke::new(1.6, egui::Color32::from_rgb(100, 200, 255))
            } else {
                Stroke::new(0.8, renderer::part_color(props.color))
            };
            renderer::draw_mesh(&painter, rect, vp, Mat4::IDENTITY, &props.geometry, stroke);
        }

        self.draw_camera_info(&painter, rect);
    }

    fn draw_camera_info(&self, painter: &egui::Painter, rect: egui::Rect) {
        let overlay_rect = egui::Rect::from_min_size(
            egui::pos2(rect.right() - 140.0, rect.top() + 4.0),
            egui::vec2(136.0, 32.0),
        );
        painter.rect_filled(
            overlay_rect,
            4.0,
            egui::Color32::from_rgba_premultiplied(0, 0, 0, 140),
        );
        painter.text(
            overlay_rect.min + egui::vec2(6.0, 4.0),
            egui::Align2::LEFT_TOP,
            format!(
                "Dist: {:.1}\nYaw: {:.0}  Pitch: {:.0}",
                self.camera.distance,
                self.camera.yaw.to_degrees(),
                self.camera.pitch.to_degrees(),
            ),
            egui::FontId::monospace(10.0),
            egui::Color32::from_rgb(160, 160, 170),
        );
    }
}
