//! Headset window: render loop controls and a mirror of the last frame

use glam::{Mat4, Vec3};
use shared::Axis;

use crate::app::AppState;
use crate::i18n::t;
use crate::mesh::Aabb;
use crate::render::{MirrorFrame, RenderLoopState};
use crate::viewport::{renderer, ArcBallCamera};

const ROTATE_STEPS: [f64; 2] = [-15.0, 15.0];

pub fn show(ctx: &egui::Context, state: &mut AppState) {
    let mut open = state.panels.headset;
    egui::Window::new(t("vr.title"))
        .open(&mut open)
        .default_size([360.0, 320.0])
        .resizable(true)
        .show(ctx, |ui| {
            let vr_state = state.session.vr_state();
            let frame = state.session.mirror().and_then(|m| m.latest_frame());
            let stats = state.session.mirror().map(|m| m.stats());

            egui::Grid::new("vr_info").num_columns(2).show(ui, |ui| {
                ui.label(format!("{}:", t("vr.state")));
                ui.monospace(format!("{vr_state:?}"));
                ui.end_row();

                ui.label(format!("{}:", t("vr.frames")));
                ui.monospace(stats.as_ref().map_or(0, |s| s.frames_drawn).to_string());
                ui.end_row();

                if let Some(f) = &frame {
                    let [x, y, z] = f.euler_degrees;
                    ui.label("XYZ:");
                    ui.monospace(format!("{x:.0}° {y:.0}° {z:.0}°"));
                    ui.end_row();
                }
            });

            let running = vr_state == RenderLoopState::Active;
            ui.add_enabled_ui(running, |ui| {
                ui.horizontal(|ui| {
                    ui.label(format!("{}:", t("vr.rotate")));
                    for axis in Axis::ALL {
                        for step in ROTATE_STEPS {
                            let label = format!("{axis:?}{step:+.0}");
                            if ui.small_button(label).clicked() {
                                state.session.rotate(axis, step);
                            }
                        }
                    }
                });
            });
            ui.separator();

            match &frame {
                Some(f) => paint_mirror(ui, f),
                None => {
                    ui.weak(t("vr.not_running"));
                }
            }
        });
    state.panels.headset = open;
}

/// Draw the parts as the headset saw them: scene rotated about its center
fn paint_mirror(ui: &mut egui::Ui, frame: &MirrorFrame) {
    let size = ui.available_size().max(egui::vec2(120.0, 120.0));
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    let painter = ui.painter_at(rect);
    renderer::paint_background(&painter, rect);

    let bounds = frame
        .parts
        .iter()
        .filter_map(|p| p.geometry.bounds())
        .reduce(|a, b| a.union(&b))
        .unwrap_or(Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        });

    let mut camera = ArcBallCamera::new();
    camera.yaw = 0.0;
    camera.pitch = 0.0;
    camera.frame(&bounds);
    let vp = camera.view_projection(rect.width() / rect.height());

    let center = bounds.center();
    let model = Mat4::from_translation(center)
        * Mat4::from_quat(frame.orientation)
        * Mat4::from_translation(-center);

    for part in &frame.parts {
        let stroke = egui::Stroke::new(0.8, renderer::part_color(part.color));
        renderer::draw_mesh(&painter, rect, vp, model, &part.geometry, stroke);
    }
}
