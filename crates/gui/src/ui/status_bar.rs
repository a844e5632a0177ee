use egui::Ui;

use crate::app::AppState;
use crate::i18n::t;
use crate::render::RenderLoopState;

pub fn show(ui: &mut Ui, state: &AppState) {
    let tree = &state.session.tree;
    ui.horizontal(|ui| {
        let parts = tree.node_count() - 1;
        ui.weak(format!("{}: {parts}", t("status.parts")));
        ui.separator();
        ui.weak(format!("{}: {}", t("status.shown"), tree.shown_parts().len()));
        ui.separator();

        match state.session.last_status() {
            Some(msg) if msg.starts_with("Failed") || msg.starts_with("VR failed") => {
                ui.colored_label(egui::Color32::from_rgb(230, 100, 90), msg);
            }
            Some(msg) => {
                ui.label(msg);
            }
            None => {
                ui.weak(t("status.ready"));
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let vr = state.session.vr_state();
            let color = match vr {
                RenderLoopState::Active => egui::Color32::from_rgb(100, 220, 120),
                RenderLoopState::Terminating => egui::Color32::from_rgb(255, 200, 100),
                _ => egui::Color32::from_rgb(120, 120, 120),
            };
            ui.colored_label(color, format!("VR: {vr:?}"));
        });
    });
}
