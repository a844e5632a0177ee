//! Application menu bar

use eframe::egui;

use super::AppState;
use crate::fixtures;
use crate::i18n::{lang, set_lang, t, Lang};
use crate::render::RenderLoopState;
use crate::viewport::ViewportPanel;

pub fn file_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button(t("menu.file"), |ui| {
        if ui.button(t("menu.open_mesh")).clicked() {
            ui.close_menu();
            state.open_mesh_dialog(None);
        }
        if ui.button(t("menu.demo")).clicked() {
            fixtures::populate_demo(&mut state.session.tree);
            state.session.push_status("Added demo parts".to_string());
            ui.close_menu();
        }
        ui.separator();
        if ui.button(t("menu.clear")).clicked() {
            state.session.tree.clear();
            state.select(None);
            ui.close_menu();
        }
        ui.separator();
        if ui.button(t("menu.quit")).clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

pub fn view_menu(ui: &mut egui::Ui, state: &mut AppState, viewport: &mut ViewportPanel) {
    ui.menu_button(t("menu.view"), |ui| {
        ui.checkbox(&mut state.panels.tree, t("menu.tree"));
        ui.checkbox(&mut state.panels.properties, t("menu.properties"));
        ui.checkbox(&mut state.panels.headset, t("menu.headset"));
        ui.separator();
        if ui.button(t("menu.reset_camera")).clicked() {
            viewport.reset_camera();
            ui.close_menu();
        }
        ui.separator();
        ui.menu_button(t("menu.language"), |ui| {
            let current = lang();
            if ui.radio(current == Lang::En, "English").clicked() {
                set_lang(Lang::En);
                ui.close_menu();
            }
            if ui.radio(current == Lang::Ru, "Русский").clicked() {
                set_lang(Lang::Ru);
                ui.close_menu();
            }
        });
    });
}

pub fn vr_menu(ui: &mut egui::Ui, state: &mut AppState) {
    let running = matches!(
        state.session.vr_state(),
        RenderLoopState::Active | RenderLoopState::Terminating
    );
    ui.menu_button(t("menu.vr"), |ui| {
        if ui
            .add_enabled(!running, egui::Button::new(t("menu.start_vr")))
            .clicked()
        {
            if let Err(e) = state.session.start_vr() {
                tracing::warn!("Start VR: {e}");
            }
            state.panels.headset = true;
            ui.close_menu();
        }
        if ui
            .add_enabled(running, egui::Button::new(t("menu.stop_vr")))
            .clicked()
        {
            state.session.stop_vr();
            ui.close_menu();
        }
    });
}
