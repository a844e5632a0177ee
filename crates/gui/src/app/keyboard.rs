//! Keyboard shortcut handling

use eframe::egui;
use shared::Axis;

use super::AppState;
use crate::viewport::ViewportPanel;

/// Degrees per arrow-key press while the headset loop runs
const ROTATE_STEP: f64 = 5.0;

pub fn handle_keyboard(ctx: &egui::Context, state: &mut AppState, viewport: &mut ViewportPanel) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    let mut rotations = Vec::new();
    let mut delete = false;
    let mut open = false;
    ctx.input(|i| {
        if i.key_pressed(egui::Key::Escape) {
            state.select(None);
        }
        if i.key_pressed(egui::Key::Delete) {
            delete = true;
        }
        // Ctrl+O: open mesh into the selected part (or a new one)
        if i.modifiers.command && i.key_pressed(egui::Key::O) {
            open = true;
        }
        // Home: reset camera
        if i.key_pressed(egui::Key::Home) {
            viewport.reset_camera();
        }
        // Arrows rotate the headset view; Shift+Left/Right turns about Z
        let turn_axis = if i.modifiers.shift { Axis::Z } else { Axis::Y };
        if i.key_pressed(egui::Key::ArrowLeft) {
            rotations.push((turn_axis, -ROTATE_STEP));
        }
        if i.key_pressed(egui::Key::ArrowRight) {
            rotations.push((turn_axis, ROTATE_STEP));
        }
        if i.key_pressed(egui::Key::ArrowUp) {
            rotations.push((Axis::X, -ROTATE_STEP));
        }
        if i.key_pressed(egui::Key::ArrowDown) {
            rotations.push((Axis::X, ROTATE_STEP));
        }
    });

    if delete {
        state.remove_selected();
    }
    if open {
        state.open_mesh_dialog(state.selection);
    }
    for (axis, degrees) in rotations {
        state.session.rotate(axis, degrees);
    }
}
