//! Property form for the selected part
//!
//! Edits a copy of the part's properties; nothing reaches the tree until
//! Apply, which also rebuilds the filtered geometry.

use egui::Ui;
use shared::Rgb;

use crate::app::AppState;
use crate::i18n::t;

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.heading(t("prop.title"));
    ui.separator();

    let (Some(id), Some(form)) = (state.selection, state.form.as_mut()) else {
        ui.add_space(10.0);
        ui.vertical_centered(|ui| {
            ui.weak(t("prop.select"));
        });
        return;
    };

    let mut color = form.color.to_array();
    egui::Grid::new("part_props")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label(format!("{}:", t("prop.name")));
            ui.text_edit_singleline(&mut form.name);
            ui.end_row();

            ui.label(format!("{}:", t("prop.visible")));
            ui.checkbox(&mut form.visible, "");
            ui.end_row();

            ui.label(format!("{}:", t("prop.color")));
            ui.color_edit_button_srgb(&mut color);
            ui.end_row();

            ui.label(format!("{}:", t("prop.clip")));
            ui.checkbox(&mut form.clip, "");
            ui.end_row();

            ui.label(format!("{}:", t("prop.shrink")));
            ui.checkbox(&mut form.shrink, "");
            ui.end_row();
        });
    form.color = Rgb::from(color);

    ui.add_space(6.0);
    let mesh_info = state
        .session
        .tree
        .node(id)
        .and_then(|n| n.mesh())
        .map(|m| format!("{} {}", m.triangle_count(), t("prop.triangles")));
    ui.horizontal(|ui| {
        ui.label(format!("{}:", t("prop.mesh")));
        match &mesh_info {
            Some(info) => ui.monospace(info),
            None => ui.weak(t("prop.no_mesh")),
        };
    });

    ui.add_space(8.0);
    let mut apply = false;
    let mut revert = false;
    ui.horizontal(|ui| {
        apply = ui.button(t("prop.apply")).clicked();
        revert = ui.button(t("prop.revert")).clicked();
    });

    if apply {
        if let Some(form) = state.form.clone() {
            state.session.tree.apply_properties(id, &form);
            state.session.push_status(format!("Updated {}", form.name));
        }
    } else if revert {
        state.select(Some(id));
    }
}
