//! Part tree panel
//!
//! Walks the tree through the row/column model the way a tree view does:
//! one collapsing header per part with children, one label otherwise.

use egui::Ui;

use crate::app::AppState;
use crate::i18n::t;
use crate::tree::{ModelIndex, PartId, VISIBLE_COLUMN};

/// Something the user asked for while the tree was being drawn
enum TreeAction {
    Select(PartId),
    AddChild(Option<PartId>),
    SetVisible(PartId, bool),
    LoadMesh(PartId),
    Delete(PartId),
}

pub fn show(ui: &mut Ui, state: &mut AppState) {
    let mut actions = Vec::new();
    let tree = &state.session.tree;

    ui.horizontal(|ui| {
        ui.heading(t("tree.title"));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("➕").on_hover_text(t("tree.add")).clicked() {
                actions.push(TreeAction::AddChild(None));
            }
            let count = tree.descendants(tree.root()).len();
            ui.weak(format!("({count})"));
        });
    });
    ui.separator();

    if tree.row_count(None) == 0 {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.weak(t("tree.empty"));
            ui.add_space(4.0);
            if ui.button(t("tree.add")).clicked() {
                actions.push(TreeAction::AddChild(None));
            }
        });
    } else {
        // Header row
        ui.horizontal(|ui| {
            ui.strong(tree.header_data(0).to_string());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.strong(tree.header_data(VISIBLE_COLUMN).to_string());
            });
        });

        egui::ScrollArea::vertical()
            .id_salt("part_tree_scroll")
            .show(ui, |ui| {
                show_rows(ui, state, None, &mut actions);
            });
    }

    for action in actions {
        apply(state, action);
    }
}

fn show_rows(ui: &mut Ui, state: &AppState, parent: Option<&ModelIndex>, actions: &mut Vec<TreeAction>) {
    let tree = &state.session.tree;
    for row in 0..tree.row_count(parent) {
        let Some(index) = tree.index(row, 0, parent) else {
            continue;
        };
        let id = index.id;
        let name = tree.data(&index).to_string();
        let visible = tree
            .index(row, VISIBLE_COLUMN, parent)
            .and_then(|i| tree.data(&i).as_bool())
            .unwrap_or(true);
        let has_mesh = tree.has_mesh(id);
        let selected = state.selection == Some(id);

        let label_color = if !visible {
            egui::Color32::from_rgb(100, 100, 100)
        } else if selected {
            egui::Color32::from_rgb(100, 200, 255)
        } else if has_mesh {
            egui::Color32::from_rgb(210, 210, 210)
        } else {
            egui::Color32::from_rgb(160, 160, 160)
        };
        let icon = if has_mesh { "■" } else { "□" };
        let text = egui::RichText::new(format!("{icon} {name}")).color(label_color);

        let response = ui
            .horizontal(|ui| {
                let response = if tree.row_count(Some(&index)) > 0 {
                    egui::CollapsingHeader::new(text)
                        .id_salt(id)
                        .default_open(true)
                        .show(ui, |ui| show_rows(ui, state, Some(&index), actions))
                        .header_response
                } else {
                    ui.add(egui::Label::new(text).sense(egui::Sense::click()))
                };
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    let mut checked = visible;
                    if ui.checkbox(&mut checked, "").changed() {
                        actions.push(TreeAction::SetVisible(id, checked));
                    }
                });
                response
            })
            .inner;

        if response.clicked() {
            actions.push(TreeAction::Select(id));
        }

        response.context_menu(|ui| {
            if ui.button(t("tree.add_child")).clicked() {
                actions.push(TreeAction::AddChild(Some(id)));
                ui.close_menu();
            }
            if ui.button(t("tree.load")).clicked() {
                actions.push(TreeAction::LoadMesh(id));
                ui.close_menu();
            }
            let label = if visible { t("tree.hide") } else { t("tree.show") };
            if ui.button(label).clicked() {
                actions.push(TreeAction::SetVisible(id, !visible));
                ui.close_menu();
            }
            ui.separator();
            if ui
                .button(
                    egui::RichText::new(t("tree.delete"))
                        .color(egui::Color32::from_rgb(220, 80, 80)),
                )
                .clicked()
            {
                actions.push(TreeAction::Delete(id));
                ui.close_menu();
            }
        });
    }
}

fn apply(state: &mut AppState, action: TreeAction) {
    match action {
        TreeAction::Select(id) => state.select(Some(id)),
        TreeAction::AddChild(parent) => {
            if let Some(id) = state.session.add_part(parent, t("tree.new_part")) {
                state.select(Some(id));
            }
        }
        TreeAction::SetVisible(id, visible) => {
            state.session.tree.set_visible(id, visible);
        }
        TreeAction::LoadMesh(id) => state.open_mesh_dialog(Some(id)),
        TreeAction::Delete(id) => {
            state.session.remove_part(id);
        }
    }
}
