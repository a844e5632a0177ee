//! Main application module

mod keyboard;
mod menus;
mod styles;

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use eframe::egui;
use shared::PartProperties;

use crate::config::ViewerSettings;
use crate::i18n::t;
use crate::session::ViewerSession;
use crate::tree::{PartId, TreeEvent};
use crate::ui::{headset, part_tree, properties, status_bar};
use crate::viewport::ViewportPanel;

/// Which side panels are open
pub struct Panels {
    pub tree: bool,
    pub properties: bool,
    pub headset: bool,
}

impl Default for Panels {
    fn default() -> Self {
        Self {
            tree: true,
            properties: true,
            headset: false,
        }
    }
}

/// Everything the panels read and change
pub struct AppState {
    pub session: ViewerSession,
    pub selection: Option<PartId>,
    /// Property form being edited for the selected part
    pub form: Option<PartProperties>,
    pub panels: Panels,
    tree_events: Receiver<TreeEvent>,
}

impl AppState {
    pub fn new(settings: ViewerSettings) -> Self {
        let mut session = ViewerSession::new(settings);
        let tree_events = session.tree.event_channel();
        Self {
            session,
            selection: None,
            form: None,
            panels: Panels::default(),
            tree_events,
        }
    }

    pub fn select(&mut self, id: Option<PartId>) {
        self.selection = id.filter(|id| self.session.tree.contains(*id));
        self.reload_form();
    }

    fn reload_form(&mut self) {
        self.form = self.selection.and_then(|id| self.session.tree.properties(id));
    }

    /// Keep the selection and the form in step with tree changes
    pub fn process_tree_events(&mut self) {
        let mut structural = false;
        let mut selected_changed = false;
        for event in self.tree_events.try_iter() {
            match event {
                TreeEvent::DataChanged { node, .. } if Some(node) == self.selection => {
                    selected_changed = true;
                }
                e if e.is_structural() => structural = true,
                _ => {}
            }
        }
        if structural && self.selection.is_some_and(|id| !self.session.tree.contains(id)) {
            self.select(None);
        } else if selected_changed {
            self.reload_form();
        }
    }

    /// Pick an STL file and load it into `target`, or into a new top-level
    /// part named after the file
    pub fn open_mesh_dialog(&mut self, target: Option<PartId>) {
        let Some(path) = rfd::FileDialog::new()
            .set_title(t("menu.open_title"))
            .add_filter("STL", &["stl", "STL"])
            .pick_file()
        else {
            return;
        };
        self.load_mesh(target, path);
    }

    fn load_mesh(&mut self, target: Option<PartId>, path: PathBuf) {
        let id = match target {
            Some(id) => id,
            None => {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| t("tree.new_part").to_string());
                match self.session.add_part(None, &name) {
                    Some(id) => id,
                    None => return,
                }
            }
        };
        if self.session.load_mesh(id, &path).is_ok() {
            self.select(Some(id));
        }
    }

    pub fn remove_selected(&mut self) {
        if let Some(id) = self.selection {
            self.session.remove_part(id);
        }
    }
}

/// Main application
pub struct PartViewApp {
    state: AppState,
    viewport: ViewportPanel,
}

impl PartViewApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: ViewerSettings) -> Self {
        styles::configure_styles(&cc.egui_ctx);
        Self {
            state: AppState::new(settings),
            viewport: ViewportPanel::new(),
        }
    }
}

impl eframe::App for PartViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.session.poll();
        self.state.process_tree_events();

        keyboard::handle_keyboard(ctx, &mut self.state, &mut self.viewport);

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut self.state);
                menus::view_menu(ui, &mut self.state, &mut self.viewport);
                menus::vr_menu(ui, &mut self.state);
            });
        });

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.state);
            });

        // ── Left panel: part tree ────────────────────────────
        if self.state.panels.tree {
            egui::SidePanel::left("part_tree")
                .default_width(240.0)
                .width_range(160.0..=420.0)
                .resizable(true)
                .frame(
                    egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
                )
                .show(ctx, |ui| {
                    part_tree::show(ui, &mut self.state);
                });
        }

        // ── Right panel: properties ──────────────────────────
        if self.state.panels.properties {
            egui::SidePanel::right("properties")
                .default_width(260.0)
                .width_range(200.0..=420.0)
                .resizable(true)
                .frame(
                    egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
                )
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical()
                        .id_salt("props_scroll")
                        .show(ui, |ui| {
                            properties::show(ui, &mut self.state);
                        });
                });
        }

        // ── Headset mirror window ────────────────────────────
        if self.state.panels.headset {
            headset::show(ctx, &mut self.state);
        }

        // ── Central panel: on-screen viewport ────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &self.state);
            });

        if self.state.session.vr().is_some_and(|vr| vr.is_running()) {
            let interval = self.state.session.settings().render.frame_interval();
            ctx.request_repaint_after(interval.max(Duration::from_millis(16)));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.session.stop_vr();
    }
}
