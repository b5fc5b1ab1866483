//! Toolbox: the floating draw/edit/select/erase tool strip.

use egui::{Align2, Context, Ui};
use egui_phosphor::regular as icons;

use super::panel_trait::{Panel, UiState};
use crate::store::Tool;

const TOOLS: [(Tool, &str, &str); 4] = [
    (Tool::Draw, icons::POLYGON, "Draw polygon"),
    (Tool::Edit, icons::PENCIL_SIMPLE, "Edit polygon"),
    (Tool::Select, icons::CURSOR, "Select polygon"),
    (Tool::Erase, icons::ERASER, "Erase polygon"),
];

#[derive(Default)]
pub struct Toolbox;

impl Toolbox {
    /// The toolbox floats over the map, anchored to the right edge.
    pub fn show(&mut self, ctx: &Context, state: &mut UiState<'_>) {
        egui::Area::new(egui::Id::new("toolbox"))
            .anchor(Align2::RIGHT_CENTER, egui::vec2(-16.0, 0.0))
            .show(ctx, |ui| {
                egui::Frame::window(&ctx.style()).show(ui, |ui| {
                    self.render(ui, state);
                });
            });
    }
}

impl Panel for Toolbox {
    fn title(&self) -> &'static str {
        "Toolbox"
    }

    fn render(&mut self, ui: &mut Ui, state: &mut UiState<'_>) {
        let confirmed = state.store.is_confirmed();
        ui.add_enabled_ui(!confirmed, |ui| {
            ui.vertical(|ui| {
                for (tool, icon, label) in TOOLS {
                    let active = *state.active_tool == Some(tool);
                    if ui
                        .selectable_label(active, icon)
                        .on_hover_text(label)
                        .clicked()
                    {
                        state.toggle_tool(tool);
                    }
                }
            });
        });
    }
}
