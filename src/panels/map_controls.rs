//! Map controls: zoom buttons and the raster layer toggle.

use egui::{Align2, Context, Ui};
use egui_phosphor::regular as icons;

use super::panel_trait::{Panel, UiState};
use crate::store::MapViewMode;

#[derive(Default)]
pub struct MapControls;

impl MapControls {
    /// Floats over the bottom-right corner of the map.
    pub fn show(&mut self, ctx: &Context, state: &mut UiState<'_>) {
        egui::Area::new(egui::Id::new("map_controls"))
            .anchor(Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .show(ctx, |ui| {
                egui::Frame::window(&ctx.style()).show(ui, |ui| {
                    self.render(ui, state);
                });
            });
    }
}

impl Panel for MapControls {
    fn title(&self) -> &'static str {
        "Map Controls"
    }

    fn render(&mut self, ui: &mut Ui, state: &mut UiState<'_>) {
        ui.horizontal(|ui| {
            if ui.button(icons::PLUS).on_hover_text("Zoom in").clicked() {
                state.request_zoom += 1.0;
            }
            if ui.button(icons::MINUS).on_hover_text("Zoom out").clicked() {
                state.request_zoom -= 1.0;
            }
        });
        ui.separator();
        ui.horizontal(|ui| {
            let mode = state.store.view_mode();
            if ui
                .selectable_label(
                    mode == MapViewMode::Base,
                    format!("{} Base Image", icons::GLOBE_HEMISPHERE_WEST),
                )
                .clicked()
            {
                state.store.set_view_mode(MapViewMode::Base);
            }
            if ui
                .selectable_label(
                    mode == MapViewMode::Map,
                    format!("{} Map View", icons::MAP_TRIFOLD),
                )
                .clicked()
            {
                state.store.set_view_mode(MapViewMode::Map);
            }
        });
    }
}
