//! Per-frame update: apply geocoding results, render panels and map, consume
//! panel requests, and persist state.

use std::time::Duration;

use crate::geocoding::GeocodeOutcome;
use crate::panels::{Panel, UiState};
use crate::persistence;

use super::{AoiApp, STORAGE_KEY};

impl eframe::App for AoiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Geocoding results first: they may move the viewport or set the
        // outline before anything renders.
        if let Some(outcome) = self.geocoder.poll() {
            match outcome {
                GeocodeOutcome::Located(place) => {
                    self.map.request_fit(place.bounds);
                    self.sidebar.notice = None;
                }
                GeocodeOutcome::Outline {
                    polygon, bounds, ..
                } => {
                    self.map.set_outline(polygon);
                    self.map.request_fit(bounds);
                    self.sidebar.notice = None;
                }
                GeocodeOutcome::NotFound => {
                    self.sidebar.notice = Some(format!(
                        "Nothing found for \"{}\"",
                        self.store.search_text()
                    ));
                }
            }
        }
        if self.geocoder.in_flight() {
            // Channel results arrive without user input; keep polling.
            ctx.request_repaint_after(Duration::from_millis(200));
        }

        // Confirmation disarms whatever tool was active.
        if self.store.is_confirmed() {
            self.active_tool = None;
        }

        let mut state = UiState::new(
            &mut self.store,
            &mut self.source,
            &mut self.active_tool,
            self.geocoder.in_flight(),
        );

        egui::SidePanel::left("icon_bar")
            .exact_width(56.0)
            .resizable(false)
            .show(ctx, |ui| {
                self.icon_bar.render(ui, &mut state);
            });

        egui::SidePanel::left("sidebar")
            .default_width(320.0)
            .show(ctx, |ui| {
                self.sidebar.render(ui, &mut state);
            });

        self.toolbox.show(ctx, &mut state);
        self.controls.show(ctx, &mut state);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.map
                    .show(ui, state.store, state.source, *state.active_tool);
            });

        // Consume panel requests.
        if state.request_zoom != 0.0 {
            self.map.zoom_by(state.request_zoom);
        }
        let search = state.request_search.take();
        let outline = state.request_outline.take();
        let export = state.request_export;
        drop(state);

        if let Some(query) = search {
            self.geocoder.locate(query);
        }
        if let Some(query) = outline {
            self.geocoder.outline(query);
        }
        if export {
            self.export_geojson();
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let snapshot = persistence::capture_state(&self.store, &self.source);
        match persistence::state_to_json(&snapshot) {
            Ok(json) => storage.set_string(STORAGE_KEY, json),
            Err(err) => eprintln!("Failed to serialize state: {err}"),
        }
    }
}

impl AoiApp {
    fn export_geojson(&self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name("aois.geojson")
            .save_file()
        {
            if let Err(err) = persistence::save_geojson_to_path(&self.store, &self.source, &path)
            {
                eprintln!("Failed to export AOIs: {err}");
            }
        }
    }
}
