//! Sidebar: location search, outline, confirm/reset, and the AOI list.

use egui::{Color32, RichText, TextEdit, Ui};
use egui_phosphor::regular as icons;

use super::panel_trait::{Panel, UiState};
use crate::store::AoiId;

pub struct Sidebar {
    /// AOI currently being renamed inline, with the edit buffer.
    editing: Option<(AoiId, String)>,
    /// Transient feedback line under the search field.
    pub notice: Option<String>,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self {
            editing: None,
            notice: None,
        }
    }
}

impl Panel for Sidebar {
    fn title(&self) -> &'static str {
        "Define Area of Interest"
    }

    fn render(&mut self, ui: &mut Ui, state: &mut UiState<'_>) {
        ui.add_space(8.0);
        ui.heading(self.title());
        ui.add_space(8.0);

        self.render_search(ui, state);
        ui.separator();
        self.render_confirm(ui, state);
        ui.separator();
        self.render_aoi_list(ui, state);
    }
}

impl Sidebar {
    fn render_search(&mut self, ui: &mut Ui, state: &mut UiState<'_>) {
        let confirmed = state.store.is_confirmed();
        let mut query = state.store.search_text().to_string();

        ui.horizontal(|ui| {
            ui.label(icons::MAGNIFYING_GLASS);
            let response = ui.add_enabled(
                !confirmed,
                TextEdit::singleline(&mut query)
                    .hint_text("Search location...")
                    .desired_width(f32::INFINITY),
            );
            if response.changed() {
                state.store.set_search_text(query.clone());
            }
            if response.lost_focus()
                && ui.input(|i| i.key_pressed(egui::Key::Enter))
                && !query.trim().is_empty()
            {
                self.notice = None;
                state.request_search = Some(query.clone());
            }
        });

        if state.search_pending {
            ui.label(RichText::new("Searching…").weak().small());
        } else if let Some(notice) = &self.notice {
            ui.label(RichText::new(notice).small().color(Color32::LIGHT_RED));
        }

        ui.add_space(4.0);
        let can_outline = !query.trim().is_empty() && !confirmed;
        if ui
            .add_enabled(
                can_outline,
                egui::Button::new("Apply outline as base image"),
            )
            .clicked()
        {
            self.notice = None;
            state.request_outline = Some(query);
        }
    }

    fn render_confirm(&mut self, ui: &mut Ui, state: &mut UiState<'_>) {
        if !state.store.is_confirmed() {
            let has_aois = !state.store.is_empty();
            if ui
                .add_enabled(
                    has_aois,
                    egui::Button::new("Confirm Area of Interest"),
                )
                .clicked()
            {
                state.store.confirm();
                *state.active_tool = None;
            }
        } else {
            ui.label(
                RichText::new(format!("{} AOIs Confirmed", icons::CHECK))
                    .color(Color32::DARK_GREEN),
            );
            if ui
                .button(format!("{} Reset & Edit", icons::ARROW_COUNTER_CLOCKWISE))
                .clicked()
            {
                state.store.reset();
            }
        }
    }

    fn render_aoi_list(&mut self, ui: &mut Ui, state: &mut UiState<'_>) {
        ui.horizontal(|ui| {
            ui.strong(format!("Areas of Interest ({})", state.store.len()));
            if state.store.selected().is_some() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .small_button(format!("{} Show All", icons::EYE))
                        .clicked()
                    {
                        state.store.select(None);
                    }
                });
            }
        });

        if state.store.is_empty() {
            let hint = if state.store.is_confirmed() {
                "No confirmed AOIs."
            } else {
                "No areas defined yet. Use the draw tool to create polygons."
            };
            ui.label(RichText::new(hint).weak());
            return;
        }

        ui.horizontal(|ui| {
            if ui
                .small_button(format!("{} Export GeoJSON", icons::DOWNLOAD_SIMPLE))
                .clicked()
            {
                state.request_export = true;
            }
            if !state.store.is_confirmed() && ui.small_button("Clear All").clicked() {
                state.store.clear_all(state.source);
                self.editing = None;
            }
        });
        ui.add_space(4.0);

        let confirmed = state.store.is_confirmed();
        let selected = state.store.selected();
        let rows: Vec<_> = state
            .store
            .aois()
            .iter()
            .map(|a| (a.id, a.name.clone(), a.created_at))
            .collect();

        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (id, name, created_at) in rows {
                    let frame = egui::Frame::group(ui.style());
                    frame.show(ui, |ui| {
                        ui.horizontal(|ui| {
                            if let Some((editing_id, buffer)) = &mut self.editing {
                                if *editing_id == id {
                                    let response = ui.text_edit_singleline(buffer);
                                    let save_clicked = ui.small_button("Save").clicked();
                                    let cancel_clicked = ui.small_button("Cancel").clicked();
                                    let enter = response.lost_focus()
                                        && ui.input(|i| i.key_pressed(egui::Key::Enter));
                                    let escape =
                                        ui.input(|i| i.key_pressed(egui::Key::Escape));
                                    if save_clicked || enter {
                                        let new_name = buffer.clone();
                                        state.store.rename(id, new_name);
                                        self.editing = None;
                                    } else if cancel_clicked || escape {
                                        self.editing = None;
                                    }
                                    return;
                                }
                            }

                            ui.vertical(|ui| {
                                ui.label(RichText::new(&name).strong());
                                ui.label(
                                    RichText::new(format!(
                                        "Created {}",
                                        created_at.format("%Y-%m-%d")
                                    ))
                                    .weak()
                                    .small(),
                                );
                            });

                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if !confirmed {
                                        if ui
                                            .small_button(icons::TRASH)
                                            .on_hover_text("Delete")
                                            .clicked()
                                        {
                                            state.store.delete(id, state.source);
                                            return;
                                        }
                                        if ui
                                            .small_button(icons::PENCIL_SIMPLE)
                                            .on_hover_text("Rename")
                                            .clicked()
                                        {
                                            self.editing = Some((id, name.clone()));
                                        }
                                    } else {
                                        ui.label(
                                            RichText::new(icons::CHECK)
                                                .color(Color32::DARK_GREEN),
                                        );
                                    }

                                    if selected == Some(id) {
                                        if ui
                                            .small_button(icons::EYE_SLASH)
                                            .on_hover_text("Hide")
                                            .clicked()
                                        {
                                            state.store.select(None);
                                        }
                                    } else if ui
                                        .small_button(icons::EYE)
                                        .on_hover_text("Show only this AOI")
                                        .clicked()
                                    {
                                        state.store.select(Some(id));
                                    }
                                },
                            );
                        });
                    });
                }
            });
    }
}
