//! Icon bar: the static navigation strip on the far left.

use egui::{Color32, RichText, Ui};
use egui_phosphor::regular as icons;

use super::panel_trait::{Panel, UiState};

#[derive(Default)]
pub struct IconBar;

impl Panel for IconBar {
    fn title(&self) -> &'static str {
        "Navigation"
    }

    fn render(&mut self, ui: &mut Ui, _state: &mut UiState<'_>) {
        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            let _ = ui.button(RichText::new(icons::HOUSE).size(20.0));
            ui.add_space(8.0);
            // The AOI workspace is the active section.
            let _ = ui.button(
                RichText::new(icons::SQUARES_FOUR)
                    .size(20.0)
                    .color(Color32::from_rgb(0x3b, 0x82, 0xf6)),
            );
            ui.add_space(8.0);
            let _ = ui.button(RichText::new(icons::USER).size(20.0));
            ui.add_space(8.0);
            let _ = ui.button(RichText::new(icons::GEAR).size(20.0));
        });
    }
}
