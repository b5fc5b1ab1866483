use egui::Ui;

use crate::store::{AoiStore, Tool};
use crate::vector::VectorSource;

/// A view struct handed to panels: the store and its collaborators, plus
/// requests set by panel UI for the app to consume after rendering.
pub struct UiState<'a> {
    pub store: &'a mut AoiStore,
    pub source: &'a mut VectorSource,
    /// The transient page-level tool selection.
    pub active_tool: &'a mut Option<Tool>,

    // Requests consumed by the app after panel rendering.
    pub request_search: Option<String>,
    pub request_outline: Option<String>,
    pub request_export: bool,
    pub request_zoom: f64,
    /// A search is still in flight (drives the sidebar hint).
    pub search_pending: bool,
}

impl<'a> UiState<'a> {
    pub fn new(
        store: &'a mut AoiStore,
        source: &'a mut VectorSource,
        active_tool: &'a mut Option<Tool>,
        search_pending: bool,
    ) -> Self {
        Self {
            store,
            source,
            active_tool,
            request_search: None,
            request_outline: None,
            request_export: false,
            request_zoom: 0.0,
            search_pending,
        }
    }

    /// Arm a tool, or disarm it when it is already active. Ignored while the
    /// AOI set is confirmed.
    pub fn toggle_tool(&mut self, tool: Tool) {
        if self.store.is_confirmed() {
            return;
        }
        *self.active_tool = if *self.active_tool == Some(tool) {
            None
        } else {
            Some(tool)
        };
    }
}

pub trait Panel {
    fn title(&self) -> &'static str;
    fn render(&mut self, ui: &mut Ui, state: &mut UiState<'_>);
}
