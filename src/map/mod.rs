//! Map view: tile layers, overlays, the active interaction, and store
//! synchronization.
//!
//! The map panel owns everything the rendering library needs between frames
//! (tile pipelines, viewport memory, interaction state) and is the single
//! place where interaction events become store/source mutations. State flows
//! one way: store selection → feature visibility → plugins; events flow the
//! other way: pointer input → [`MapEvent`] → store actions.

mod interact;
mod layers;
mod plugins;

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use egui::Ui;
use walkers::sources::OpenStreetMap;
use walkers::{lon_lat, HttpTiles, Map, MapMemory, Position};

use crate::config::AoiMapConfig;
use crate::geocoding::LonLatBounds;
use crate::store::{AoiStore, MapViewMode, Tool};
use crate::vector::{FeatureRegistry, VectorSource};

pub use interact::{Draft, InteractionState, MapEvent};
pub use layers::WmsOrtho;

use geo_types::Polygon;
use interact::InteractionPlugin;
use plugins::{AoiLayerPlugin, OutlinePlugin};

/// Pixels kept free around fitted bounds on each side.
const FIT_PADDING_PX: f32 = 50.0;
const TILE_SIZE: f64 = 256.0;

pub struct MapPanel {
    osm_tiles: Option<HttpTiles>,
    ortho_tiles: Option<HttpTiles>,
    memory: MapMemory,
    interaction: Rc<RefCell<InteractionState>>,
    /// Reference backdrop polygon, distinct from the AOI features.
    outline: Option<Polygon<f64>>,
    /// Fit request applied on the next frame, when the viewport size is known.
    pending_fit: Option<LonLatBounds>,
    home: Position,
    initial_zoom: f64,
    zoom_applied: bool,
    last_tool: Option<Tool>,
    wms_url: String,
    wms_layers: String,
    reported_orphans: usize,
}

impl MapPanel {
    pub fn new(config: &AoiMapConfig) -> Self {
        Self {
            osm_tiles: None,
            ortho_tiles: None,
            memory: MapMemory::default(),
            interaction: Rc::new(RefCell::new(InteractionState::default())),
            outline: None,
            pending_fit: None,
            home: lon_lat(config.initial_center.0, config.initial_center.1),
            initial_zoom: config.initial_zoom,
            zoom_applied: false,
            last_tool: None,
            wms_url: config.wms_url.clone(),
            wms_layers: config.wms_layers.clone(),
            reported_orphans: 0,
        }
    }

    /// Replace the base outline; the previous one is discarded.
    pub fn set_outline(&mut self, polygon: Polygon<f64>) {
        self.outline = Some(polygon);
    }

    pub fn clear_outline(&mut self) {
        self.outline = None;
    }

    pub fn outline(&self) -> Option<&Polygon<f64>> {
        self.outline.as_ref()
    }

    /// Fit the viewport to the given bounds on the next frame.
    pub fn request_fit(&mut self, bounds: LonLatBounds) {
        self.pending_fit = Some(bounds);
    }

    pub fn zoom_by(&mut self, delta: f64) {
        let _ = self.memory.set_zoom(self.memory.zoom() + delta);
    }

    /// Render the map and apply any interaction events to store and source.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        store: &mut AoiStore,
        source: &mut VectorSource,
        active_tool: Option<Tool>,
    ) {
        if !self.zoom_applied {
            let _ = self.memory.set_zoom(self.initial_zoom);
            self.zoom_applied = true;
        }
        if let Some(bounds) = self.pending_fit.take() {
            fit_bounds(&mut self.memory, bounds, ui.available_size());
        }

        // No interaction while confirmed, regardless of the requested tool.
        let tool = if store.is_confirmed() { None } else { active_tool };
        if tool != self.last_tool {
            self.interaction.borrow_mut().cancel();
            self.last_tool = tool;
        }

        sync_visibility(store, source);

        let ctx = ui.ctx().clone();
        let tiles = match store.view_mode() {
            MapViewMode::Map => self
                .osm_tiles
                .get_or_insert_with(|| HttpTiles::new(OpenStreetMap, ctx)),
            MapViewMode::Base => self.ortho_tiles.get_or_insert_with(|| {
                HttpTiles::new(WmsOrtho::new(&self.wms_url, &self.wms_layers), ctx)
            }),
        };

        let visible: Vec<_> = source
            .features()
            .iter()
            .filter(|f| f.visible)
            .map(|f| f.polygon.clone())
            .collect();

        let mut map = Map::new(Some(tiles), &mut self.memory, self.home)
            .with_plugin(OutlinePlugin {
                polygon: self.outline.clone(),
            })
            .with_plugin(AoiLayerPlugin { polygons: visible });

        if let Some(tool) = tool {
            map = map
                .with_plugin(InteractionPlugin {
                    tool,
                    state: Rc::clone(&self.interaction),
                    features: source.features().to_vec(),
                })
                // Click-to-draw and vertex drags must not fight the pan gesture.
                .drag_gesture(!matches!(tool, Tool::Draw | Tool::Edit));
        }

        ui.add_sized(ui.available_size(), map);

        self.apply_events(store, source);
        self.report_orphans(store, source);
    }

    fn apply_events(&mut self, store: &mut AoiStore, source: &mut VectorSource) {
        let events = std::mem::take(&mut self.interaction.borrow_mut().events);
        for event in events {
            match event {
                MapEvent::DrawFinished(polygon) => {
                    let feature_id = source.insert(polygon);
                    if store.add(feature_id).is_none() {
                        source.remove(feature_id);
                    }
                }
                MapEvent::FeatureClicked(feature_id) => {
                    let id = store.find_by_feature(feature_id).map(|a| a.id);
                    store.select(id);
                }
                MapEvent::FeatureErased(feature_id) => {
                    if let Some(id) = store.find_by_feature(feature_id).map(|a| a.id) {
                        store.delete(id, source);
                    }
                }
                MapEvent::GeometryEdited { feature, polygon } => {
                    source.set_geometry(feature, polygon);
                }
            }
        }
    }

    fn report_orphans(&mut self, store: &AoiStore, source: &VectorSource) {
        let orphans = store.orphans(source);
        if orphans.len() != self.reported_orphans {
            if !orphans.is_empty() {
                eprintln!(
                    "{} AOI(s) reference features missing from the vector source",
                    orphans.len()
                );
            }
            self.reported_orphans = orphans.len();
        }
    }
}

/// Project store selection onto feature visibility: with a selection, exactly
/// the selected AOI's feature is visible; without one, all features are.
pub fn sync_visibility(store: &AoiStore, source: &mut VectorSource) {
    let visible_feature = store
        .selected()
        .and_then(|id| store.get(id))
        .map(|aoi| aoi.feature_id);
    let ids: Vec<_> = source.features().iter().map(|f| f.id).collect();
    for id in ids {
        let visible = match visible_feature {
            Some(selected) => id == selected,
            None => true,
        };
        source.set_visible(id, visible);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Viewport fitting
// ─────────────────────────────────────────────────────────────────────────────

/// Normalized Web-Mercator coordinates in [0, 1].
fn mercator_norm(lon: f64, lat: f64) -> (f64, f64) {
    let x = (lon + 180.0) / 360.0;
    let lat_rad = lat.clamp(-85.051_13, 85.051_13).to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    (x, y)
}

fn mercator_norm_to_lat(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

/// Center and zoom the viewport so `bounds` fits with padding.
pub fn fit_bounds(memory: &mut MapMemory, bounds: LonLatBounds, viewport: egui::Vec2) {
    let (x1, y1) = mercator_norm(bounds.min_lon, bounds.max_lat);
    let (x2, y2) = mercator_norm(bounds.max_lon, bounds.min_lat);
    let span_x = (x2 - x1).abs().max(1e-9);
    let span_y = (y2 - y1).abs().max(1e-9);

    let usable_w = (viewport.x - 2.0 * FIT_PADDING_PX).max(64.0) as f64;
    let usable_h = (viewport.y - 2.0 * FIT_PADDING_PX).max(64.0) as f64;
    let zoom_x = (usable_w / (TILE_SIZE * span_x)).log2();
    let zoom_y = (usable_h / (TILE_SIZE * span_y)).log2();
    let zoom = zoom_x.min(zoom_y).clamp(1.0, 19.0);

    let center_lon = (bounds.min_lon + bounds.max_lon) / 2.0;
    let center_lat = mercator_norm_to_lat((y1 + y2) / 2.0);

    memory.center_at(lon_lat(center_lon, center_lat));
    let _ = memory.set_zoom(zoom);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mercator_round_trips_latitude() {
        for lat in [-60.0, -10.0, 0.0, 33.3, 71.0] {
            let (_, y) = mercator_norm(0.0, lat);
            assert!((mercator_norm_to_lat(y) - lat).abs() < 1e-9);
        }
    }

    #[test]
    fn equator_maps_to_mid_mercator() {
        let (x, y) = mercator_norm(0.0, 0.0);
        assert!((x - 0.5).abs() < 1e-12);
        assert!((y - 0.5).abs() < 1e-12);
    }
}
