//! Application wiring.
//!
//! | Sub-module | Responsibility |
//! | ---------- | -------------- |
//! | [`update`] | Per-frame rendering, request handling, state persistence |
//! | [`run`]    | Top-level [`run_aoimap()`] entry point and icon loading |

mod run;
mod update;

pub use run::run_aoimap;

use crate::config::AoiMapConfig;
use crate::geocoding::Geocoder;
use crate::map::MapPanel;
use crate::panels::{IconBar, MapControls, Sidebar, Toolbox};
use crate::persistence;
use crate::store::{AoiStore, Tool};
use crate::vector::VectorSource;

/// Key of the single persisted state blob in eframe storage.
pub(crate) const STORAGE_KEY: &str = "aoimap-state";

/// The composed application: one store, one vector source, the map view, the
/// panels, and the transient tool selection.
pub struct AoiApp {
    pub(crate) store: AoiStore,
    pub(crate) source: VectorSource,
    pub(crate) map: MapPanel,
    pub(crate) sidebar: Sidebar,
    pub(crate) toolbox: Toolbox,
    pub(crate) icon_bar: IconBar,
    pub(crate) controls: MapControls,
    pub(crate) geocoder: Geocoder,
    pub(crate) active_tool: Option<Tool>,
}

impl AoiApp {
    /// Build the app, rehydrating persisted state from eframe storage.
    pub fn new(config: AoiMapConfig, storage: Option<&dyn eframe::Storage>) -> Self {
        let mut store = AoiStore::new();
        let mut source = VectorSource::new();
        if let Some(json) = storage.and_then(|s| s.get_string(STORAGE_KEY)) {
            match persistence::state_from_json(&json) {
                Ok(state) => persistence::apply_state(state, &mut store, &mut source),
                Err(err) => eprintln!("Failed to restore saved state: {err}"),
            }
        }
        let map = MapPanel::new(&config);
        let geocoder = Geocoder::spawn(config.nominatim_url.clone());
        Self {
            store,
            source,
            map,
            sidebar: Sidebar::default(),
            toolbox: Toolbox,
            icon_bar: IconBar,
            controls: MapControls,
            geocoder,
            active_tool: None,
        }
    }
}
