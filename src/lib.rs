//! AOI Map crate root: re-exports and module wiring.
//!
//! A single-window mapping UI for defining polygonal Areas of Interest:
//! search for a place, view map/satellite imagery, draw and edit AOIs, and
//! confirm a final set.
//!
//! The implementation is split into cohesive modules:
//! - `store`: the AOI state store (list, selection, confirmation, view mode)
//! - `vector`: the feature registry owning polygon geometry
//! - `geocoding`: Nominatim place search with stale-response suppression
//! - `map`: the walkers-based map view, overlays, and interactions
//! - `panels`: sidebar, toolbox, icon bar, and map controls
//! - `persistence`: serializable state mirrors and GeoJSON export
//! - `app`: composition and the eframe entry point

pub mod app;
pub mod config;
pub mod geocoding;
pub mod map;
pub mod panels;
pub mod persistence;
pub mod store;
pub mod vector;

// Public re-exports for a compact external API
pub use app::{run_aoimap, AoiApp};
pub use config::AoiMapConfig;
pub use geocoding::{Geocoder, GeocodeOutcome, LonLatBounds, NominatimClient, Place};
pub use store::{Aoi, AoiId, AoiStore, MapViewMode, Tool};
pub use vector::{Feature, FeatureId, FeatureRegistry, VectorSource};
