//! State persistence: save and load application state to/from JSON.
//!
//! This module provides serializable mirror types for state that cannot
//! directly derive serde traits: AOI geometry lives in the vector source as
//! `geo-types` polygons and is mirrored as GeoJSON. The same mirrors back the
//! eframe-storage blob (rehydrated on startup) and explicit save/load to a
//! file path, plus the GeoJSON export of the AOI set.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Aoi, AoiStore, MapViewMode};
use crate::vector::{FeatureRegistry, VectorSource};

// ---------- Serializable mirror types ----------

/// Serializable version of MapViewMode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MapViewSerde {
    Base,
    Map,
}

impl From<MapViewMode> for MapViewSerde {
    fn from(mode: MapViewMode) -> Self {
        match mode {
            MapViewMode::Base => MapViewSerde::Base,
            MapViewMode::Map => MapViewSerde::Map,
        }
    }
}

impl From<MapViewSerde> for MapViewMode {
    fn from(mode: MapViewSerde) -> Self {
        match mode {
            MapViewSerde::Base => MapViewMode::Base,
            MapViewSerde::Map => MapViewMode::Map,
        }
    }
}

/// Serializable AOI with its geometry inlined as GeoJSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AoiSerde {
    pub id: u64,
    pub name: String,
    /// RFC 3339.
    pub created_at: String,
    pub geometry: geojson::Geometry,
}

/// Full application state (for save/load and the storage blob).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStateSerde {
    pub aois: Vec<AoiSerde>,
    pub view_mode: MapViewSerde,
    pub confirmed: bool,
}

impl Default for AppStateSerde {
    fn default() -> Self {
        Self {
            aois: Vec::new(),
            view_mode: MapViewSerde::Base,
            confirmed: false,
        }
    }
}

// ---------- Capture / apply ----------

/// Snapshot store + source into the serializable mirror. AOIs whose feature
/// is missing from the source are skipped (they cannot be restored without
/// geometry).
pub fn capture_state(store: &AoiStore, source: &VectorSource) -> AppStateSerde {
    let aois = store
        .aois()
        .iter()
        .filter_map(|aoi| {
            let feature = source.get(aoi.feature_id)?;
            Some(AoiSerde {
                id: aoi.id.as_u64(),
                name: aoi.name.clone(),
                created_at: aoi.created_at.to_rfc3339(),
                geometry: geojson::Geometry::new(geojson::Value::from(&feature.polygon)),
            })
        })
        .collect();
    AppStateSerde {
        aois,
        view_mode: store.view_mode().into(),
        confirmed: store.is_confirmed(),
    }
}

/// Rebuild store + source from a snapshot. Geometry is deserialized back into
/// live features; rows whose geometry cannot be interpreted as a polygon are
/// dropped with a report.
pub fn apply_state(state: AppStateSerde, store: &mut AoiStore, source: &mut VectorSource) {
    store.clear_all(source);
    for row in state.aois {
        let polygon = match geo_types::Geometry::<f64>::try_from(&row.geometry) {
            Ok(geo_types::Geometry::Polygon(p)) => p,
            Ok(geo_types::Geometry::MultiPolygon(mp)) => match mp.0.into_iter().next() {
                Some(p) => p,
                None => continue,
            },
            _ => {
                eprintln!(
                    "Skipping stored AOI {:?}: geometry is not polygonal",
                    row.name
                );
                continue;
            }
        };
        let feature_id = source.insert(polygon);
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        store.push_restored(Aoi {
            id: AoiStore::restored_id(row.id),
            name: row.name,
            feature_id,
            created_at,
        });
    }
    store.set_view_mode(state.view_mode.into());
    // Never restore "confirmed" onto an empty set.
    store.restore_confirmed(state.confirmed && !store.is_empty());
}

// ---------- Public API ----------

/// Serialize the application state as pretty JSON.
pub fn state_to_json(state: &AppStateSerde) -> Result<String, String> {
    serde_json::to_string_pretty(state).map_err(|e| e.to_string())
}

/// Deserialize application state from JSON.
pub fn state_from_json(json: &str) -> Result<AppStateSerde, String> {
    serde_json::from_str(json).map_err(|e| e.to_string())
}

/// Save the application state to a JSON file at the given path.
pub fn save_state_to_path(state: &AppStateSerde, path: &Path) -> Result<(), String> {
    let txt = state_to_json(state)?;
    std::fs::write(path, txt).map_err(|e| e.to_string())
}

/// Load the application state from a JSON file at the given path.
pub fn load_state_from_path(path: &Path) -> Result<AppStateSerde, String> {
    let txt = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    state_from_json(&txt)
}

// ---------- GeoJSON export ----------

/// The AOI set as a GeoJSON feature collection, with name and creation time
/// as feature properties.
pub fn aois_to_feature_collection(
    store: &AoiStore,
    source: &VectorSource,
) -> geojson::FeatureCollection {
    let features = store
        .aois()
        .iter()
        .filter_map(|aoi| {
            let feature = source.get(aoi.feature_id)?;
            let mut properties = serde_json::Map::new();
            properties.insert("name".to_string(), aoi.name.clone().into());
            properties.insert(
                "created_at".to_string(),
                aoi.created_at.to_rfc3339().into(),
            );
            Some(geojson::Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(
                    &feature.polygon,
                ))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect();
    geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Write the AOI set as GeoJSON to the given path.
pub fn save_geojson_to_path(
    store: &AoiStore,
    source: &VectorSource,
    path: &Path,
) -> Result<(), String> {
    let collection = aois_to_feature_collection(store, source);
    let txt = serde_json::to_string_pretty(&collection).map_err(|e| e.to_string())?;
    std::fs::write(path, txt).map_err(|e| e.to_string())
}
