//! Configuration for the AOI map UI.

/// Top-level configuration.
///
/// | Field            | Purpose |
/// |------------------|---------|
/// | `initial_center` | Viewport center (lon, lat) before any search |
/// | `initial_zoom`   | Viewport zoom before any search |
/// | `nominatim_url`  | Geocoding endpoint (override for self-hosted instances) |
/// | `wms_url`        | GetMap endpoint for the aerial-imagery base layer |
/// | `wms_layers`     | WMS layer list requested per tile |
pub struct AoiMapConfig {
    /// Native window title.
    pub title: String,
    /// Initial viewport center as (lon, lat) in WGS-84.
    pub initial_center: (f64, f64),
    /// Initial slippy-map zoom level.
    pub initial_zoom: f64,
    /// Base URL of the Nominatim instance used for place search.
    pub nominatim_url: String,
    /// WMS endpoint serving the aerial orthophoto base imagery.
    pub wms_url: String,
    /// WMS `LAYERS` parameter.
    pub wms_layers: String,
    /// Optional eframe native-window options.
    pub native_options: Option<eframe::NativeOptions>,
}

impl Default for AoiMapConfig {
    fn default() -> Self {
        Self {
            title: "AOI Map".to_string(),
            // North Rhine-Westphalia, the region the default imagery covers.
            initial_center: (7.0, 51.5),
            initial_zoom: 8.0,
            nominatim_url: crate::geocoding::DEFAULT_BASE_URL.to_string(),
            wms_url: "https://www.wms.nrw.de/geobasis/wms_nw_dop".to_string(),
            wms_layers: "nw_dop_rgb".to_string(),
            native_options: None,
        }
    }
}
