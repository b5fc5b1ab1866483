//! Tile layers: the OSM basemap and the aerial-imagery WMS wrapped as a
//! slippy source.
//!
//! `walkers` only speaks slippy tiles, so the WMS orthophotos are requested
//! one `GetMap` per tile with the tile's EPSG:3857 bounding box.

use walkers::sources::{Attribution, TileSource};
use walkers::TileId;

/// Half the Web-Mercator world extent in EPSG:3857 meters.
const MERCATOR_EXTENT: f64 = 20_037_508.342_789_244;

/// EPSG:3857 bounding box of a slippy tile as `[minx, miny, maxx, maxy]`.
pub(crate) fn tile_bbox_3857(tile: TileId) -> [f64; 4] {
    let tiles_per_axis = (1u64 << tile.zoom) as f64;
    let tile_size = 2.0 * MERCATOR_EXTENT / tiles_per_axis;
    let min_x = -MERCATOR_EXTENT + tile.x as f64 * tile_size;
    let max_y = MERCATOR_EXTENT - tile.y as f64 * tile_size;
    [min_x, max_y - tile_size, min_x + tile_size, max_y]
}

/// Aerial orthophoto WMS served per-tile via EPSG:3857 GetMap requests.
pub struct WmsOrtho {
    url: String,
    layers: String,
}

impl WmsOrtho {
    pub fn new(url: impl Into<String>, layers: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            layers: layers.into(),
        }
    }
}

impl TileSource for WmsOrtho {
    fn tile_url(&self, tile_id: TileId) -> String {
        let [min_x, min_y, max_x, max_y] = tile_bbox_3857(tile_id);
        format!(
            "{}?SERVICE=WMS&VERSION=1.3.0&REQUEST=GetMap&LAYERS={}&STYLES=\
             &CRS=EPSG%3A3857&BBOX={min_x},{min_y},{max_x},{max_y}\
             &WIDTH=256&HEIGHT=256&FORMAT=image%2Fpng",
            self.url, self.layers
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "Geobasis NRW",
            url: "https://www.bezreg-koeln.nrw.de/geobasis-nrw",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        20
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_zero_tile_covers_the_world() {
        let bbox = tile_bbox_3857(TileId {
            x: 0,
            y: 0,
            zoom: 0,
        });
        assert!((bbox[0] + MERCATOR_EXTENT).abs() < 1e-6);
        assert!((bbox[1] + MERCATOR_EXTENT).abs() < 1e-6);
        assert!((bbox[2] - MERCATOR_EXTENT).abs() < 1e-6);
        assert!((bbox[3] - MERCATOR_EXTENT).abs() < 1e-6);
    }

    #[test]
    fn zoom_one_tiles_partition_the_extent() {
        let nw = tile_bbox_3857(TileId {
            x: 0,
            y: 0,
            zoom: 1,
        });
        let se = tile_bbox_3857(TileId {
            x: 1,
            y: 1,
            zoom: 1,
        });
        // North-west tile ends where the south-east tile starts.
        assert!((nw[2] - 0.0).abs() < 1e-6);
        assert!((nw[1] - 0.0).abs() < 1e-6);
        assert!((se[0] - 0.0).abs() < 1e-6);
        assert!((se[3] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn get_map_request_carries_bbox_and_layers() {
        let source = WmsOrtho::new("https://example.test/wms", "ortho_rgb");
        let url = source.tile_url(TileId {
            x: 0,
            y: 0,
            zoom: 0,
        });
        assert!(url.starts_with("https://example.test/wms?SERVICE=WMS"));
        assert!(url.contains("LAYERS=ortho_rgb"));
        assert!(url.contains("CRS=EPSG%3A3857"));
        assert!(url.contains("WIDTH=256&HEIGHT=256"));
    }
}
