//! Map overlay plugins: AOI polygons and the base outline.
//!
//! Plugins are rebuilt every frame from cloned geometry snapshots; the
//! `walkers` plugin API consumes them by value during map rendering.

use egui::{Color32, Pos2, Stroke, Ui};
use geo_types::{LineString, Polygon};
use walkers::{lon_lat, MapMemory, Plugin, Projector};

/// AOI fill, matching the stroke at 20 % alpha.
pub(crate) const AOI_STROKE: Color32 = Color32::from_rgb(0x3b, 0x82, 0xf6);
pub(crate) const AOI_FILL: Color32 = Color32::from_rgba_premultiplied(12, 26, 49, 51);

/// Outline stroke (dashed) and its faint fill.
const OUTLINE_STROKE: Color32 = Color32::from_rgb(0xff, 0x6b, 0x35);
const OUTLINE_FILL: Color32 = Color32::from_rgba_premultiplied(25, 10, 5, 25);

/// Project a ring's vertices to screen space, skipping the closing
/// coordinate (screen polygons are implicitly closed).
pub(crate) fn project_ring(projector: &Projector, ring: &LineString<f64>) -> Vec<Pos2> {
    let coords = &ring.0;
    let open = if coords.len() > 1 && coords.first() == coords.last() {
        &coords[..coords.len() - 1]
    } else {
        &coords[..]
    };
    open.iter()
        .map(|c| {
            let screen = projector.project(lon_lat(c.x, c.y));
            Pos2::new(screen.x, screen.y)
        })
        .collect()
}

/// Renders the visible AOI features.
pub struct AoiLayerPlugin {
    pub polygons: Vec<Polygon<f64>>,
}

impl Plugin for AoiLayerPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut Ui,
        _response: &egui::Response,
        projector: &Projector,
        _map_memory: &MapMemory,
    ) {
        let painter = ui.painter();
        for polygon in &self.polygons {
            let points = project_ring(projector, polygon.exterior());
            if points.len() < 3 {
                continue;
            }
            painter.add(egui::Shape::convex_polygon(
                points.clone(),
                AOI_FILL,
                Stroke::NONE,
            ));
            for pair in points.windows(2) {
                painter.line_segment([pair[0], pair[1]], Stroke::new(2.0, AOI_STROKE));
            }
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                painter.line_segment([*last, *first], Stroke::new(2.0, AOI_STROKE));
            }
        }
    }
}

/// Renders the base outline as a dashed backdrop polygon.
pub struct OutlinePlugin {
    pub polygon: Option<Polygon<f64>>,
}

impl Plugin for OutlinePlugin {
    fn run(
        self: Box<Self>,
        ui: &mut Ui,
        _response: &egui::Response,
        projector: &Projector,
        _map_memory: &MapMemory,
    ) {
        let Some(polygon) = &self.polygon else {
            return;
        };
        let painter = ui.painter();
        let mut points = project_ring(projector, polygon.exterior());
        if points.len() < 3 {
            return;
        }
        painter.add(egui::Shape::convex_polygon(
            points.clone(),
            OUTLINE_FILL,
            Stroke::NONE,
        ));
        // Close the ring for the dashed border.
        points.push(points[0]);
        painter.extend(egui::Shape::dashed_line(
            &points,
            Stroke::new(3.0, OUTLINE_STROKE),
            10.0,
            5.0,
        ));
    }
}
