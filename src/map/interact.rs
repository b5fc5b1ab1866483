//! The active map interaction: draw, edit, select, erase.
//!
//! Exactly one interaction runs at a time, chosen by the armed [`Tool`]. The
//! plugin reads pointer input from the map widget's response, converts
//! between screen and geographic space through the `walkers` projector, and
//! reports what happened as [`MapEvent`]s. Events are drained by the map
//! panel after the frame and turned into store/source mutations there, so
//! the interaction itself never touches application state.

use std::cell::RefCell;
use std::rc::Rc;

use egui::{Color32, Pos2, Stroke, Ui};
use geo::Contains;
use geo_types::{Coord, LineString, Point, Polygon};
use walkers::{lon_lat, MapMemory, Plugin, Projector};

use crate::store::Tool;
use crate::vector::{Feature, FeatureId};

use super::plugins::{project_ring, AOI_STROKE};

/// Screen-space radius within which a vertex can be grabbed or deduplicated.
const VERTEX_GRAB_PX: f32 = 10.0;

const DRAFT_COLOR: Color32 = Color32::from_rgb(0xff, 0xa5, 0x00);

/// Event emitted by an interaction, applied to the store after the frame.
#[derive(Debug)]
pub enum MapEvent {
    /// The draw tool closed a polygon.
    DrawFinished(Polygon<f64>),
    /// The select tool hit a feature.
    FeatureClicked(FeatureId),
    /// The erase tool hit a feature (select-to-delete).
    FeatureErased(FeatureId),
    /// The edit tool moved a vertex.
    GeometryEdited {
        feature: FeatureId,
        polygon: Polygon<f64>,
    },
}

/// In-progress polygon draft: lon/lat vertices in click order.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub vertices: Vec<Coord<f64>>,
}

impl Draft {
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// A polygon needs at least three vertices.
    pub fn can_close(&self) -> bool {
        self.vertices.len() >= 3
    }

    /// Close the draft into a polygon, or `None` if it cannot be closed.
    pub fn to_polygon(&self) -> Option<Polygon<f64>> {
        if !self.can_close() {
            return None;
        }
        let mut ring = self.vertices.clone();
        ring.push(ring[0]);
        Some(Polygon::new(LineString::from(ring), vec![]))
    }
}

/// Vertex currently being dragged by the edit tool.
#[derive(Debug, Clone, Copy)]
struct DragState {
    feature: FeatureId,
    vertex: usize,
}

/// Interaction state shared between the app and the per-frame plugin.
#[derive(Default)]
pub struct InteractionState {
    pub draft: Draft,
    drag: Option<DragState>,
    pub events: Vec<MapEvent>,
}

impl InteractionState {
    /// Discard any in-progress draft or drag (tool switch, confirmation).
    pub fn cancel(&mut self) {
        self.draft.clear();
        self.drag = None;
    }
}

pub struct InteractionPlugin {
    pub tool: Tool,
    pub state: Rc<RefCell<InteractionState>>,
    /// Snapshot of the source's features for hit testing, in draw order.
    pub features: Vec<Feature>,
}

impl Plugin for InteractionPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &MapMemory,
    ) {
        let mut state = self.state.borrow_mut();
        match self.tool {
            Tool::Draw => run_draw(&mut state, ui, response, projector),
            Tool::Edit => run_edit(&mut state, &self.features, ui, response, projector),
            Tool::Select => {
                if let Some(id) = hit_feature(&self.features, response, projector) {
                    state.events.push(MapEvent::FeatureClicked(id));
                }
            }
            Tool::Erase => {
                if let Some(id) = hit_feature(&self.features, response, projector) {
                    state.events.push(MapEvent::FeatureErased(id));
                }
            }
        }
    }
}

fn unproject(projector: &Projector, pos: Pos2) -> Coord<f64> {
    let position = projector.unproject(pos.to_vec2());
    Coord {
        x: position.x(),
        y: position.y(),
    }
}

/// Topmost visible feature under the pointer on click.
fn hit_feature(
    features: &[Feature],
    response: &egui::Response,
    projector: &Projector,
) -> Option<FeatureId> {
    if !response.clicked() {
        return None;
    }
    let pos = response.interact_pointer_pos()?;
    let coord = unproject(projector, pos);
    let point = Point::new(coord.x, coord.y);
    features
        .iter()
        .rev()
        .filter(|f| f.visible)
        .find(|f| f.polygon.contains(&point))
        .map(|f| f.id)
}

fn run_draw(
    state: &mut InteractionState,
    ui: &Ui,
    response: &egui::Response,
    projector: &Projector,
) {
    if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        state.draft.clear();
    } else if response.double_clicked() {
        // The first click of the pair already landed in the draft; drop it if
        // it sits on top of the previous vertex.
        dedupe_tail(&mut state.draft, projector);
        if let Some(polygon) = state.draft.to_polygon() {
            state.events.push(MapEvent::DrawFinished(polygon));
        }
        state.draft.clear();
    } else if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            state.draft.vertices.push(unproject(projector, pos));
        }
    }

    render_draft(&state.draft, ui, response, projector);
}

fn dedupe_tail(draft: &mut Draft, projector: &Projector) {
    if draft.vertices.len() < 2 {
        return;
    }
    let screen: Vec<Pos2> = draft
        .vertices
        .iter()
        .rev()
        .take(2)
        .map(|c| {
            let s = projector.project(lon_lat(c.x, c.y));
            Pos2::new(s.x, s.y)
        })
        .collect();
    if screen[0].distance(screen[1]) <= VERTEX_GRAB_PX {
        draft.vertices.pop();
    }
}

fn render_draft(draft: &Draft, ui: &Ui, response: &egui::Response, projector: &Projector) {
    if draft.is_empty() {
        return;
    }
    let painter = ui.painter();
    let mut points: Vec<Pos2> = draft
        .vertices
        .iter()
        .map(|c| {
            let s = projector.project(lon_lat(c.x, c.y));
            Pos2::new(s.x, s.y)
        })
        .collect();
    // Rubber band to the pointer.
    if let Some(hover) = response.hover_pos() {
        points.push(hover);
    }
    for pair in points.windows(2) {
        painter.line_segment([pair[0], pair[1]], Stroke::new(2.0, DRAFT_COLOR));
    }
    if points.len() > 2 {
        painter.extend(egui::Shape::dashed_line(
            &[points[points.len() - 1], points[0]],
            Stroke::new(1.0, DRAFT_COLOR.linear_multiply(0.5)),
            6.0,
            4.0,
        ));
    }
    for point in points.iter().take(draft.vertices.len()) {
        painter.circle_filled(*point, 4.0, DRAFT_COLOR);
    }
}

fn run_edit(
    state: &mut InteractionState,
    features: &[Feature],
    ui: &Ui,
    response: &egui::Response,
    projector: &Projector,
) {
    if response.drag_started() {
        if let Some(pos) = response.interact_pointer_pos() {
            state.drag = grab_vertex(features, pos, projector);
        }
    }
    if response.drag_stopped() {
        state.drag = None;
    }
    if let Some(drag) = state.drag {
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(feature) = features.iter().find(|f| f.id == drag.feature) {
                    let moved = unproject(projector, pos);
                    if let Some(polygon) =
                        with_vertex(&feature.polygon, drag.vertex, moved)
                    {
                        state.events.push(MapEvent::GeometryEdited {
                            feature: drag.feature,
                            polygon,
                        });
                    }
                }
            }
        }
    }

    render_handles(features, ui, projector, state.drag.map(|d| d.feature));
}

/// Nearest vertex of a visible feature within grab distance of `pos`.
fn grab_vertex(features: &[Feature], pos: Pos2, projector: &Projector) -> Option<DragState> {
    let mut best: Option<(DragState, f32)> = None;
    for feature in features.iter().filter(|f| f.visible) {
        for (index, vertex) in ring_vertices(&feature.polygon).iter().enumerate() {
            let s = projector.project(lon_lat(vertex.x, vertex.y));
            let dist = Pos2::new(s.x, s.y).distance(pos);
            if dist <= VERTEX_GRAB_PX && best.map(|(_, d)| dist < d).unwrap_or(true) {
                best = Some((
                    DragState {
                        feature: feature.id,
                        vertex: index,
                    },
                    dist,
                ));
            }
        }
    }
    best.map(|(drag, _)| drag)
}

/// Exterior-ring vertices without the closing duplicate.
fn ring_vertices(polygon: &Polygon<f64>) -> Vec<Coord<f64>> {
    let coords = &polygon.exterior().0;
    if coords.len() > 1 && coords.first() == coords.last() {
        coords[..coords.len() - 1].to_vec()
    } else {
        coords.clone()
    }
}

/// The polygon with vertex `index` moved to `coord`, ring re-closed.
fn with_vertex(polygon: &Polygon<f64>, index: usize, coord: Coord<f64>) -> Option<Polygon<f64>> {
    let mut vertices = ring_vertices(polygon);
    let slot = vertices.get_mut(index)?;
    *slot = coord;
    vertices.push(vertices[0]);
    Some(Polygon::new(LineString::from(vertices), vec![]))
}

fn render_handles(
    features: &[Feature],
    ui: &Ui,
    projector: &Projector,
    dragged: Option<FeatureId>,
) {
    let painter = ui.painter();
    for feature in features.iter().filter(|f| f.visible) {
        let active = dragged == Some(feature.id);
        for point in project_ring(projector, feature.polygon.exterior()) {
            painter.circle_filled(point, if active { 5.0 } else { 4.0 }, Color32::WHITE);
            painter.circle_stroke(point, if active { 5.0 } else { 4.0 }, Stroke::new(1.5, AOI_STROKE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn draft_needs_three_vertices_to_close() {
        let mut draft = Draft::default();
        draft.vertices.push(coord(0.0, 0.0));
        draft.vertices.push(coord(1.0, 0.0));
        assert!(draft.to_polygon().is_none());
        draft.vertices.push(coord(1.0, 1.0));
        let polygon = draft.to_polygon().unwrap();
        assert_eq!(polygon.exterior().0.len(), 4);
        assert_eq!(
            polygon.exterior().0.first(),
            polygon.exterior().0.last()
        );
    }

    #[test]
    fn cancel_discards_draft() {
        let mut state = InteractionState::default();
        state.draft.vertices.push(coord(0.0, 0.0));
        state.cancel();
        assert!(state.draft.is_empty());
    }

    #[test]
    fn moving_the_first_vertex_keeps_the_ring_closed() {
        let polygon = Polygon::new(
            LineString::from(vec![
                coord(0.0, 0.0),
                coord(2.0, 0.0),
                coord(2.0, 2.0),
                coord(0.0, 0.0),
            ]),
            vec![],
        );
        let moved = with_vertex(&polygon, 0, coord(-1.0, -1.0)).unwrap();
        let coords = &moved.exterior().0;
        assert_eq!(coords.first(), coords.last());
        assert_eq!(coords[0], coord(-1.0, -1.0));
    }

    #[test]
    fn with_vertex_rejects_out_of_range_index() {
        let polygon = Polygon::new(
            LineString::from(vec![
                coord(0.0, 0.0),
                coord(2.0, 0.0),
                coord(2.0, 2.0),
                coord(0.0, 0.0),
            ]),
            vec![],
        );
        assert!(with_vertex(&polygon, 3, coord(9.0, 9.0)).is_none());
    }
}
