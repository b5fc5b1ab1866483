//! Vector feature source: owns the polygon geometry rendered on the map.
//!
//! Application state (the AOI store) never embeds geometry; it references
//! features by [`FeatureId`]. The source is the single owner of all AOI
//! polygons and of their per-feature visibility flag, which the sync layer
//! derives from the store selection each frame.

use geo_types::Polygon;

/// Identifier of a feature held by a [`VectorSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(u64);

impl FeatureId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "feature-{}", self.0)
    }
}

/// A polygon feature with a visibility flag.
///
/// Coordinates are WGS-84 lon/lat; projection to screen space happens in the
/// map widget.
#[derive(Debug, Clone)]
pub struct Feature {
    pub id: FeatureId,
    pub polygon: Polygon<f64>,
    pub visible: bool,
}

/// The add/remove/query-by-id capability surface the store programs against.
///
/// The store only ever needs these operations, so it takes
/// `&mut dyn FeatureRegistry` and can be exercised in tests with any
/// implementation.
pub trait FeatureRegistry {
    /// Add a polygon and return its freshly assigned id.
    fn insert(&mut self, polygon: Polygon<f64>) -> FeatureId;
    /// Remove a feature. Returns `false` if the id is unknown.
    fn remove(&mut self, id: FeatureId) -> bool;
    /// Whether a feature with this id exists.
    fn contains(&self, id: FeatureId) -> bool;
    /// Remove all features.
    fn clear(&mut self);
}

/// Default registry: an ordered feature list, insertion order preserved.
///
/// Insertion order doubles as draw order, so the most recently drawn feature
/// is hit-tested first by the interaction layer.
#[derive(Debug, Default)]
pub struct VectorSource {
    features: Vec<Feature>,
    next_id: u64,
}

impl VectorSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| f.id == id)
    }

    /// All features in draw order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Replace a feature's geometry (edit tool). Returns `false` for unknown ids.
    pub fn set_geometry(&mut self, id: FeatureId, polygon: Polygon<f64>) -> bool {
        match self.get_mut(id) {
            Some(f) => {
                f.polygon = polygon;
                true
            }
            None => false,
        }
    }

    pub fn set_visible(&mut self, id: FeatureId, visible: bool) {
        if let Some(f) = self.get_mut(id) {
            f.visible = visible;
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl FeatureRegistry for VectorSource {
    fn insert(&mut self, polygon: Polygon<f64>) -> FeatureId {
        let id = FeatureId(self.next_id);
        self.next_id += 1;
        self.features.push(Feature {
            id,
            polygon,
            visible: true,
        });
        id
    }

    fn remove(&mut self, id: FeatureId) -> bool {
        let before = self.features.len();
        self.features.retain(|f| f.id != id);
        self.features.len() != before
    }

    fn contains(&self, id: FeatureId) -> bool {
        self.features.iter().any(|f| f.id == id)
    }

    fn clear(&mut self) {
        self.features.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Coord, LineString};

    fn triangle() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 0.0, y: 1.0 },
                Coord { x: 0.0, y: 0.0 },
            ]),
            vec![],
        )
    }

    #[test]
    fn insert_assigns_unique_ids() {
        let mut source = VectorSource::new();
        let a = source.insert(triangle());
        let b = source.insert(triangle());
        assert_ne!(a, b);
        assert!(source.contains(a));
        assert!(source.contains(b));
    }

    #[test]
    fn ids_are_not_reused_after_remove() {
        let mut source = VectorSource::new();
        let a = source.insert(triangle());
        assert!(source.remove(a));
        let b = source.insert(triangle());
        assert_ne!(a, b);
        assert!(!source.contains(a));
    }

    #[test]
    fn remove_unknown_id_is_reported() {
        let mut source = VectorSource::new();
        let a = source.insert(triangle());
        assert!(source.remove(a));
        assert!(!source.remove(a));
    }

    #[test]
    fn features_start_visible() {
        let mut source = VectorSource::new();
        let a = source.insert(triangle());
        assert!(source.get(a).map(|f| f.visible).unwrap_or(false));
    }
}
