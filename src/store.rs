//! The AOI store: application state mutated only through action methods.
//!
//! The store holds the AOI list, the single selection, the confirmation flag,
//! the raster view mode and the transient search text. It owns no geometry;
//! AOIs reference features in a [`VectorSource`] by id. Panels receive the
//! store by reference and call actions; the map view projects store state
//! onto feature visibility once per frame.
//!
//! Confirmation semantics: `confirm` only succeeds with at least one AOI and
//! is monotonic until `reset`. While confirmed, `add` and `delete` are
//! rejected; `rename` and `select` still function.

use chrono::{DateTime, Utc};

use crate::vector::{FeatureId, FeatureRegistry, VectorSource};

/// Which raster layer the map shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapViewMode {
    /// Aerial orthophoto imagery (the "Base Image").
    #[default]
    Base,
    /// OpenStreetMap tiles.
    Map,
}

/// The drawing/editing tools. At most one is armed at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Draw,
    Edit,
    Select,
    Erase,
}

/// Identifier of an AOI record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AoiId(u64);

impl AoiId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// One Area of Interest. Geometry lives in the vector source, referenced by
/// `feature_id`.
#[derive(Debug, Clone)]
pub struct Aoi {
    pub id: AoiId,
    pub name: String,
    pub feature_id: FeatureId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct AoiStore {
    aois: Vec<Aoi>,
    selected: Option<AoiId>,
    confirmed: bool,
    view_mode: MapViewMode,
    search_text: String,
    next_id: u64,
}

impl AoiStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn aois(&self) -> &[Aoi] {
        &self.aois
    }

    pub fn get(&self, id: AoiId) -> Option<&Aoi> {
        self.aois.iter().find(|a| a.id == id)
    }

    /// The AOI referencing the given feature, if any (used by the erase and
    /// select interactions, which see features rather than AOIs).
    pub fn find_by_feature(&self, feature_id: FeatureId) -> Option<&Aoi> {
        self.aois.iter().find(|a| a.feature_id == feature_id)
    }

    pub fn selected(&self) -> Option<AoiId> {
        self.selected
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn view_mode(&self) -> MapViewMode {
        self.view_mode
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn is_empty(&self) -> bool {
        self.aois.is_empty()
    }

    pub fn len(&self) -> usize {
        self.aois.len()
    }

    // ── Actions ──────────────────────────────────────────────────────────────

    /// Create an AOI for a freshly drawn feature. Returns `None` (and leaves
    /// the store untouched) while confirmed.
    pub fn add(&mut self, feature_id: FeatureId) -> Option<AoiId> {
        if self.confirmed {
            return None;
        }
        let id = AoiId(self.next_id);
        self.next_id += 1;
        self.aois.push(Aoi {
            id,
            name: format!("AOI {}", self.aois.len() + 1),
            feature_id,
            created_at: Utc::now(),
        });
        Some(id)
    }

    /// Delete an AOI and its feature. Clears the selection if it pointed at
    /// the removed AOI and reindexes the remaining names. No-op while
    /// confirmed or for unknown ids.
    pub fn delete(&mut self, id: AoiId, source: &mut dyn FeatureRegistry) -> bool {
        if self.confirmed {
            return false;
        }
        let Some(pos) = self.aois.iter().position(|a| a.id == id) else {
            return false;
        };
        let removed = self.aois.remove(pos);
        source.remove(removed.feature_id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.reindex();
        true
    }

    /// Rename an AOI. Allowed while confirmed; the next delete's reindex will
    /// overwrite custom names with sequential ones again.
    pub fn rename(&mut self, id: AoiId, name: impl Into<String>) -> bool {
        match self.aois.iter_mut().find(|a| a.id == id) {
            Some(aoi) => {
                aoi.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Set or clear the single selection. Selecting an unknown id is ignored.
    pub fn select(&mut self, id: Option<AoiId>) {
        match id {
            Some(id) if self.get(id).is_none() => {}
            other => self.selected = other,
        }
    }

    /// Freeze the AOI set. Only transitions with at least one AOI.
    pub fn confirm(&mut self) -> bool {
        if self.aois.is_empty() {
            return false;
        }
        self.confirmed = true;
        true
    }

    /// Clear the confirmation flag. AOIs and selection are untouched.
    pub fn reset(&mut self) {
        self.confirmed = false;
    }

    /// Remove every AOI, the selection, the confirmation flag, and all
    /// features from the source.
    pub fn clear_all(&mut self, source: &mut dyn FeatureRegistry) {
        source.clear();
        self.aois.clear();
        self.selected = None;
        self.confirmed = false;
    }

    pub fn set_view_mode(&mut self, mode: MapViewMode) {
        self.view_mode = mode;
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Ids of AOIs whose feature no longer exists in the source. Orphans are
    /// reported, never silently repaired.
    pub fn orphans(&self, source: &VectorSource) -> Vec<AoiId> {
        self.aois
            .iter()
            .filter(|a| !source.contains(a.feature_id))
            .map(|a| a.id)
            .collect()
    }

    fn reindex(&mut self) {
        for (i, aoi) in self.aois.iter_mut().enumerate() {
            aoi.name = format!("AOI {}", i + 1);
        }
    }

    // ── Persistence support ──────────────────────────────────────────────────

    /// Re-insert a restored AOI, keeping its persisted id and name.
    pub(crate) fn push_restored(&mut self, aoi: Aoi) {
        self.next_id = self.next_id.max(aoi.id.as_u64() + 1);
        self.aois.push(aoi);
    }

    pub(crate) fn restore_confirmed(&mut self, confirmed: bool) {
        self.confirmed = confirmed;
    }

    pub(crate) fn restored_id(raw: u64) -> AoiId {
        AoiId(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::VectorSource;
    use geo_types::{Coord, LineString, Polygon};

    fn square() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 1.0, y: 1.0 },
                Coord { x: 0.0, y: 1.0 },
                Coord { x: 0.0, y: 0.0 },
            ]),
            vec![],
        )
    }

    fn store_with(n: usize) -> (AoiStore, VectorSource) {
        let mut store = AoiStore::new();
        let mut source = VectorSource::new();
        for _ in 0..n {
            let fid = source.insert(square());
            store.add(fid);
        }
        (store, source)
    }

    #[test]
    fn names_are_sequential_on_add() {
        let (store, _) = store_with(3);
        let names: Vec<_> = store.aois().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["AOI 1", "AOI 2", "AOI 3"]);
    }

    #[test]
    fn delete_reindexes_and_discards_custom_names() {
        let (mut store, mut source) = store_with(3);
        let first = store.aois()[0].id;
        let second = store.aois()[1].id;
        store.rename(second, "Harbour");
        store.delete(first, &mut source);
        let names: Vec<_> = store.aois().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["AOI 1", "AOI 2"]);
    }

    #[test]
    fn delete_removes_the_feature() {
        let (mut store, mut source) = store_with(2);
        let id = store.aois()[0].id;
        let fid = store.aois()[0].feature_id;
        assert!(store.delete(id, &mut source));
        assert!(!source.contains(fid));
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn deleting_selected_aoi_clears_selection() {
        let (mut store, mut source) = store_with(2);
        let id = store.aois()[0].id;
        store.select(Some(id));
        store.delete(id, &mut source);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn deleting_other_aoi_keeps_selection() {
        let (mut store, mut source) = store_with(2);
        let keep = store.aois()[0].id;
        let drop = store.aois()[1].id;
        store.select(Some(keep));
        store.delete(drop, &mut source);
        assert_eq!(store.selected(), Some(keep));
    }

    #[test]
    fn confirm_requires_an_aoi() {
        let (mut store, _) = store_with(0);
        assert!(!store.confirm());
        assert!(!store.is_confirmed());
    }

    #[test]
    fn confirmed_store_rejects_add_and_delete() {
        let (mut store, mut source) = store_with(1);
        assert!(store.confirm());
        let fid = source.insert(square());
        assert_eq!(store.add(fid), None);
        let id = store.aois()[0].id;
        assert!(!store.delete(id, &mut source));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn rename_and_select_still_work_while_confirmed() {
        let (mut store, _) = store_with(2);
        store.confirm();
        let id = store.aois()[0].id;
        assert!(store.rename(id, "Site A"));
        assert_eq!(store.get(id).map(|a| a.name.as_str()), Some("Site A"));
        store.select(Some(id));
        assert_eq!(store.selected(), Some(id));
    }

    #[test]
    fn reset_clears_only_the_flag() {
        let (mut store, _) = store_with(2);
        let id = store.aois()[0].id;
        store.select(Some(id));
        store.confirm();
        store.reset();
        assert!(!store.is_confirmed());
        assert_eq!(store.len(), 2);
        assert_eq!(store.selected(), Some(id));
    }

    #[test]
    fn clear_all_empties_store_and_source() {
        let (mut store, mut source) = store_with(3);
        store.select(Some(store.aois()[1].id));
        store.confirm();
        store.clear_all(&mut source);
        assert!(store.is_empty());
        assert_eq!(store.selected(), None);
        assert!(!store.is_confirmed());
        assert!(source.is_empty());
    }

    #[test]
    fn selecting_unknown_id_is_ignored() {
        let (mut store, _) = store_with(1);
        let id = store.aois()[0].id;
        store.select(Some(id));
        store.select(Some(AoiId(9999)));
        assert_eq!(store.selected(), Some(id));
    }

    #[test]
    fn orphans_reports_dangling_feature_refs() {
        let (mut store, mut source) = store_with(2);
        let fid = store.aois()[0].feature_id;
        // Remove the feature behind the store's back.
        source.remove(fid);
        let orphans = store.orphans(&source);
        assert_eq!(orphans, vec![store.aois()[0].id]);
        store.select(Some(store.aois()[1].id));
        assert_eq!(store.orphans(&source).len(), 1);
    }
}
