use aoimap::persistence::{
    aois_to_feature_collection, apply_state, capture_state, load_state_from_path,
    save_state_to_path, state_from_json, state_to_json,
};
use aoimap::{AoiStore, FeatureRegistry, MapViewMode, VectorSource};
use geo_types::{Coord, LineString, Polygon};

fn poly(offset: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            Coord {
                x: offset,
                y: offset,
            },
            Coord {
                x: offset + 1.0,
                y: offset,
            },
            Coord {
                x: offset + 1.0,
                y: offset + 1.0,
            },
            Coord {
                x: offset,
                y: offset,
            },
        ]),
        vec![],
    )
}

fn populated() -> (AoiStore, VectorSource) {
    let mut store = AoiStore::new();
    let mut source = VectorSource::new();
    for i in 0..3 {
        let fid = source.insert(poly(i as f64 * 2.0));
        store.add(fid);
    }
    store.rename(store.aois()[1].id, "Harbour");
    store.set_view_mode(MapViewMode::Map);
    store.confirm();
    (store, source)
}

#[test]
fn state_round_trips_through_json() {
    let (store, source) = populated();
    let snapshot = capture_state(&store, &source);
    let json = state_to_json(&snapshot).unwrap();
    let parsed = state_from_json(&json).unwrap();

    let mut restored_store = AoiStore::new();
    let mut restored_source = VectorSource::new();
    apply_state(parsed, &mut restored_store, &mut restored_source);

    assert_eq!(restored_store.len(), 3);
    assert_eq!(restored_source.len(), 3);
    assert!(restored_store.is_confirmed());
    assert_eq!(restored_store.view_mode(), MapViewMode::Map);
    let names: Vec<_> = restored_store
        .aois()
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, ["AOI 1", "Harbour", "AOI 3"]);

    // Geometry survives: every restored AOI resolves to a live feature.
    assert!(restored_store.orphans(&restored_source).is_empty());
    let second = &restored_store.aois()[1];
    let feature = restored_source.get(second.feature_id).unwrap();
    assert_eq!(feature.polygon.exterior().0[0], Coord { x: 2.0, y: 2.0 });
}

#[test]
fn restored_ids_do_not_collide_with_new_aois() {
    let (store, source) = populated();
    let snapshot = capture_state(&store, &source);

    let mut restored_store = AoiStore::new();
    let mut restored_source = VectorSource::new();
    apply_state(snapshot, &mut restored_store, &mut restored_source);
    restored_store.reset();

    let fid = restored_source.insert(poly(9.0));
    let new_id = restored_store.add(fid).unwrap();
    assert!(restored_store
        .aois()
        .iter()
        .filter(|a| a.id == new_id)
        .count()
        == 1);
}

#[test]
fn orphaned_aois_are_skipped_on_capture() {
    let (store, mut source) = populated();
    // Drop one feature behind the store's back.
    let fid = store.aois()[0].feature_id;
    source.remove(fid);

    let snapshot = capture_state(&store, &source);
    assert_eq!(snapshot.aois.len(), 2);
}

#[test]
fn confirmed_is_not_restored_onto_an_empty_set() {
    let json = r#"{ "aois": [], "view_mode": "Base", "confirmed": true }"#;
    let parsed = state_from_json(json).unwrap();
    let mut store = AoiStore::new();
    let mut source = VectorSource::new();
    apply_state(parsed, &mut store, &mut source);
    assert!(!store.is_confirmed());
}

#[test]
fn non_polygonal_rows_are_dropped_on_apply() {
    let json = r#"{
      "aois": [
        {
          "id": 0,
          "name": "AOI 1",
          "created_at": "2024-05-01T12:00:00+00:00",
          "geometry": { "type": "Point", "coordinates": [7.0, 51.0] }
        }
      ],
      "view_mode": "Map",
      "confirmed": false
    }"#;
    let parsed = state_from_json(json).unwrap();
    let mut store = AoiStore::new();
    let mut source = VectorSource::new();
    apply_state(parsed, &mut store, &mut source);
    assert!(store.is_empty());
    assert!(source.is_empty());
    assert_eq!(store.view_mode(), MapViewMode::Map);
}

#[test]
fn state_round_trips_through_a_file() {
    let (store, source) = populated();
    let snapshot = capture_state(&store, &source);
    let path = std::env::temp_dir().join("aoimap-state-roundtrip.json");

    save_state_to_path(&snapshot, &path).unwrap();
    let loaded = load_state_from_path(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.aois.len(), 3);
    assert!(loaded.confirmed);
}

#[test]
fn geojson_export_carries_names_and_geometry() {
    let (store, source) = populated();
    let collection = aois_to_feature_collection(&store, &source);
    assert_eq!(collection.features.len(), 3);
    let second = &collection.features[1];
    let name = second
        .properties
        .as_ref()
        .and_then(|p| p.get("name"))
        .and_then(|v| v.as_str());
    assert_eq!(name, Some("Harbour"));
    assert!(second.geometry.is_some());
}
