use aoimap::{AoiStore, FeatureRegistry, VectorSource};
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

fn names(store: &AoiStore) -> Vec<String> {
    store.aois().iter().map(|a| a.name.clone()).collect()
}

#[test]
fn names_stay_sequential_across_interleaved_adds_and_deletes() {
    let mut store = AoiStore::new();
    let mut source = VectorSource::new();
    for i in 0..4 {
        let fid = source.insert(poly(i as f64));
        store.add(fid);
    }
    // Delete the second and the (new) third, then add one more.
    let second = store.aois()[1].id;
    store.delete(second, &mut source);
    let third = store.aois()[2].id;
    store.delete(third, &mut source);
    let fid = source.insert(poly(10.0));
    store.add(fid);

    assert_eq!(names(&store), ["AOI 1", "AOI 2", "AOI 3"]);
    assert_eq!(source.len(), 3);
}

#[test]
fn erase_by_feature_resolves_to_the_owning_aoi() {
    let mut store = AoiStore::new();
    let mut source = VectorSource::new();
    let fid_a = source.insert(poly(0.0));
    store.add(fid_a);
    let fid_b = source.insert(poly(5.0));
    store.add(fid_b);

    // The erase interaction sees features, not AOIs.
    let id = store.find_by_feature(fid_a).map(|a| a.id).unwrap();
    assert!(store.delete(id, &mut source));
    assert!(store.find_by_feature(fid_a).is_none());
    assert_eq!(names(&store), ["AOI 1"]);
}

#[test]
fn confirm_reset_cycle_keeps_the_aoi_set_intact() {
    let mut store = AoiStore::new();
    let mut source = VectorSource::new();
    let fid = source.insert(poly(0.0));
    store.add(fid);

    assert!(store.confirm());
    // Frozen: a freshly inserted feature cannot become an AOI.
    let stray = source.insert(poly(2.0));
    assert!(store.add(stray).is_none());
    source.remove(stray);

    store.reset();
    let fid2 = source.insert(poly(3.0));
    assert!(store.add(fid2).is_some());
    assert_eq!(names(&store), ["AOI 1", "AOI 2"]);
}

#[test]
fn clear_all_works_even_while_confirmed() {
    let mut store = AoiStore::new();
    let mut source = VectorSource::new();
    let fid = source.insert(poly(0.0));
    store.add(fid);
    store.confirm();

    store.clear_all(&mut source);
    assert!(store.is_empty());
    assert!(source.is_empty());
    assert!(!store.is_confirmed());
    // Back to a drawable state.
    let fid = source.insert(poly(1.0));
    assert!(store.add(fid).is_some());
}
