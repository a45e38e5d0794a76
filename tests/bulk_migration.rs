//! The bulk migration pass: early skips without filesystem probing, per-page
//! storage-label reuse, and per-asset failure isolation.

use chrono::{TimeZone, Utc};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

use shutter_move::{compile, Asset, AssetKind, ConfigSnapshot, RelocationEngine, Store};

fn asset(id: &str, owner: &str, path: &Path) -> Asset {
    Asset {
        id: id.into(),
        owner_id: owner.into(),
        path: path.to_path_buf(),
        file_name: format!("{id}.jpg"),
        checksum: "abc123".into(),
        size: 4,
        kind: AssetKind::Image,
        read_only: false,
        taken_at: Some(Utc.with_ymd_and_hms(2023, 2, 23, 0, 0, 0).unwrap()),
        modified_at: Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap(),
    }
}

fn snapshot(library_root: &Path) -> ConfigSnapshot {
    ConfigSnapshot {
        enabled: true,
        library_root: library_root.to_path_buf(),
        template: compile("{{y}}/{{y}}-{{MM}}-{{dd}}/{{assetId}}").unwrap(),
    }
}

fn fresh_store() -> Store {
    let store = Store::open_in_memory().unwrap();
    store.initialize().unwrap();
    store
}

#[test]
fn assets_already_at_their_target_are_skipped_without_moving() {
    let td = tempdir().unwrap();
    let library = td.path().join("library");
    let store = fresh_store();
    store.insert_user("u1", None).unwrap();

    // Already exactly at the template target.
    let in_place = library.join("u1").join("2023").join("2023-02-23").join("a1.jpg");
    fs::create_dir_all(in_place.parent().unwrap()).unwrap();
    fs::write(&in_place, b"one!").unwrap();
    store.insert_asset(&asset("a1", "u1", &in_place)).unwrap();

    // Sitting beside the target under a +N suffix: treated as an already
    // migrated duplicate and left alone.
    let suffixed = library.join("u1").join("2023").join("2023-02-23").join("a2+1.jpg");
    fs::write(&suffixed, b"two!").unwrap();
    store.insert_asset(&asset("a2", "u1", &suffixed)).unwrap();

    let engine = RelocationEngine::new(Arc::new(store));
    let summary = engine.relocate_all(&snapshot(&library));

    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 0);
    assert!(in_place.exists());
    assert!(suffixed.exists());
    // Neither asset was journaled: the skips happened before planning.
    assert!(engine
        .store()
        .move_for_entity("a1", shutter_move::PathKind::Original)
        .unwrap()
        .is_none());
    assert!(engine
        .store()
        .move_for_entity("a2", shutter_move::PathKind::Original)
        .unwrap()
        .is_none());
}

#[test]
fn one_failure_does_not_halt_the_batch() {
    let td = tempdir().unwrap();
    let library = td.path().join("library");
    let store = fresh_store();
    store.insert_user("u1", None).unwrap();

    // a1's source file is missing: its rename will fail.
    let ghost = td.path().join("ghost.jpg");
    store.insert_asset(&asset("a1", "u1", &ghost)).unwrap();

    let real = td.path().join("real.jpg");
    fs::write(&real, b"real").unwrap();
    store.insert_asset(&asset("a2", "u1", &real)).unwrap();

    let engine = RelocationEngine::new(Arc::new(store));
    let summary = engine.relocate_all(&snapshot(&library));

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);
    let moved = engine.store().asset("a2").unwrap().unwrap();
    assert_eq!(
        moved.path,
        library.join("u1").join("2023").join("2023-02-23").join("a2.jpg")
    );
    // The failed asset keeps its catalog path for the next retry.
    let failed = engine.store().asset("a1").unwrap().unwrap();
    assert_eq!(failed.path, ghost);
}

#[test]
fn storage_labels_are_applied_per_owner() {
    let td = tempdir().unwrap();
    let library = td.path().join("library");
    let store = fresh_store();
    store.insert_user("labelled", Some("label-1")).unwrap();
    store.insert_user("plain", None).unwrap();

    let one = td.path().join("one.jpg");
    fs::write(&one, b"one!").unwrap();
    store.insert_asset(&asset("a1", "labelled", &one)).unwrap();
    let two = td.path().join("two.jpg");
    fs::write(&two, b"two!").unwrap();
    store.insert_asset(&asset("a2", "plain", &two)).unwrap();

    let engine = RelocationEngine::new(Arc::new(store));
    let summary = engine.relocate_all(&snapshot(&library));
    assert_eq!(summary.succeeded, 2);

    assert!(library
        .join("label-1")
        .join("2023")
        .join("2023-02-23")
        .join("a1.jpg")
        .exists());
    assert!(library
        .join("plain")
        .join("2023")
        .join("2023-02-23")
        .join("a2.jpg")
        .exists());
}

#[test]
fn disabled_pass_touches_nothing() {
    let td = tempdir().unwrap();
    let library = td.path().join("library");
    let store = fresh_store();
    store.insert_user("u1", None).unwrap();
    let src = td.path().join("a1.jpg");
    fs::write(&src, b"one!").unwrap();
    store.insert_asset(&asset("a1", "u1", &src)).unwrap();

    let engine = RelocationEngine::new(Arc::new(store));
    let mut snap = snapshot(&library);
    snap.enabled = false;

    let summary = engine.relocate_all(&snap);
    assert_eq!(summary.total(), 0);
    assert!(src.exists());
    assert!(!library.exists());
}

#[test]
fn empty_catalog_finishes_cleanly() {
    let td = tempdir().unwrap();
    let engine = RelocationEngine::new(Arc::new(fresh_store()));
    let summary = engine.relocate_all(&snapshot(&td.path().join("library")));
    assert_eq!(summary.total(), 0);
    assert!(!summary.interrupted);
}
