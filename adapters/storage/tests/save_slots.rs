use std::fs;

use sokoban_core::{Command, Difficulty, Level, LevelHeader, LevelId, SessionSnapshot, Tile};
use sokoban_storage::{SaveSlot, SaveSlotStore, StorageError};
use sokoban_world::{apply, query, World};
use tempfile::TempDir;

fn snapshot() -> SessionSnapshot {
    let level = Level::new(
        LevelHeader {
            id: LevelId::new(5),
            name: "slot".to_owned(),
            par_time: 0,
            difficulty: Difficulty::None,
            box_count: 1,
        },
        3,
        1,
        vec![Tile::Player, Tile::Box, Tile::Goal],
    )
    .expect("valid level");
    let mut world = World::new();
    let mut events = Vec::new();
    apply(&mut world, Command::LoadLevel { level }, &mut events).expect("load");
    query::snapshot(&world).expect("session active")
}

#[test]
fn slots_are_ordered_by_creation_time() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = SaveSlotStore::open(dir.path()).expect("open");

    let _ = store.add(SaveSlot::new("zulu", 300, snapshot())).expect("add");
    let _ = store.add(SaveSlot::new("alpha", 500, snapshot())).expect("add");
    let position = store.add(SaveSlot::new("mike", 100, snapshot())).expect("add");

    assert_eq!(position, 0);
    let reopened = SaveSlotStore::open(dir.path()).expect("reopen");
    let names: Vec<&str> = reopened.slots().iter().map(SaveSlot::name).collect();
    assert_eq!(names, vec!["mike", "zulu", "alpha"]);
    assert_eq!(reopened.slots(), store.slots());
}

#[test]
fn duplicate_names_are_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = SaveSlotStore::open(dir.path()).expect("open");
    let _ = store.add(SaveSlot::new("first", 1, snapshot())).expect("add");
    let before = fs::read_to_string(dir.path().join("first.json")).expect("slot file");

    assert!(store.exists("first"));
    let error = store.add(SaveSlot::new("first", 2, snapshot())).unwrap_err();

    assert!(matches!(error, StorageError::DuplicateName { .. }));
    assert_eq!(
        fs::read_to_string(dir.path().join("first.json")).expect("slot file"),
        before
    );
    assert_eq!(store.len(), 1);
}

#[test]
fn delete_removes_exactly_one_file() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = SaveSlotStore::open(dir.path()).expect("open");
    for (name, created_at) in [("a", 1), ("b", 2), ("c", 3)] {
        let _ = store
            .add(SaveSlot::new(name, created_at, snapshot()))
            .expect("add");
    }

    let removed = store.delete(1).expect("delete");

    assert_eq!(removed.name(), "b");
    assert!(!dir.path().join("b.json").exists());
    assert!(dir.path().join("a.json").is_file());
    assert!(dir.path().join("c.json").is_file());
    assert_eq!(store.get(1).expect("present").name(), "c");
    assert!(matches!(
        store.delete(2),
        Err(StorageError::OutOfRange { index: 2, len: 2, .. })
    ));
}

#[test]
fn captured_slot_keeps_its_own_level_copy() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = SaveSlotStore::open(dir.path()).expect("open");
    let slot = SaveSlot::capture("now", snapshot());
    assert!(slot.created_at() > 0);

    let _ = store.add(slot.clone()).expect("add");

    let reopened = SaveSlotStore::open(dir.path()).expect("reopen");
    let stored = reopened.get(0).expect("present");
    assert_eq!(stored, &slot);
    assert_eq!(stored.snapshot().level.name(), "slot");
    assert_eq!(stored.snapshot().level.id(), LevelId::new(5));
}
