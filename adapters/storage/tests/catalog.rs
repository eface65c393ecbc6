use std::fs;

use sokoban_core::{Difficulty, Level, LevelHeader, LevelId, Tile};
use sokoban_storage::{
    format::{parse_level, write_level},
    level_file_name, LevelCatalog, LevelFormat, StorageError,
};
use tempfile::TempDir;

fn level(name: &str, rows: &[&str], difficulty: Difficulty) -> Level {
    let columns = rows[0].chars().count() as u32;
    let layout: Vec<Tile> = rows
        .iter()
        .rev()
        .flat_map(|row| row.chars().map(|code| Tile::from_code(code).expect("known code")))
        .collect();
    let box_count = layout.iter().filter(|tile| tile.is_box()).count() as u32;
    Level::new(
        LevelHeader {
            id: LevelId::new(0),
            name: name.to_owned(),
            par_time: if difficulty == Difficulty::None { 0 } else { 25 },
            difficulty,
            box_count,
        },
        columns,
        rows.len() as u32,
        layout,
    )
    .expect("fixture level is well formed")
}

fn asymmetric() -> Level {
    level(
        "asymmetric",
        &["#####", "#.  #", "# $*#", "#P &#", "#####"],
        Difficulty::Hard,
    )
}

#[test]
fn text_round_trip_preserves_grid_and_row_order() {
    let original = asymmetric();

    for format in [LevelFormat::Standard, LevelFormat::Authored] {
        let text = write_level(&original, format);
        let parsed = parse_level(&text).expect("written levels parse");

        assert_eq!(parsed.layout(), original.layout());
        assert_eq!(parsed.columns(), original.columns());
        assert_eq!(parsed.rows(), original.rows());
        assert_eq!(parsed.box_count(), original.box_count());
    }

    let text = write_level(&original, LevelFormat::Standard);
    let map: Vec<&str> = text.lines().skip_while(|line| *line != "Level map:").skip(1).collect();
    assert_eq!(map[3], "#P &#", "the bottom row is written last");
    assert_eq!(parse_level(&text).expect("parses"), original);
}

#[test]
fn every_engine_tile_survives_the_text_format() {
    let layout = vec![
        Tile::None,
        Tile::Wall,
        Tile::Floor,
        Tile::PlayerOnGoal,
        Tile::Box,
        Tile::Goal,
        Tile::Empty,
        Tile::BoxOnGoal,
    ];
    let original = Level::new(
        LevelHeader {
            id: LevelId::new(2),
            name: "all tiles".to_owned(),
            par_time: 0,
            difficulty: Difficulty::None,
            box_count: 2,
        },
        8,
        1,
        layout,
    )
    .expect("valid level");

    let parsed = parse_level(&write_level(&original, LevelFormat::Authored)).expect("parses");

    assert_eq!(parsed, original);
}

#[test]
fn open_creates_directory_and_sorts_by_id() {
    let dir = TempDir::new().expect("temp dir");
    let levels_dir = dir.path().join("levels");
    fs::create_dir_all(&levels_dir).expect("create dir");
    let second = level("second", &["P"], Difficulty::Easy).with_id(LevelId::new(1));
    let first = level("first", &["P$*"], Difficulty::Medium);
    fs::write(
        levels_dir.join("b.txt"),
        write_level(&first, LevelFormat::Standard),
    )
    .expect("write");
    fs::write(
        levels_dir.join("a.txt"),
        write_level(&second, LevelFormat::Standard),
    )
    .expect("write");
    fs::write(levels_dir.join("notes.md"), "ignored").expect("write");

    let catalog = LevelCatalog::open(&levels_dir, LevelFormat::Standard).expect("open");
    let names: Vec<&str> = catalog.levels().iter().map(Level::name).collect();
    assert_eq!(names, vec!["first", "second"]);

    let missing = dir.path().join("authored");
    let empty = LevelCatalog::open(&missing, LevelFormat::Authored).expect("open");
    assert!(empty.is_empty());
    assert!(missing.is_dir());
}

#[test]
fn add_assigns_append_index_and_persists() {
    let dir = TempDir::new().expect("temp dir");
    let mut catalog = LevelCatalog::open(dir.path(), LevelFormat::Authored).expect("open");

    let first = catalog
        .add(level("one", &["P"], Difficulty::None).with_id(LevelId::new(42)))
        .expect("add");
    let second = catalog.add(level("two", &["P$*"], Difficulty::None)).expect("add");

    assert_eq!(first, LevelId::new(0));
    assert_eq!(second, LevelId::new(1));
    assert!(dir.path().join("Level_000.txt").is_file());
    assert!(dir.path().join("Level_001.txt").is_file());
    assert!(catalog.contains_name("two"));
    assert!(!catalog.contains_name("three"));

    let reopened = LevelCatalog::open(dir.path(), LevelFormat::Authored).expect("reopen");
    assert_eq!(reopened.levels(), catalog.levels());
}

#[test]
fn delete_renumbers_later_levels_and_removes_last_file() {
    let dir = TempDir::new().expect("temp dir");
    let mut catalog = LevelCatalog::open(dir.path(), LevelFormat::Authored).expect("open");
    for name in ["zero", "one", "two", "three"] {
        let _ = catalog
            .add(level(name, &["P"], Difficulty::None))
            .expect("add");
    }

    let removed = catalog.delete(LevelId::new(1)).expect("delete");

    assert_eq!(removed.name(), "one");
    assert_eq!(catalog.len(), 3);
    let ids: Vec<u32> = catalog.levels().iter().map(|level| level.id().get()).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(catalog.get(LevelId::new(1)).expect("present").name(), "two");
    assert_eq!(catalog.get(LevelId::new(2)).expect("present").name(), "three");
    assert!(!dir.path().join(level_file_name(LevelId::new(3))).exists());

    let reopened = LevelCatalog::open(dir.path(), LevelFormat::Authored).expect("reopen");
    let names: Vec<&str> = reopened.levels().iter().map(Level::name).collect();
    assert_eq!(names, vec!["zero", "two", "three"]);
}

#[test]
fn rename_rewrites_a_single_record() {
    let dir = TempDir::new().expect("temp dir");
    let mut catalog = LevelCatalog::open(dir.path(), LevelFormat::Authored).expect("open");
    let id = catalog.add(asymmetric()).expect("add");

    catalog.rename(id, "renamed").expect("rename");

    let reopened = LevelCatalog::open(dir.path(), LevelFormat::Authored).expect("reopen");
    let stored = reopened.get(id).expect("present");
    assert_eq!(stored.name(), "renamed");
    assert_eq!(stored.layout(), asymmetric().layout());
}

#[test]
fn rename_replaces_a_hand_named_file() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(
        dir.path().join("warehouse.txt"),
        write_level(&level("Warehouse", &["P$*"], Difficulty::Easy), LevelFormat::Standard),
    )
    .expect("write");
    let mut catalog = LevelCatalog::open(dir.path(), LevelFormat::Standard).expect("open");

    catalog.rename(LevelId::new(0), "Renamed").expect("rename");

    let reopened = LevelCatalog::open(dir.path(), LevelFormat::Standard).expect("reopen");
    let names: Vec<&str> = reopened.levels().iter().map(Level::name).collect();
    assert_eq!(names, vec!["Renamed"]);
    assert!(!dir.path().join("warehouse.txt").exists());
    assert!(dir.path().join(level_file_name(LevelId::new(0))).is_file());
}

#[test]
fn delete_leaves_no_hand_named_file_behind() {
    let dir = TempDir::new().expect("temp dir");
    for (file, name, id) in [("a.txt", "first", 0), ("b.txt", "second", 1), ("c.txt", "third", 2)] {
        let level = level(name, &["P"], Difficulty::Easy).with_id(LevelId::new(id));
        fs::write(dir.path().join(file), write_level(&level, LevelFormat::Standard))
            .expect("write");
    }
    let mut catalog = LevelCatalog::open(dir.path(), LevelFormat::Standard).expect("open");

    let removed = catalog.delete(LevelId::new(0)).expect("delete");

    assert_eq!(removed.name(), "first");
    let reopened = LevelCatalog::open(dir.path(), LevelFormat::Standard).expect("reopen");
    let names: Vec<&str> = reopened.levels().iter().map(Level::name).collect();
    assert_eq!(names, vec!["second", "third"]);
    let ids: Vec<u32> = reopened.levels().iter().map(|level| level.id().get()).collect();
    assert_eq!(ids, vec![0, 1]);
    for file in ["a.txt", "b.txt", "c.txt"] {
        assert!(!dir.path().join(file).exists(), "{file} should be gone");
    }
}

#[test]
fn out_of_range_ids_are_errors() {
    let dir = TempDir::new().expect("temp dir");
    let mut catalog = LevelCatalog::open(dir.path(), LevelFormat::Standard).expect("open");

    assert!(matches!(
        catalog.get(LevelId::new(0)),
        Err(StorageError::OutOfRange { index: 0, len: 0, .. })
    ));
    assert!(matches!(
        catalog.delete(LevelId::new(3)),
        Err(StorageError::OutOfRange { .. })
    ));
    assert!(catalog.rename(LevelId::new(0), "x").is_err());
}

#[test]
fn malformed_files_report_their_path() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("Level_000.txt"), "Id: 0\nName: broken\n").expect("write");

    let error = LevelCatalog::open(dir.path(), LevelFormat::Standard).unwrap_err();

    match error {
        StorageError::Format { path, .. } => assert!(path.ends_with("Level_000.txt")),
        other => panic!("unexpected error: {other:?}"),
    }
}
