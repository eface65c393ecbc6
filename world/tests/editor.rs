use sokoban_core::{
    CellCoord, Command, Difficulty, Direction, Event, SessionMode, SessionState, Tile,
};
use sokoban_world::{apply, query, EngineError, World};

fn editing(columns: u32, rows: u32) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    apply(&mut world, Command::BeginEditing { columns, rows }, &mut events)
        .expect("editing begins");
    assert_eq!(events, vec![Event::ModeChanged {
        mode: SessionMode::Edit
    }]);
    world
}

fn paint(world: &mut World, column: u32, row: u32, tile: Tile) -> Vec<Event> {
    let mut events = Vec::new();
    apply(
        world,
        Command::PaintTile {
            cell: CellCoord::new(column, row),
            tile,
        },
        &mut events,
    )
    .expect("painting never fails");
    events
}

#[test]
fn painting_a_second_player_moves_the_player() {
    let mut world = editing(3, 1);
    let first = paint(&mut world, 0, 0, Tile::Player);
    assert!(first.contains(&Event::PlayerPlaced {
        cell: CellCoord::new(0, 0)
    }));

    let second = paint(&mut world, 2, 0, Tile::Player);

    assert_eq!(
        second,
        vec![
            Event::TilePainted {
                cell: CellCoord::new(0, 0),
                tile: Tile::Floor,
            },
            Event::PlayerPlaced {
                cell: CellCoord::new(2, 0)
            },
            Event::TilePainted {
                cell: CellCoord::new(2, 0),
                tile: Tile::Player,
            },
        ]
    );
    assert_eq!(query::editor_player(&world), Some(CellCoord::new(2, 0)));
    let canvas = query::canvas(&world).expect("canvas open");
    assert_eq!(canvas.tiles(), &[Tile::Floor, Tile::None, Tile::Player]);
}

#[test]
fn painting_over_the_player_removes_it() {
    let mut world = editing(2, 2);
    let _ = paint(&mut world, 1, 1, Tile::PlayerOnGoal);

    let events = paint(&mut world, 1, 1, Tile::Wall);

    assert_eq!(events[0], Event::PlayerRemoved {
        cell: CellCoord::new(1, 1)
    });
    assert_eq!(query::editor_player(&world), None);
    let error = query::export_level(&world, "no player", 2, 2).unwrap_err();
    assert!(matches!(error, EngineError::MissingPlayer { .. }));
}

#[test]
fn paints_outside_the_canvas_are_ignored() {
    let mut world = editing(2, 2);
    assert!(paint(&mut world, 2, 0, Tile::Wall).is_empty());
    assert!(paint(&mut world, 0, 5, Tile::Player).is_empty());
    assert_eq!(query::editor_player(&world), None);
}

#[test]
fn export_counts_boxes_and_produces_untimed_level() {
    let mut world = editing(4, 2);
    let _ = paint(&mut world, 0, 0, Tile::Player);
    let _ = paint(&mut world, 1, 0, Tile::Box);
    let _ = paint(&mut world, 2, 0, Tile::Goal);
    let _ = paint(&mut world, 3, 1, Tile::BoxOnGoal);

    let level = query::export_level(&world, "authored", 2, 4).expect("exportable");

    assert_eq!(level.name(), "authored");
    assert_eq!(level.box_count(), 2);
    assert_eq!(level.par_time(), 0);
    assert_eq!(level.difficulty(), Difficulty::None);
    assert_eq!((level.columns(), level.rows()), (4, 2));
    assert_eq!(level.layout()[7], Tile::BoxOnGoal);
}

#[test]
fn export_crops_to_requested_size() {
    let mut world = editing(4, 4);
    let _ = paint(&mut world, 0, 0, Tile::Player);
    let _ = paint(&mut world, 3, 3, Tile::Box);

    let level = query::export_level(&world, "cropped", 2, 2).expect("exportable");

    assert_eq!(level.layout().len(), 4);
    assert_eq!(level.box_count(), 0);
}

#[test]
fn clearing_the_canvas_removes_the_player() {
    let mut world = editing(2, 1);
    let _ = paint(&mut world, 1, 0, Tile::Player);
    let mut events = Vec::new();

    apply(&mut world, Command::ClearCanvas, &mut events).expect("clear");

    assert_eq!(events, vec![Event::PlayerRemoved {
        cell: CellCoord::new(1, 0)
    }]);
    let canvas = query::canvas(&world).expect("canvas open");
    assert!(canvas.tiles().iter().all(|tile| *tile == Tile::None));
}

#[test]
fn playtest_keeps_the_canvas_for_resumed_editing() {
    let mut world = editing(3, 1);
    let _ = paint(&mut world, 0, 0, Tile::Player);
    let _ = paint(&mut world, 1, 0, Tile::Box);
    let _ = paint(&mut world, 2, 0, Tile::Goal);
    let level = query::export_level(&world, "playtest", 1, 3).expect("exportable");
    let mut events = Vec::new();

    apply(&mut world, Command::LoadLevel { level }, &mut events).expect("playtest loads");
    assert_eq!(query::mode(&world), SessionMode::Play);
    apply(
        &mut world,
        Command::MovePlayer {
            direction: Direction::Right,
        },
        &mut events,
    )
    .expect("move");
    assert_eq!(query::state(&world), SessionState::Finished);

    events.clear();
    apply(&mut world, Command::ResumeEditing, &mut events).expect("resume");

    assert_eq!(events, vec![Event::ModeChanged {
        mode: SessionMode::Edit
    }]);
    assert_eq!(query::state(&world), SessionState::Idle);
    assert_eq!(query::editor_player(&world), Some(CellCoord::new(0, 0)));
    let canvas = query::canvas(&world).expect("canvas kept");
    assert_eq!(canvas.tiles(), &[Tile::Player, Tile::Box, Tile::Goal]);
}

#[test]
fn resuming_without_a_canvas_is_an_error() {
    let mut world = World::new();
    let mut events = Vec::new();

    let error = apply(&mut world, Command::ResumeEditing, &mut events).unwrap_err();

    assert_eq!(error, EngineError::NoCanvas);
    assert!(events.is_empty());
}

#[test]
fn paints_are_ignored_while_playing() {
    let mut world = editing(3, 1);
    let _ = paint(&mut world, 0, 0, Tile::Player);
    let _ = paint(&mut world, 1, 0, Tile::Box);
    let _ = paint(&mut world, 2, 0, Tile::Goal);
    let level = query::export_level(&world, "playtest", 1, 3).expect("exportable");
    let mut events = Vec::new();
    apply(&mut world, Command::LoadLevel { level }, &mut events).expect("playtest loads");

    assert!(paint(&mut world, 1, 0, Tile::Wall).is_empty());
    let canvas = query::canvas(&world).expect("canvas kept");
    assert_eq!(canvas.tiles()[1], Tile::Box);
}
