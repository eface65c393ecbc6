#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative puzzle state for the Sokoban engine.
//!
//! The world owns one play session and one editor canvas. Every mutation goes
//! through [`apply`], which reports what happened as [`Event`] values; read
//! access goes through the [`query`] module.

mod editor;
mod grid;

use std::time::Duration;

use sokoban_core::{
    CellCoord, Command, Direction, Event, Level, LevelError, LevelId, MoveCue, SessionMode,
    SessionSnapshot, SessionState, Tile,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{editor::Canvas, grid::TileGrid};

const SECOND: Duration = Duration::from_secs(1);

/// Contract violations reported by [`apply`] and the export query.
///
/// Ordinary gameplay input never produces an error; blocked moves and ticks
/// outside a running session are silently ignored.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The level or snapshot grid holds no player tile.
    #[error("level {level:?} has no player tile")]
    MissingPlayer {
        /// Level that was rejected.
        level: LevelId,
    },
    /// A snapshot grid does not match the dimensions of its embedded level.
    #[error("snapshot grid holds {actual} tiles but its level needs {expected}")]
    SnapshotMismatch {
        /// Tile count implied by the embedded level.
        expected: usize,
        /// Tile count stored in the snapshot.
        actual: usize,
    },
    /// An editor operation was requested before any canvas existed.
    #[error("no editor canvas is open")]
    NoCanvas,
    /// The exported level could not be constructed.
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Counter values of the live session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionCounters {
    /// Player moves made so far.
    pub player_moves: u32,
    /// Box pushes made so far.
    pub box_moves: u32,
    /// Boxes currently resting on goals.
    pub boxes_on_goal: u32,
    /// Whole seconds elapsed.
    pub elapsed_seconds: u32,
}

#[derive(Clone, Debug)]
struct Session {
    level: Level,
    grid: TileGrid,
    player: CellCoord,
    counters: SessionCounters,
    accumulator: Duration,
    running: bool,
}

impl Session {
    fn start(level: Level) -> Result<Self, EngineError> {
        let grid = TileGrid::from_tiles(level.columns(), level.rows(), level.layout().to_vec());
        let player = grid
            .find(Tile::is_player)
            .ok_or(EngineError::MissingPlayer { level: level.id() })?;

        let counted = grid.count(Tile::is_box);
        if counted != level.box_count() {
            warn!(
                level = level.id().get(),
                declared = level.box_count(),
                counted,
                "box_count_mismatch"
            );
        }

        let counters = SessionCounters {
            boxes_on_goal: grid.count(|tile| tile == Tile::BoxOnGoal),
            ..SessionCounters::default()
        };

        Ok(Self {
            level,
            grid,
            player,
            counters,
            accumulator: Duration::ZERO,
            running: true,
        })
    }

    fn restore(snapshot: SessionSnapshot) -> Result<Self, EngineError> {
        let SessionSnapshot {
            level,
            grid,
            player,
            boxes_on_goal: stored_on_goal,
            player_moves,
            box_moves,
            elapsed_seconds,
            sub_second,
        } = snapshot;

        let expected = level.layout().len();
        if grid.len() != expected {
            return Err(EngineError::SnapshotMismatch {
                expected,
                actual: grid.len(),
            });
        }

        let grid = TileGrid::from_tiles(level.columns(), level.rows(), grid);
        let player = Some(player)
            .filter(|cell| grid.tile(*cell).is_some_and(Tile::is_player))
            .or_else(|| grid.find(Tile::is_player))
            .ok_or(EngineError::MissingPlayer { level: level.id() })?;

        let boxes_on_goal = grid.count(|tile| tile == Tile::BoxOnGoal);
        if boxes_on_goal != stored_on_goal {
            warn!(
                level = level.id().get(),
                stored = stored_on_goal,
                counted = boxes_on_goal,
                "snapshot_goal_count_mismatch"
            );
        }

        Ok(Self {
            level,
            grid,
            player,
            counters: SessionCounters {
                player_moves,
                box_moves,
                boxes_on_goal,
                elapsed_seconds,
            },
            accumulator: sub_second.min(SECOND),
            running: true,
        })
    }

    fn elapsed(&self) -> Duration {
        Duration::from_secs(u64::from(self.counters.elapsed_seconds)) + self.accumulator
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            level: self.level.clone(),
            grid: self.grid.tiles().to_vec(),
            player: self.player,
            boxes_on_goal: self.counters.boxes_on_goal,
            player_moves: self.counters.player_moves,
            box_moves: self.counters.box_moves,
            elapsed_seconds: self.counters.elapsed_seconds,
            sub_second: self.accumulator,
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if !self.running {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        while self.accumulator >= SECOND {
            self.accumulator -= SECOND;
            self.counters.elapsed_seconds = self.counters.elapsed_seconds.saturating_add(1);
            out_events.push(Event::TimePassed {
                elapsed_seconds: self.counters.elapsed_seconds,
            });
        }
    }

    /// Resolves one move. Returns `true` when the move finished the level.
    ///
    /// Every check happens before the first write so a rejected move leaves
    /// the session untouched.
    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) -> bool {
        let from = self.player;
        let Some(target) = from.step(direction) else {
            return false;
        };
        let Some(target_tile) = self.grid.tile(target) else {
            return false;
        };

        let push = if target_tile.is_box() {
            let Some(push_cell) = target.step(direction) else {
                return false;
            };
            match self.grid.tile(push_cell) {
                Some(push_tile) if push_tile.is_open() => Some((push_cell, push_tile)),
                _ => return false,
            }
        } else if target_tile.is_open() {
            None
        } else {
            return false;
        };

        let mut cue = MoveCue::Step;
        let mut finished = false;

        if let Some((push_cell, push_tile)) = push {
            let landed = if push_tile == Tile::Goal {
                Tile::BoxOnGoal
            } else {
                Tile::Box
            };
            self.grid.set(push_cell, landed);
            self.grid.set(target, target_tile.vacated());
            if target_tile == Tile::BoxOnGoal {
                self.counters.boxes_on_goal = self.counters.boxes_on_goal.saturating_sub(1);
            }
            self.counters.box_moves += 1;
            out_events.push(Event::BoxMoved {
                from: target,
                to: push_cell,
                box_moves: self.counters.box_moves,
            });
            cue = MoveCue::BoxMoved;

            if landed == Tile::BoxOnGoal {
                self.counters.boxes_on_goal += 1;
                out_events.push(Event::BoxPlaced {
                    cell: push_cell,
                    boxes_on_goal: self.counters.boxes_on_goal,
                });
                cue = MoveCue::BoxPlaced;
            }
        }

        let from_tile = self.grid.tile(from).unwrap_or(Tile::Player);
        let entered = if target_tile.is_goal() {
            Tile::PlayerOnGoal
        } else {
            Tile::Player
        };
        self.grid.set(from, from_tile.vacated());
        self.grid.set(target, entered);
        self.player = target;
        self.counters.player_moves += 1;
        out_events.push(Event::PlayerMoved {
            from,
            to: target,
            player_moves: self.counters.player_moves,
        });

        if push.is_some() && self.counters.boxes_on_goal == self.level.box_count() {
            finished = true;
            out_events.push(Event::LevelFinished {
                level: self.level.id(),
                elapsed: self.elapsed(),
                par_time: self.level.par_time(),
            });
            cue = MoveCue::LevelFinished;
        }

        out_events.push(Event::MoveCue { cue });
        finished
    }
}

/// Represents the authoritative Sokoban world state.
#[derive(Debug, Default)]
pub struct World {
    mode: SessionMode,
    state: SessionState,
    session: Option<Session>,
    canvas: Option<Canvas>,
}

impl World {
    /// Creates an idle world with no level loaded and no canvas open.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn switch_mode(&mut self, mode: SessionMode, out_events: &mut Vec<Event>) {
        if self.mode != mode {
            self.mode = mode;
            out_events.push(Event::ModeChanged { mode });
        }
    }

    fn start_session(
        &mut self,
        level: Level,
        out_events: &mut Vec<Event>,
    ) -> Result<(), EngineError> {
        let session = Session::start(level)?;
        let (columns, rows) = session.grid.dimensions();
        let level = session.level.id();
        info!(level = level.get(), columns, rows, "level_loaded");

        self.switch_mode(SessionMode::Play, out_events);
        self.session = Some(session);
        self.state = SessionState::Playing;
        out_events.push(Event::LevelLoaded {
            level,
            columns,
            rows,
        });
        Ok(())
    }

    fn playing_session(&mut self) -> Option<&mut Session> {
        if self.mode == SessionMode::Play && self.state == SessionState::Playing {
            self.session.as_mut()
        } else {
            None
        }
    }

    fn editing_canvas(&mut self) -> Option<&mut Canvas> {
        if self.mode == SessionMode::Edit {
            self.canvas.as_mut()
        } else {
            None
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Errors are only returned for contract violations. A failed command leaves
/// the world exactly as it was and emits no events.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), EngineError> {
    match command {
        Command::LoadLevel { level } => world.start_session(level, out_events)?,
        Command::Restart => {
            if world.mode == SessionMode::Play {
                if let Some(level) = world.session.as_ref().map(|session| session.level.clone()) {
                    world.start_session(level, out_events)?;
                }
            }
        }
        Command::MovePlayer { direction } => {
            if let Some(session) = world.playing_session() {
                if session.move_player(direction, out_events) {
                    info!(
                        level = session.level.id().get(),
                        player_moves = session.counters.player_moves,
                        elapsed_seconds = session.counters.elapsed_seconds,
                        "level_finished"
                    );
                    world.state = SessionState::Finished;
                }
            }
        }
        Command::Tick { dt } => {
            if let Some(session) = world.playing_session() {
                session.tick(dt, out_events);
            }
        }
        Command::SetTimerRunning { running } => {
            if let Some(session) = world.session.as_mut() {
                session.running = running;
            }
        }
        Command::RestoreSession { snapshot } => {
            let session = Session::restore(snapshot)?;
            let (columns, rows) = session.grid.dimensions();
            let level = session.level.id();
            let counters = session.counters;
            debug!(level = level.get(), "session_restored");

            world.switch_mode(SessionMode::Play, out_events);
            world.session = Some(session);
            world.state = SessionState::Playing;
            out_events.push(Event::SessionRestored {
                level,
                columns,
                rows,
            });
            out_events.push(Event::CountersRefreshed {
                player_moves: counters.player_moves,
                box_moves: counters.box_moves,
                boxes_on_goal: counters.boxes_on_goal,
                elapsed_seconds: counters.elapsed_seconds,
            });
        }
        Command::BeginEditing { columns, rows } => {
            debug!(columns, rows, "canvas_created");
            world.canvas = Some(Canvas::new(columns, rows));
            world.session = None;
            world.state = SessionState::Idle;
            world.switch_mode(SessionMode::Edit, out_events);
        }
        Command::ResumeEditing => {
            if world.canvas.is_none() {
                return Err(EngineError::NoCanvas);
            }
            world.session = None;
            world.state = SessionState::Idle;
            world.switch_mode(SessionMode::Edit, out_events);
        }
        Command::PaintTile { cell, tile } => {
            if let Some(canvas) = world.editing_canvas() {
                canvas.paint(cell, tile, out_events);
            }
        }
        Command::ClearCanvas => {
            if let Some(canvas) = world.editing_canvas() {
                canvas.clear(out_events);
            }
        }
    }

    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use sokoban_core::{
        CellCoord, Difficulty, GridView, Level, LevelHeader, LevelId, SessionMode,
        SessionSnapshot, SessionState, Tile,
    };

    use super::{EngineError, SessionCounters, World};

    /// Reports whether the world is playing or editing.
    #[must_use]
    pub fn mode(world: &World) -> SessionMode {
        world.mode
    }

    /// Reports the lifecycle state of the play session.
    #[must_use]
    pub fn state(world: &World) -> SessionState {
        world.state
    }

    /// Level the current session was started from.
    #[must_use]
    pub fn level(world: &World) -> Option<&Level> {
        world.session.as_ref().map(|session| &session.level)
    }

    /// Working grid of the current session.
    #[must_use]
    pub fn grid(world: &World) -> Option<GridView<'_>> {
        world.session.as_ref().map(|session| session.grid.view())
    }

    /// Cell occupied by the player in the current session.
    #[must_use]
    pub fn player(world: &World) -> Option<CellCoord> {
        world.session.as_ref().map(|session| session.player)
    }

    /// Counter values of the current session.
    #[must_use]
    pub fn counters(world: &World) -> Option<SessionCounters> {
        world.session.as_ref().map(|session| session.counters)
    }

    /// Time spent in the current session including the partial second.
    #[must_use]
    pub fn elapsed(world: &World) -> Option<Duration> {
        world.session.as_ref().map(super::Session::elapsed)
    }

    /// Whether ticks currently advance the session clock.
    #[must_use]
    pub fn timer_running(world: &World) -> bool {
        world.session.as_ref().is_some_and(|session| session.running)
    }

    /// Captures a restorable copy of the current session.
    #[must_use]
    pub fn snapshot(world: &World) -> Option<SessionSnapshot> {
        world.session.as_ref().map(super::Session::snapshot)
    }

    /// Editor canvas, available once editing has begun.
    #[must_use]
    pub fn canvas(world: &World) -> Option<GridView<'_>> {
        world.canvas.as_ref().map(|canvas| canvas.grid().view())
    }

    /// Cell holding the editor canvas player, if one was painted.
    #[must_use]
    pub fn editor_player(world: &World) -> Option<CellCoord> {
        world.canvas.as_ref().and_then(|canvas| canvas.player())
    }

    /// Rasterizes the editor canvas into a new untimed, unranked level.
    ///
    /// Cells beyond the canvas become `Tile::None`. The returned level carries
    /// id zero; catalogs assign the real id when the level is added.
    pub fn export_level(
        world: &World,
        name: &str,
        rows: u32,
        columns: u32,
    ) -> Result<Level, EngineError> {
        let canvas = world.canvas.as_ref().ok_or(EngineError::NoCanvas)?;
        let layout = canvas.rasterize(columns, rows);
        let level = Level::new(
            LevelHeader {
                id: LevelId::new(0),
                name: name.to_owned(),
                par_time: 0,
                difficulty: Difficulty::None,
                box_count: sokoban_core::count_boxes(&layout),
            },
            columns,
            rows,
            layout,
        )?;

        if !level.layout().iter().copied().any(Tile::is_player) {
            return Err(EngineError::MissingPlayer { level: level.id() });
        }
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sokoban_core::{Difficulty, LevelHeader};

    fn corridor() -> Level {
        // P $ * laid out on a single row.
        Level::new(
            LevelHeader {
                id: LevelId::new(3),
                name: "corridor".to_owned(),
                par_time: 10,
                difficulty: Difficulty::Easy,
                box_count: 1,
            },
            3,
            1,
            vec![Tile::Player, Tile::Box, Tile::Goal],
        )
        .expect("valid level")
    }

    #[test]
    fn load_rejects_levels_without_player() {
        let level = Level::new(
            LevelHeader {
                id: LevelId::new(1),
                name: "empty".to_owned(),
                par_time: 0,
                difficulty: Difficulty::None,
                box_count: 0,
            },
            1,
            1,
            vec![Tile::Floor],
        )
        .expect("valid level");
        let mut world = World::new();
        let mut events = Vec::new();

        let error = apply(&mut world, Command::LoadLevel { level }, &mut events).unwrap_err();

        assert_eq!(
            error,
            EngineError::MissingPlayer {
                level: LevelId::new(1)
            }
        );
        assert!(events.is_empty());
        assert_eq!(query::state(&world), SessionState::Idle);
    }

    #[test]
    fn tick_counts_whole_seconds_and_keeps_remainder() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::LoadLevel { level: corridor() }, &mut events)
            .expect("load");
        events.clear();

        for _ in 0..5 {
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(300),
                },
                &mut events,
            )
            .expect("tick");
        }

        assert_eq!(events, vec![Event::TimePassed { elapsed_seconds: 1 }]);
        assert_eq!(query::elapsed(&world), Some(Duration::from_millis(1_500)));
    }

    #[test]
    fn paused_timer_ignores_ticks() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::LoadLevel { level: corridor() }, &mut events)
            .expect("load");
        apply(
            &mut world,
            Command::SetTimerRunning { running: false },
            &mut events,
        )
        .expect("pause");
        events.clear();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(3),
            },
            &mut events,
        )
        .expect("tick");

        assert!(events.is_empty());
        assert!(!query::timer_running(&world));
        assert_eq!(query::elapsed(&world), Some(Duration::ZERO));
    }

    #[test]
    fn finishing_move_reports_partial_seconds() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::LoadLevel { level: corridor() }, &mut events)
            .expect("load");
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(2_250),
            },
            &mut events,
        )
        .expect("tick");
        events.clear();

        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::Right,
            },
            &mut events,
        )
        .expect("move");

        assert!(events.contains(&Event::LevelFinished {
            level: LevelId::new(3),
            elapsed: Duration::from_millis(2_250),
            par_time: 10,
        }));
        assert_eq!(
            events.last(),
            Some(&Event::MoveCue {
                cue: MoveCue::LevelFinished
            })
        );
    }
}
