#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Sokoban engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Level descriptions and session snapshots are
//! plain values so that every consumer owns its own copy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod level;

pub use level::{
    count_boxes, Difficulty, GridView, Level, LevelError, LevelHeader, Tile, UnknownTileCode,
};

/// Describes what the world is currently doing with its grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// Grid is driven by move resolution.
    #[default]
    Play,
    /// Grid is painted tile by tile to author a new level.
    Edit,
}

/// Lifecycle of a play session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No level loaded.
    #[default]
    Idle,
    /// Level loaded and accepting input.
    Playing,
    /// Every goal is covered; only loading or restarting leaves this state.
    Finished,
}

/// The single notification selected to accompany an accepted move.
///
/// Variants are ordered by priority so the strongest cue of a move is the maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveCue {
    /// Player stepped without touching a box.
    Step,
    /// A box was pushed onto a non-goal tile.
    BoxMoved,
    /// A box was pushed onto a goal.
    BoxPlaced,
    /// The move completed the level.
    LevelFinished,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a new play session on a copy of the provided level.
    LoadLevel {
        /// Level to copy into the working grid.
        level: Level,
    },
    /// Attempts to move the player one cell in the given direction.
    MovePlayer {
        /// Direction of travel.
        direction: Direction,
    },
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reloads the current level, zeroing all counters and the timer.
    Restart,
    /// Pauses or resumes the session clock without leaving the current state.
    SetTimerRunning {
        /// Whether ticks should advance the clock.
        running: bool,
    },
    /// Replaces the session wholesale with a previously captured snapshot.
    RestoreSession {
        /// Snapshot to rebuild the session from.
        snapshot: SessionSnapshot,
    },
    /// Switches to edit mode on a fresh canvas filled with `Tile::None`.
    BeginEditing {
        /// Canvas width in cells.
        columns: u32,
        /// Canvas height in cells.
        rows: u32,
    },
    /// Switches back to edit mode keeping the canvas that was being painted.
    ResumeEditing,
    /// Paints a single tile on the editor canvas.
    PaintTile {
        /// Cell to paint.
        cell: CellCoord,
        /// Tile to store at the cell.
        tile: Tile,
    },
    /// Resets every canvas cell to `Tile::None`.
    ClearCanvas,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a level was loaded and the grid geometry may have changed.
    LevelLoaded {
        /// Identifier of the loaded level.
        level: LevelId,
        /// Width of the grid in cells.
        columns: u32,
        /// Height of the grid in cells.
        rows: u32,
    },
    /// Announces that a session was rebuilt from a snapshot.
    SessionRestored {
        /// Identifier of the restored level.
        level: LevelId,
        /// Width of the grid in cells.
        columns: u32,
        /// Height of the grid in cells.
        rows: u32,
    },
    /// Reports every counter at once after they changed without a move.
    CountersRefreshed {
        /// Player moves made so far.
        player_moves: u32,
        /// Box pushes made so far.
        box_moves: u32,
        /// Boxes currently resting on goals.
        boxes_on_goal: u32,
        /// Whole seconds elapsed.
        elapsed_seconds: u32,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
        /// Player move counter after the move.
        player_moves: u32,
    },
    /// Confirms that a box was pushed between two cells.
    BoxMoved {
        /// Cell the box occupied before the push.
        from: CellCoord,
        /// Cell the box occupies after the push.
        to: CellCoord,
        /// Box move counter after the push.
        box_moves: u32,
    },
    /// Confirms that a box landed on a goal.
    BoxPlaced {
        /// Goal cell that received the box.
        cell: CellCoord,
        /// Number of boxes on goals after the push.
        boxes_on_goal: u32,
    },
    /// Announces that every goal is covered.
    LevelFinished {
        /// Identifier of the finished level.
        level: LevelId,
        /// Time spent including the partial second in progress.
        elapsed: Duration,
        /// Par time of the finished level in seconds.
        par_time: u32,
    },
    /// Single notification summarising an accepted move.
    MoveCue {
        /// Strongest cue produced by the move.
        cue: MoveCue,
    },
    /// Reports that another whole second elapsed.
    TimePassed {
        /// Whole seconds elapsed after the tick.
        elapsed_seconds: u32,
    },
    /// Announces that the world switched between playing and editing.
    ModeChanged {
        /// Mode that became active.
        mode: SessionMode,
    },
    /// Confirms that an editor cell was painted.
    TilePainted {
        /// Cell that was painted.
        cell: CellCoord,
        /// Tile now stored at the cell.
        tile: Tile,
    },
    /// Announces that the editor canvas gained its player.
    PlayerPlaced {
        /// Cell that holds the player.
        cell: CellCoord,
    },
    /// Announces that the editor canvas lost its player.
    PlayerRemoved {
        /// Cell that held the player.
        cell: CellCoord,
    },
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward increasing row indices (row zero is the bottom row).
    Up,
    /// Movement toward decreasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Parses the single-letter shorthand `U`, `D`, `L` or `R` (case-insensitive).
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'U' => Some(Self::Up),
            'D' => Some(Self::Down),
            'L' => Some(Self::Left),
            'R' => Some(Self::Right),
            _ => None,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell, counted from the bottom.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Neighbouring cell in the given direction, or `None` when it would underflow.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (column, row) = match direction {
            Direction::Up => (Some(self.column), self.row.checked_add(1)),
            Direction::Down => (Some(self.column), self.row.checked_sub(1)),
            Direction::Left => (self.column.checked_sub(1), Some(self.row)),
            Direction::Right => (self.column.checked_add(1), Some(self.row)),
        };
        Some(Self::new(column?, row?))
    }
}

/// Dense identifier of a level; doubles as its catalog index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new level identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Dense identifier of a player profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProfileId(u32);

impl ProfileId {
    /// Creates a new profile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Self-contained copy of a play session that can be persisted and restored.
///
/// The level is embedded by value so the snapshot survives the catalog entry
/// being renamed, renumbered or deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Level the session was started from.
    pub level: Level,
    /// Working grid, row-major with row zero at the bottom.
    pub grid: Vec<Tile>,
    /// Cell occupied by the player.
    pub player: CellCoord,
    /// Boxes resting on goals.
    pub boxes_on_goal: u32,
    /// Player moves made so far.
    pub player_moves: u32,
    /// Box pushes made so far.
    pub box_moves: u32,
    /// Whole seconds elapsed.
    pub elapsed_seconds: u32,
    /// Time accumulated toward the next whole second.
    pub sub_second: Duration,
}

impl SessionSnapshot {
    /// Read-only view over the snapshot grid.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.grid, self.level.columns(), self.level.rows())
    }
}

/// Outcome of scoring a finished level against a player's previous best.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreReport {
    /// Level that was finished.
    pub level: LevelId,
    /// Truncated score in `0..=100`.
    pub score: u32,
    /// Best score recorded for the level before this run.
    pub previous_best: u32,
    /// Whether `score` strictly beats `previous_best`.
    pub is_high_score: bool,
}
