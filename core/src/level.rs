//! Level model: the immutable description of a single puzzle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, LevelId};

/// Every kind of tile a puzzle grid can hold.
///
/// Each tile has a fixed one-character code that is used by the level text
/// format and by every persisted grid. The codes must never change because
/// they appear verbatim in save files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub enum Tile {
    /// Unpainted cell; behaves like a hole in the grid.
    None,
    /// Impassable wall.
    Wall,
    /// Walkable floor.
    Floor,
    /// Player standing on floor.
    Player,
    /// Player standing on a goal.
    PlayerOnGoal,
    /// Box resting on floor.
    Box,
    /// Goal a box must be pushed onto.
    Goal,
    /// Void outside the playable area.
    Empty,
    /// Box resting on a goal.
    BoxOnGoal,
}

impl Tile {
    /// Character code used when the tile is persisted.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::None => '\0',
            Self::Wall => '#',
            Self::Floor => ' ',
            Self::Player => 'P',
            Self::PlayerOnGoal => 'B',
            Self::Box => '$',
            Self::Goal => '*',
            Self::Empty => '.',
            Self::BoxOnGoal => '&',
        }
    }

    /// Resolves a persisted character code back into a tile.
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            '\0' => Some(Self::None),
            '#' => Some(Self::Wall),
            ' ' => Some(Self::Floor),
            'P' => Some(Self::Player),
            'B' => Some(Self::PlayerOnGoal),
            '$' => Some(Self::Box),
            '*' => Some(Self::Goal),
            '.' => Some(Self::Empty),
            '&' => Some(Self::BoxOnGoal),
            _ => None,
        }
    }

    /// Reports whether the tile holds the player.
    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(self, Self::Player | Self::PlayerOnGoal)
    }

    /// Reports whether the tile holds a box.
    #[must_use]
    pub const fn is_box(self) -> bool {
        matches!(self, Self::Box | Self::BoxOnGoal)
    }

    /// Reports whether the tile has a goal underneath whatever occupies it.
    #[must_use]
    pub const fn is_goal(self) -> bool {
        matches!(self, Self::Goal | Self::PlayerOnGoal | Self::BoxOnGoal)
    }

    /// Reports whether a box may be pushed onto the tile or the player may step onto it.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Floor | Self::Goal)
    }

    /// Tile left behind once the occupant (player or box) leaves.
    #[must_use]
    pub const fn vacated(self) -> Self {
        if self.is_goal() {
            Self::Goal
        } else {
            Self::Floor
        }
    }
}

impl From<Tile> for char {
    fn from(tile: Tile) -> Self {
        tile.code()
    }
}

impl TryFrom<char> for Tile {
    type Error = UnknownTileCode;

    fn try_from(code: char) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(UnknownTileCode(code))
    }
}

/// Raised when a persisted grid contains a character outside the tile vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unknown tile code {0:?}")]
pub struct UnknownTileCode(pub char);

/// Difficulty rating attached to a level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Unranked; used by player-authored levels.
    #[default]
    None,
    /// Easy level.
    Easy,
    /// Medium level.
    Medium,
    /// Hard level.
    Hard,
}

impl Difficulty {
    /// Parses the case-insensitive labels `easy`, `medium` and `hard`.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    /// Lowercase label written into level files.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

/// Reasons a level description may be structurally invalid.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// A level must have at least one row and one column.
    #[error("level dimensions {columns}x{rows} are empty")]
    EmptyGrid {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
    },
    /// The layout does not contain `columns * rows` tiles.
    #[error("level layout holds {actual} tiles but {expected} were declared")]
    LayoutSizeMismatch {
        /// Tile count implied by the dimensions.
        expected: usize,
        /// Tile count actually provided.
        actual: usize,
    },
}

/// Descriptive fields of a level that do not depend on its grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelHeader {
    /// Catalog index of the level.
    pub id: LevelId,
    /// Display name.
    pub name: String,
    /// Reference completion time in seconds, used only for scoring.
    pub par_time: u32,
    /// Difficulty rating.
    pub difficulty: Difficulty,
    /// Number of goals that must be covered to win.
    pub box_count: u32,
}

/// Immutable description of a puzzle.
///
/// The layout is stored row-major with row zero at the bottom of the level,
/// so `CellCoord::new(column, row)` addresses `layout[row * columns + column]`.
/// Only the id and the name can change, and both produce a new value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLevel")]
pub struct Level {
    id: LevelId,
    name: String,
    par_time: u32,
    difficulty: Difficulty,
    box_count: u32,
    columns: u32,
    rows: u32,
    layout: Vec<Tile>,
}

impl Level {
    /// Creates a level after checking that the layout matches its dimensions.
    pub fn new(
        header: LevelHeader,
        columns: u32,
        rows: u32,
        layout: Vec<Tile>,
    ) -> Result<Self, LevelError> {
        if columns == 0 || rows == 0 {
            return Err(LevelError::EmptyGrid { columns, rows });
        }

        let expected = columns as usize * rows as usize;
        if layout.len() != expected {
            return Err(LevelError::LayoutSizeMismatch {
                expected,
                actual: layout.len(),
            });
        }

        Ok(Self {
            id: header.id,
            name: header.name,
            par_time: header.par_time,
            difficulty: header.difficulty,
            box_count: header.box_count,
            columns,
            rows,
            layout,
        })
    }

    /// Catalog index of the level.
    #[must_use]
    pub const fn id(&self) -> LevelId {
        self.id
    }

    /// Display name of the level.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Par time in seconds.
    #[must_use]
    pub const fn par_time(&self) -> u32 {
        self.par_time
    }

    /// Difficulty rating.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Number of goals that must hold a box for the level to be won.
    #[must_use]
    pub const fn box_count(&self) -> u32 {
        self.box_count
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Row-major tiles, bottom row first.
    #[must_use]
    pub fn layout(&self) -> &[Tile] {
        &self.layout
    }

    /// Read-only grid view over the layout.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.layout, self.columns, self.rows)
    }

    /// Returns a copy of the level carrying a new id.
    #[must_use]
    pub fn with_id(mut self, id: LevelId) -> Self {
        self.id = id;
        self
    }

    /// Returns a copy of the level carrying a new name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of `Box` and `BoxOnGoal` tiles in the layout.
    #[must_use]
    pub fn counted_boxes(&self) -> u32 {
        count_boxes(&self.layout)
    }
}

#[derive(Deserialize)]
struct RawLevel {
    id: LevelId,
    name: String,
    par_time: u32,
    difficulty: Difficulty,
    box_count: u32,
    columns: u32,
    rows: u32,
    layout: Vec<Tile>,
}

impl TryFrom<RawLevel> for Level {
    type Error = LevelError;

    fn try_from(raw: RawLevel) -> Result<Self, Self::Error> {
        Self::new(
            LevelHeader {
                id: raw.id,
                name: raw.name,
                par_time: raw.par_time,
                difficulty: raw.difficulty,
                box_count: raw.box_count,
            },
            raw.columns,
            raw.rows,
            raw.layout,
        )
    }
}

/// Counts the tiles that hold a box.
#[must_use]
pub fn count_boxes(tiles: &[Tile]) -> u32 {
    tiles.iter().filter(|tile| tile.is_box()).count() as u32
}

/// Read-only view over a row-major tile grid whose row zero is the bottom row.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    tiles: &'a [Tile],
    columns: u32,
    rows: u32,
}

impl<'a> GridView<'a> {
    /// Captures a view backed by the provided tiles.
    #[must_use]
    pub const fn new(tiles: &'a [Tile], columns: u32, rows: u32) -> Self {
        Self {
            tiles,
            columns,
            rows,
        }
    }

    /// Tile stored at the provided cell, or `None` when the cell lies outside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Underlying row-major tiles.
    #[must_use]
    pub fn tiles(&self) -> &'a [Tile] {
        self.tiles
    }

    /// Iterates rows from the top of the level down, matching the text layout.
    pub fn rows_top_down(&self) -> impl Iterator<Item = &'a [Tile]> + 'a {
        let width = self.columns as usize;
        let tiles = self.tiles;
        (0..self.rows as usize)
            .rev()
            .filter_map(move |row| tiles.get(row * width..(row + 1) * width))
    }

    /// Counts the tiles that hold a box.
    #[must_use]
    pub fn box_count(&self) -> u32 {
        count_boxes(self.tiles)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
