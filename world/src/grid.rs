//! Mutable tile storage shared by play sessions and the editor canvas.

use sokoban_core::{CellCoord, GridView, Tile};

/// Row-major tile buffer whose row zero is the bottom row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TileGrid {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Creates a grid with every cell set to `fill`.
    pub(crate) fn filled(columns: u32, rows: u32, fill: Tile) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            tiles: vec![fill; capacity],
        }
    }

    /// Wraps an existing tile buffer; callers guarantee `tiles.len() == columns * rows`.
    pub(crate) fn from_tiles(columns: u32, rows: u32, tiles: Vec<Tile>) -> Self {
        Self {
            columns,
            rows,
            tiles,
        }
    }

    pub(crate) fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    pub(crate) fn set(&mut self, cell: CellCoord, tile: Tile) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.tiles.get_mut(index) {
                *slot = tile;
            }
        }
    }

    pub(crate) fn fill(&mut self, tile: Tile) {
        self.tiles.fill(tile);
    }

    /// First cell, scanning from the bottom row, whose tile satisfies the predicate.
    pub(crate) fn find(&self, predicate: impl Fn(Tile) -> bool) -> Option<CellCoord> {
        let width = usize::try_from(self.columns).ok()?;
        if width == 0 {
            return None;
        }
        let index = self.tiles.iter().position(|tile| predicate(*tile))?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    pub(crate) fn count(&self, predicate: impl Fn(Tile) -> bool) -> u32 {
        self.tiles.iter().filter(|tile| predicate(**tile)).count() as u32
    }

    pub(crate) fn view(&self) -> GridView<'_> {
        GridView::new(&self.tiles, self.columns, self.rows)
    }

    pub(crate) fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
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
