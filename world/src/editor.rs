//! Tile-painting canvas used to author new levels.

use sokoban_core::{CellCoord, Event, Tile};

use crate::grid::TileGrid;

/// Editor canvas that keeps at most one player tile at a time.
#[derive(Clone, Debug)]
pub(crate) struct Canvas {
    grid: TileGrid,
    player: Option<CellCoord>,
}

impl Canvas {
    /// Creates a blank canvas filled with `Tile::None`.
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        Self {
            grid: TileGrid::filled(columns, rows, Tile::None),
            player: None,
        }
    }

    pub(crate) fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub(crate) fn player(&self) -> Option<CellCoord> {
        self.player
    }

    /// Paints one cell. Painting outside the canvas is ignored.
    pub(crate) fn paint(&mut self, cell: CellCoord, tile: Tile, out_events: &mut Vec<Event>) {
        let Some(previous) = self.grid.tile(cell) else {
            return;
        };

        if previous.is_player() && !tile.is_player() {
            self.player = None;
            out_events.push(Event::PlayerRemoved { cell });
        }

        if tile.is_player() {
            if let Some(old) = self.player.filter(|old| *old != cell) {
                if let Some(old_tile) = self.grid.tile(old).filter(|tile| tile.is_player()) {
                    let vacated = old_tile.vacated();
                    self.grid.set(old, vacated);
                    out_events.push(Event::TilePainted {
                        cell: old,
                        tile: vacated,
                    });
                }
            }
            self.player = Some(cell);
            out_events.push(Event::PlayerPlaced { cell });
        }

        self.grid.set(cell, tile);
        out_events.push(Event::TilePainted { cell, tile });
    }

    /// Resets every cell to `Tile::None`.
    pub(crate) fn clear(&mut self, out_events: &mut Vec<Event>) {
        if let Some(cell) = self.player.take() {
            out_events.push(Event::PlayerRemoved { cell });
        }
        self.grid.fill(Tile::None);
    }

    /// Copies the canvas into a `columns` x `rows` buffer, padding with `Tile::None`.
    pub(crate) fn rasterize(&self, columns: u32, rows: u32) -> Vec<Tile> {
        let mut target = TileGrid::filled(columns, rows, Tile::None);
        let (canvas_columns, canvas_rows) = self.grid.dimensions();
        for row in 0..rows.min(canvas_rows) {
            for column in 0..columns.min(canvas_columns) {
                let cell = CellCoord::new(column, row);
                if let Some(tile) = self.grid.tile(cell) {
                    target.set(cell, tile);
                }
            }
        }
        target.tiles().to_vec()
    }
}
