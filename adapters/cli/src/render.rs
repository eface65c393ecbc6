//! Plain-text rendering of grids, levels and session counters.

use std::fmt::Write as _;

use sokoban_core::{GridView, Level, SessionState, Tile};
use sokoban_world::SessionCounters;

/// Character shown for unpainted cells so they stay visible in a terminal.
const UNPAINTED: char = '~';

/// Renders a grid top row first, one text line per row.
pub(crate) fn grid(view: GridView<'_>) -> String {
    let mut text = String::new();
    for row in view.rows_top_down() {
        text.extend(row.iter().map(|tile| display_char(*tile)));
        text.push('\n');
    }
    text
}

/// One-line summary used by level listings.
pub(crate) fn level_summary(level: &Level) -> String {
    format!(
        "{:>3}  {:<24} {:>3}x{:<3} boxes {:>2}  par {:>4}s  {}",
        level.id().get(),
        level.name(),
        level.columns(),
        level.rows(),
        level.box_count(),
        level.par_time(),
        level.difficulty().label()
    )
}

/// Counter line printed after a scripted run.
pub(crate) fn counters(state: SessionState, counters: SessionCounters) -> String {
    let mut text = String::new();
    let _ = write!(
        text,
        "state {state:?}  moves {}  pushes {}  boxes on goal {}  time {}s",
        counters.player_moves,
        counters.box_moves,
        counters.boxes_on_goal,
        counters.elapsed_seconds
    );
    text
}

fn display_char(tile: Tile) -> char {
    match tile {
        Tile::None => UNPAINTED,
        other => other.code(),
    }
}
