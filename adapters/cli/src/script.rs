//! Scripted input: move strings, paint specifications and the headless run loop.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use sokoban_core::{CellCoord, Command, Direction, Event, LevelId, ScoreReport, Tile};
use sokoban_system_scoring::Scoring;
use sokoban_world::{apply, World};
use tracing::debug;

/// Parses a move script such as `RRUL`; whitespace is ignored.
pub(crate) fn parse_moves(script: &str) -> Result<Vec<Direction>> {
    script
        .chars()
        .filter(|letter| !letter.is_whitespace())
        .map(|letter| {
            Direction::from_letter(letter)
                .with_context(|| format!("unknown move `{letter}`; use U, D, L or R"))
        })
        .collect()
}

/// Parses `column,row,TILE;...` where `TILE` is a tile code or a tile name.
pub(crate) fn parse_paint(spec: &str) -> Result<Vec<(CellCoord, Tile)>> {
    spec.split(';')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ',');
            let (Some(column), Some(row), Some(tile)) = (parts.next(), parts.next(), parts.next())
            else {
                bail!("paint entry `{entry}` must look like column,row,tile");
            };
            let column = column
                .trim()
                .parse()
                .with_context(|| format!("bad column in paint entry `{entry}`"))?;
            let row = row
                .trim()
                .parse()
                .with_context(|| format!("bad row in paint entry `{entry}`"))?;
            Ok((CellCoord::new(column, row), parse_tile(tile)?))
        })
        .collect()
}

fn parse_tile(text: &str) -> Result<Tile> {
    let mut chars = text.chars();
    if let (Some(code), None) = (chars.next(), chars.next()) {
        if let Some(tile) = Tile::from_code(code) {
            return Ok(tile);
        }
    }

    let tile = match text.trim().to_ascii_lowercase().as_str() {
        "none" => Tile::None,
        "wall" => Tile::Wall,
        "floor" => Tile::Floor,
        "player" => Tile::Player,
        "player_on_goal" => Tile::PlayerOnGoal,
        "box" => Tile::Box,
        "goal" => Tile::Goal,
        "empty" => Tile::Empty,
        "box_on_goal" => Tile::BoxOnGoal,
        other => bail!("unknown tile `{other}`"),
    };
    Ok(tile)
}

/// Drives the world headlessly, feeding finished levels into the scoring system.
#[derive(Debug)]
pub(crate) struct Runner {
    world: World,
    scoring: Scoring,
    frame: Duration,
}

impl Runner {
    /// Creates a runner whose clock advances `seconds_per_move` before each move.
    pub(crate) fn new(seconds_per_move: f64) -> Self {
        Self {
            world: World::new(),
            scoring: Scoring::new(),
            frame: Duration::try_from_secs_f64(seconds_per_move).unwrap_or(Duration::ZERO),
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Applies one command and returns the events it produced.
    pub(crate) fn apply(&mut self, command: Command) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        apply(&mut self.world, command, &mut events)?;
        for event in &events {
            debug!(?event, "world_event");
        }
        Ok(events)
    }

    /// Plays a move script and returns the score reports of any finished level.
    pub(crate) fn play<F>(
        &mut self,
        moves: &[Direction],
        mut previous_best: F,
    ) -> Result<Vec<ScoreReport>>
    where
        F: FnMut(LevelId) -> u32,
    {
        let mut reports = Vec::new();
        for direction in moves {
            let mut events = self.apply(Command::Tick { dt: self.frame })?;
            events.extend(self.apply(Command::MovePlayer {
                direction: *direction,
            })?);
            self.scoring.handle(&events, &mut previous_best, &mut reports);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sokoban_core::{Difficulty, Level, LevelHeader, SessionState};
    use sokoban_world::query;

    #[test]
    fn move_scripts_ignore_whitespace() {
        let moves = parse_moves("rr u\nL").expect("valid script");
        assert_eq!(
            moves,
            vec![
                Direction::Right,
                Direction::Right,
                Direction::Up,
                Direction::Left
            ]
        );
        assert!(parse_moves("RX").is_err());
    }

    #[test]
    fn paint_accepts_codes_and_names() {
        let paint = parse_paint("0,0,P; 1,0,$;2,0,goal;3,0, ").expect("valid paint");
        assert_eq!(
            paint,
            vec![
                (CellCoord::new(0, 0), Tile::Player),
                (CellCoord::new(1, 0), Tile::Box),
                (CellCoord::new(2, 0), Tile::Goal),
                (CellCoord::new(3, 0), Tile::Floor),
            ]
        );
        assert!(parse_paint("1,2").is_err());
        assert!(parse_paint("a,0,#").is_err());
        assert!(parse_paint("0,0,lava").is_err());
    }

    #[test]
    fn runner_scores_finished_levels() {
        let level = Level::new(
            LevelHeader {
                id: LevelId::new(1),
                name: "runner".to_owned(),
                par_time: 1,
                difficulty: Difficulty::Easy,
                box_count: 1,
            },
            4,
            1,
            vec![Tile::Player, Tile::Floor, Tile::Box, Tile::Goal],
        )
        .expect("valid level");
        let mut runner = Runner::new(0.5);
        let _ = runner.apply(Command::LoadLevel { level }).expect("load");

        let reports = runner
            .play(&[Direction::Right, Direction::Right], |_| 0)
            .expect("play");

        assert_eq!(query::state(runner.world()), SessionState::Finished);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].score, 100);
    }
}
