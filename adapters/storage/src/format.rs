//! Line-oriented level text format.
//!
//! A level file starts with `Label: value` header lines. Only the text after the
//! first colon is significant, so labels are free-form. The standard variant
//! carries seven fields (id, name, par time, difficulty, box count, width,
//! height); the editor-authored variant omits par time and difficulty. A
//! `Level map:` line follows, then one text line per grid row with the top
//! row first. In memory row zero is the bottom row, so the text is inverted on
//! both read and write.

use std::fmt::Write as _;

use sokoban_core::{Difficulty, Level, LevelHeader, LevelId, Tile};
use tracing::warn;

use crate::FormatError;

const MAP_MARKER: &str = "level map:";
pub(crate) const STANDARD_FIELDS: usize = 7;
pub(crate) const AUTHORED_FIELDS: usize = 5;

/// Appended to the name of a level whose difficulty could not be parsed.
pub const INVALID_DIFFICULTY_MARKER: &str = "Invalid Difficulty Level";

/// Header layout used when writing level files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LevelFormat {
    /// Seven header fields including par time and difficulty.
    #[default]
    Standard,
    /// Five header fields; par time and difficulty are implied.
    Authored,
}

/// Parses a level file in either variant.
///
/// Unknown tile codes become [`Tile::Empty`] and an unknown difficulty becomes
/// [`Difficulty::Easy`]; both are logged and loading continues.
pub fn parse_level(text: &str) -> Result<Level, FormatError> {
    let lines: Vec<&str> = text.lines().collect();
    let marker = lines
        .iter()
        .position(|line| line.trim().eq_ignore_ascii_case(MAP_MARKER))
        .ok_or(FormatError::MissingMapMarker)?;

    let fields: Vec<&str> = lines[..marker]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| field_value(line))
        .collect();

    let (header, columns, rows) = match fields.as_slice() {
        [id, name, par_time, difficulty, box_count, columns, rows] => {
            let mut name = name.trim_end().to_owned();
            let difficulty = match Difficulty::parse(difficulty) {
                Some(difficulty) => difficulty,
                None => {
                    warn!(level = %name, value = %difficulty, "invalid_difficulty");
                    name.push(' ');
                    name.push_str(INVALID_DIFFICULTY_MARKER);
                    Difficulty::Easy
                }
            };
            let header = LevelHeader {
                id: LevelId::new(number("id", id)?),
                name,
                par_time: number("par_time", par_time)?,
                difficulty,
                box_count: number("box_count", box_count)?,
            };
            (header, number("width", columns)?, number("height", rows)?)
        }
        [id, name, box_count, columns, rows] => {
            let header = LevelHeader {
                id: LevelId::new(number("id", id)?),
                name: name.trim_end().to_owned(),
                par_time: 0,
                difficulty: Difficulty::None,
                box_count: number("box_count", box_count)?,
            };
            (header, number("width", columns)?, number("height", rows)?)
        }
        other => return Err(FormatError::HeaderCount { found: other.len() }),
    };

    let map = &lines[marker + 1..];
    let row_count = usize::try_from(rows).unwrap_or(usize::MAX);
    if map.len() < row_count {
        return Err(FormatError::MissingRows {
            expected: rows,
            found: map.len(),
        });
    }

    let width = usize::try_from(columns).unwrap_or(0);
    let mut layout = Vec::with_capacity(width * row_count);
    for (offset, line) in map[..row_count].iter().rev().enumerate() {
        let row = parse_row(line, width, &header.name);
        if row.len() != line.chars().count() {
            warn!(
                level = %header.name,
                row = offset,
                found = line.chars().count(),
                expected = width,
                "row_width_mismatch"
            );
        }
        layout.extend(row);
    }

    Ok(Level::new(header, columns, rows, layout)?)
}

/// Renders a level in the requested header variant.
#[must_use]
pub fn write_level(level: &Level, format: LevelFormat) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Id: {}", level.id().get());
    let _ = writeln!(text, "Name: {}", level.name());
    if format == LevelFormat::Standard {
        let _ = writeln!(text, "Time: {}", level.par_time());
        let _ = writeln!(text, "Difficulty: {}", level.difficulty().label());
    }
    let _ = writeln!(text, "Box count: {}", level.box_count());
    let _ = writeln!(text, "Width: {}", level.columns());
    let _ = writeln!(text, "Height: {}", level.rows());
    text.push_str("Level map:\n");
    for row in level.view().rows_top_down() {
        text.extend(row.iter().map(|tile| tile.code()));
        text.push('\n');
    }
    text
}

/// Text after the first colon with leading spaces removed, or the whole line.
fn field_value(line: &str) -> &str {
    line.split_once(':')
        .map_or(line, |(_, value)| value)
        .trim_start()
}

fn number(field: &'static str, value: &str) -> Result<u32, FormatError> {
    value
        .trim()
        .parse()
        .map_err(|_| FormatError::InvalidNumber {
            field,
            value: value.to_owned(),
        })
}

/// Decodes one row, padding short rows with `Empty` and dropping extra characters.
fn parse_row(line: &str, width: usize, level: &str) -> Vec<Tile> {
    let mut row: Vec<Tile> = line
        .chars()
        .take(width)
        .map(|code| {
            Tile::from_code(code).unwrap_or_else(|| {
                warn!(level = %level, code = ?code, "invalid_tile");
                Tile::Empty
            })
        })
        .collect();
    row.resize(width, Tile::Empty);
    row
}
