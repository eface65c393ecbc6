//! Error types raised by the storage layer.

use std::{io, path::PathBuf};

use sokoban_core::LevelError;
use thiserror::Error;

/// Structural problems found while parsing a level file.
///
/// Recoverable data-quality issues such as unknown tile codes are not errors;
/// they are replaced by safe defaults and logged.
#[derive(Debug, Error)]
pub enum FormatError {
    /// No `Level map:` line separates the header from the grid.
    #[error("missing `Level map:` marker")]
    MissingMapMarker,
    /// The header holds neither the standard nor the editor-authored field count.
    #[error(
        "expected {} or {} header lines before the map, found {found}",
        crate::format::STANDARD_FIELDS,
        crate::format::AUTHORED_FIELDS
    )]
    HeaderCount {
        /// Non-empty header lines found.
        found: usize,
    },
    /// A numeric header field could not be parsed.
    #[error("header field `{field}` is not a number: {value:?}")]
    InvalidNumber {
        /// Name of the offending field.
        field: &'static str,
        /// Raw text of the field.
        value: String,
    },
    /// The file ends before every declared row was read.
    #[error("expected {expected} map rows, found {found}")]
    MissingRows {
        /// Rows declared in the header.
        expected: u32,
        /// Rows present in the file.
        found: usize,
    },
    /// The parsed fields do not describe a valid level.
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A file system operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A JSON record could not be read or written.
    #[error("JSON error in {path}: {source}")]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// A level file is structurally malformed.
    #[error("malformed level file {path}: {source}")]
    Format {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: FormatError,
    },
    /// An index or id does not address a stored record.
    #[error("{kind} index {index} is out of range (have {len})")]
    OutOfRange {
        /// Kind of record that was addressed.
        kind: &'static str,
        /// Requested index.
        index: usize,
        /// Number of stored records.
        len: usize,
    },
    /// A record with the same name already exists.
    #[error("a record named {name:?} already exists")]
    DuplicateName {
        /// Rejected name.
        name: String,
    },
    /// The name cannot be used as a file name.
    #[error("{name:?} is not a valid record name")]
    InvalidName {
        /// Rejected name.
        name: String,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn out_of_range(kind: &'static str, index: usize, len: usize) -> Self {
        Self::OutOfRange { kind, index, len }
    }
}
