//! Small file-system helpers shared by every store.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::StorageError;

/// Creates the directory (and parents) when it is missing.
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|error| StorageError::io(dir, error))
}

/// Lists regular files with the given extension, sorted by file name.
pub(crate) fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, StorageError> {
    let entries = fs::read_dir(dir).map_err(|error| StorageError::io(dir, error))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == extension))
        .collect();
    files.sort();
    Ok(files)
}

pub(crate) fn read_text(path: &Path) -> Result<String, StorageError> {
    fs::read_to_string(path).map_err(|error| StorageError::io(path, error))
}

pub(crate) fn write_text(path: &Path, text: &str) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, text).map_err(|error| StorageError::io(path, error))?;
    debug!(path = %path.display(), "file_written");
    Ok(())
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|error| StorageError::json(path, error))
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let text = serde_json::to_string_pretty(value).map_err(|error| StorageError::json(path, error))?;
    write_text(path, &text)
}

/// Removes a file; a file that is already gone counts as removed.
pub(crate) fn remove_file(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "file_removed");
            Ok(())
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(StorageError::io(path, error)),
    }
}

/// Path of the JSON record for a user-chosen name.
///
/// Names become file names, so empty names, path separators and relative
/// components are rejected.
pub(crate) fn named_record(dir: &Path, name: &str) -> Result<PathBuf, StorageError> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StorageError::InvalidName {
            name: name.to_owned(),
        });
    }
    Ok(dir.join(format!("{name}.json")))
}
