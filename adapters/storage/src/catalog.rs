//! Ordered level catalog backed by one text file per level.

use std::path::{Path, PathBuf};

use sokoban_core::{Level, LevelId};
use tracing::{debug, info};

use crate::{
    files,
    format::{parse_level, write_level, LevelFormat},
    StorageError,
};

const LEVEL_EXTENSION: &str = "txt";

/// File name used for the level with the given id, e.g. `Level_007.txt`.
#[must_use]
pub fn level_file_name(id: LevelId) -> String {
    format!("Level_{:03}.{LEVEL_EXTENSION}", id.get())
}

/// Levels of one directory, ordered by id.
///
/// Ids are dense: the level with id `n` sits at index `n`. Ids read from bulk
/// loaded files are trusted as they are; levels added later always receive
/// the next free id. Any level that is written moves to its canonical
/// [`level_file_name`] and the file it was loaded from is removed.
#[derive(Debug)]
pub struct LevelCatalog {
    dir: PathBuf,
    format: LevelFormat,
    levels: Vec<Level>,
    paths: Vec<PathBuf>,
}

impl LevelCatalog {
    /// Loads every level file in `dir`, creating the directory when it is missing.
    pub fn open(dir: impl Into<PathBuf>, format: LevelFormat) -> Result<Self, StorageError> {
        let dir = dir.into();
        files::ensure_dir(&dir)?;

        let mut entries = Vec::new();
        for path in files::list_files(&dir, LEVEL_EXTENSION)? {
            let text = files::read_text(&path)?;
            let level = parse_level(&text).map_err(|source| StorageError::Format {
                path: path.clone(),
                source,
            })?;
            entries.push((level, path));
        }
        entries.sort_by_key(|(level, _)| level.id());
        let (levels, paths): (Vec<Level>, Vec<PathBuf>) = entries.into_iter().unzip();

        info!(dir = %dir.display(), count = levels.len(), "level_catalog_loaded");
        Ok(Self {
            dir,
            format,
            levels,
            paths,
        })
    }

    /// Directory that backs the catalog.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of levels in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether the catalog holds no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Levels ordered by id.
    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Level stored at the given id.
    pub fn get(&self, id: LevelId) -> Result<&Level, StorageError> {
        let index = self.index(id)?;
        Ok(&self.levels[index])
    }

    /// Reports whether any level already uses the name.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.levels.iter().any(|level| level.name() == name)
    }

    /// Appends a level under the next free id and persists it.
    pub fn add(&mut self, level: Level) -> Result<LevelId, StorageError> {
        let id = LevelId::new(u32::try_from(self.levels.len()).unwrap_or(u32::MAX));
        let level = level.with_id(id);
        let path = self.path_for(id);
        files::write_text(&path, &write_level(&level, self.format))?;
        info!(id = id.get(), name = level.name(), "level_added");
        self.levels.push(level);
        self.paths.push(path);
        Ok(id)
    }

    /// Removes a level and shifts every later level down by one id.
    ///
    /// Shifted levels are rewritten one by one, each dropping the file it
    /// previously occupied. Returns the removed level.
    pub fn delete(&mut self, id: LevelId) -> Result<Level, StorageError> {
        let index = self.index(id)?;
        let removed = self.levels.remove(index);
        let removed_path = self.paths.remove(index);

        for slot in self.levels.iter_mut().skip(index) {
            let shifted = LevelId::new(slot.id().get().saturating_sub(1));
            *slot = slot.clone().with_id(shifted);
            debug!(id = shifted.get(), "level_renumbered");
        }
        for shifted in index..self.levels.len() {
            self.persist(shifted)?;
        }
        self.release(&removed_path)?;

        info!(id = id.get(), name = removed.name(), "level_deleted");
        Ok(removed)
    }

    /// Gives a level a new name and rewrites its record.
    pub fn rename(&mut self, id: LevelId, name: &str) -> Result<(), StorageError> {
        let index = self.index(id)?;
        let renamed = self.levels[index].clone().with_name(name);
        let previous = std::mem::replace(&mut self.levels[index], renamed);
        if let Err(error) = self.persist(index) {
            self.levels[index] = previous;
            return Err(error);
        }
        Ok(())
    }

    fn index(&self, id: LevelId) -> Result<usize, StorageError> {
        let index = usize::try_from(id.get()).unwrap_or(usize::MAX);
        if index < self.levels.len() {
            Ok(index)
        } else {
            Err(StorageError::out_of_range("level", index, self.levels.len()))
        }
    }

    fn path_for(&self, id: LevelId) -> PathBuf {
        self.dir.join(level_file_name(id))
    }

    /// Writes the level at `index` to its canonical file and drops the file it
    /// was stored in before, unless another level still lives there.
    fn persist(&mut self, index: usize) -> Result<(), StorageError> {
        let level = &self.levels[index];
        let path = self.path_for(level.id());
        files::write_text(&path, &write_level(level, self.format))?;
        let previous = std::mem::replace(&mut self.paths[index], path);
        self.release(&previous)
    }

    fn release(&self, path: &Path) -> Result<(), StorageError> {
        if self.paths.iter().any(|held| held == path) {
            return Ok(());
        }
        debug!(path = %path.display(), "level_file_released");
        files::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(level_file_name(LevelId::new(7)), "Level_007.txt");
        assert_eq!(level_file_name(LevelId::new(1234)), "Level_1234.txt");
    }
}
