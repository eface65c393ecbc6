//! Named, timestamped session snapshots independent of any profile.

use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use sokoban_core::SessionSnapshot;
use tracing::info;

use crate::{files, StorageError};

const SLOT_EXTENSION: &str = "json";

/// A named snapshot of a play session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSlot {
    name: String,
    created_at: u64,
    snapshot: SessionSnapshot,
}

impl SaveSlot {
    /// Creates a slot with an explicit creation time in milliseconds since the Unix epoch.
    #[must_use]
    pub fn new(name: impl Into<String>, created_at: u64, snapshot: SessionSnapshot) -> Self {
        Self {
            name: name.into(),
            created_at,
            snapshot,
        }
    }

    /// Creates a slot stamped with the current time.
    #[must_use]
    pub fn capture(name: impl Into<String>, snapshot: SessionSnapshot) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Self::new(name, u64::try_from(now).unwrap_or(u64::MAX), snapshot)
    }

    /// User-chosen unique name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creation time in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Saved session, including its own copy of the level.
    #[must_use]
    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }
}

/// Directory of save slots ordered by creation time.
///
/// Slots are addressed by their position in that order; deleting one shifts
/// the positions of later slots without rewriting any file.
#[derive(Debug)]
pub struct SaveSlotStore {
    dir: PathBuf,
    slots: Vec<SaveSlot>,
}

impl SaveSlotStore {
    /// Loads every slot in `dir`, creating the directory when it is missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        files::ensure_dir(&dir)?;

        let mut slots = Vec::new();
        for path in files::list_files(&dir, SLOT_EXTENSION)? {
            slots.push(files::read_json::<SaveSlot>(&path)?);
        }
        let mut store = Self { dir, slots };
        store.sort();

        info!(dir = %store.dir.display(), count = store.slots.len(), "save_slots_loaded");
        Ok(store)
    }

    /// Directory that backs the store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of stored slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Reports whether no slot exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots ordered by creation time.
    #[must_use]
    pub fn slots(&self) -> &[SaveSlot] {
        &self.slots
    }

    /// Reports whether a slot file with the name exists on disk.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        files::named_record(&self.dir, name).is_ok_and(|path| path.exists())
    }

    /// Persists a new slot and returns its position in creation order.
    pub fn add(&mut self, slot: SaveSlot) -> Result<usize, StorageError> {
        let path = files::named_record(&self.dir, &slot.name)?;
        if path.exists() {
            return Err(StorageError::DuplicateName { name: slot.name });
        }

        files::write_json(&path, &slot)?;
        info!(name = %slot.name, created_at = slot.created_at, "save_slot_added");
        let name = slot.name.clone();
        self.slots.push(slot);
        self.sort();
        Ok(self
            .slots
            .iter()
            .position(|stored| stored.name == name)
            .unwrap_or(self.slots.len() - 1))
    }

    /// Slot at the given position.
    pub fn get(&self, index: usize) -> Result<&SaveSlot, StorageError> {
        self.slots
            .get(index)
            .ok_or_else(|| StorageError::out_of_range("save slot", index, self.slots.len()))
    }

    /// Removes the slot at the given position along with its file.
    pub fn delete(&mut self, index: usize) -> Result<SaveSlot, StorageError> {
        let name = self.get(index)?.name.clone();
        files::remove_file(&files::named_record(&self.dir, &name)?)?;
        let removed = self.slots.remove(index);
        self.sort();
        info!(name = %removed.name, "save_slot_deleted");
        Ok(removed)
    }

    fn sort(&mut self) {
        self.slots.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.name.cmp(&right.name))
        });
    }
}
