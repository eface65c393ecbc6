//! Player profiles, persisted as one JSON file per profile name.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sokoban_core::{LevelId, ProfileId, ScoreReport, SessionSnapshot};
use tracing::{debug, info};

use crate::{files, StorageError};

const PROFILE_EXTENSION: &str = "json";

/// The single in-progress save slot carried by a profile.
///
/// `Empty` is stored explicitly so a profile without a save still round-trips
/// the field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "session", rename_all = "snake_case")]
pub enum InProgressSave {
    /// No session is saved.
    #[default]
    Empty,
    /// A suspended session.
    Session(SessionSnapshot),
}

impl InProgressSave {
    /// Reports whether no session is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Persistent record of one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    id: ProfileId,
    name: String,
    total_score: u32,
    level_scores: Vec<u32>,
    #[serde(default)]
    in_progress: InProgressSave,
}

impl Profile {
    /// Creates a profile with a zeroed score table of `level_count` entries.
    #[must_use]
    pub fn new(id: ProfileId, name: impl Into<String>, level_count: usize) -> Self {
        Self {
            id,
            name: name.into(),
            total_score: 0,
            level_scores: vec![0; level_count],
            in_progress: InProgressSave::Empty,
        }
    }

    /// Dense identifier of the profile.
    #[must_use]
    pub const fn id(&self) -> ProfileId {
        self.id
    }

    /// Unique display name, also used as the file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sum of the best score of every level.
    #[must_use]
    pub const fn total_score(&self) -> u32 {
        self.total_score
    }

    /// Best score per level, indexed by level id.
    #[must_use]
    pub fn level_scores(&self) -> &[u32] {
        &self.level_scores
    }

    /// Best score recorded for a level; zero when it was never scored.
    #[must_use]
    pub fn best_score(&self, level: LevelId) -> u32 {
        usize::try_from(level.get())
            .ok()
            .and_then(|index| self.level_scores.get(index).copied())
            .unwrap_or(0)
    }

    /// Records a finished run. Returns `true` when it set a new personal best.
    ///
    /// The total grows by the improvement over the old best, never by the raw
    /// score. Levels beyond the score table grow it with zeros first.
    pub fn record_score(&mut self, report: &ScoreReport) -> bool {
        let old = self.best_score(report.level);
        if report.score <= old {
            return false;
        }

        let Ok(index) = usize::try_from(report.level.get()) else {
            return false;
        };
        if index >= self.level_scores.len() {
            self.level_scores.resize(index + 1, 0);
        }
        self.level_scores[index] = report.score;
        self.total_score = self.total_score.saturating_add(report.score - old);
        true
    }

    /// Saved session of the profile.
    #[must_use]
    pub fn in_progress(&self) -> &InProgressSave {
        &self.in_progress
    }

    /// Replaces the saved session.
    pub fn set_in_progress(&mut self, save: InProgressSave) {
        self.in_progress = save;
    }
}

/// Directory of player profiles, ordered by id.
#[derive(Debug)]
pub struct ProfileStore {
    dir: PathBuf,
    profiles: Vec<Profile>,
}

impl ProfileStore {
    /// Loads every profile in `dir`, creating the directory when it is missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        files::ensure_dir(&dir)?;

        let mut profiles = Vec::new();
        for path in files::list_files(&dir, PROFILE_EXTENSION)? {
            profiles.push(files::read_json::<Profile>(&path)?);
        }
        profiles.sort_by_key(Profile::id);

        info!(dir = %dir.display(), count = profiles.len(), "profiles_loaded");
        Ok(Self { dir, profiles })
    }

    /// Directory that backs the store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of stored profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Reports whether no profile exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profiles ordered by id.
    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Reports whether a profile file with the name exists on disk.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        files::named_record(&self.dir, name).is_ok_and(|path| path.exists())
    }

    /// Profile stored under the given id.
    pub fn get(&self, id: ProfileId) -> Result<&Profile, StorageError> {
        let index = self.index(id)?;
        Ok(&self.profiles[index])
    }

    /// Profile with the given name, if any.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.name == name)
    }

    /// Creates and persists a profile with a zeroed score table.
    ///
    /// Fails with [`StorageError::DuplicateName`] without touching the
    /// existing file when the name is taken.
    pub fn create(&mut self, name: &str, level_count: usize) -> Result<ProfileId, StorageError> {
        let path = files::named_record(&self.dir, name)?;
        if path.exists() {
            return Err(StorageError::DuplicateName {
                name: name.to_owned(),
            });
        }

        let id = ProfileId::new(u32::try_from(self.profiles.len()).unwrap_or(u32::MAX));
        let profile = Profile::new(id, name, level_count);
        files::write_json(&path, &profile)?;
        info!(id = id.get(), name, "profile_created");
        self.profiles.push(profile);
        Ok(id)
    }

    /// Replaces the stored copy of a profile and rewrites its file.
    ///
    /// Names only change through [`ProfileStore::rename`]; a profile whose name
    /// differs from the stored one is rejected.
    pub fn save(&mut self, profile: Profile) -> Result<(), StorageError> {
        let index = self.index(profile.id)?;
        if self.profiles[index].name != profile.name {
            return Err(StorageError::InvalidName { name: profile.name });
        }
        self.persist(&profile)?;
        self.profiles[index] = profile;
        Ok(())
    }

    /// Removes a profile and shifts every later profile down by one id.
    pub fn delete(&mut self, id: ProfileId) -> Result<Profile, StorageError> {
        let index = self.index(id)?;
        let path = files::named_record(&self.dir, &self.profiles[index].name)?;
        files::remove_file(&path)?;
        let removed = self.profiles.remove(index);

        for profile in self.profiles.iter_mut().skip(index) {
            profile.id = ProfileId::new(profile.id.get().saturating_sub(1));
            debug!(id = profile.id.get(), name = %profile.name, "profile_renumbered");
        }
        for profile in &self.profiles[index..] {
            self.persist(profile)?;
        }

        info!(id = id.get(), name = %removed.name, "profile_deleted");
        Ok(removed)
    }

    /// Renames a profile by deleting its file and writing it under the new name.
    ///
    /// The two steps are not atomic: a failure in between leaves the profile
    /// only in memory. Renaming a profile to its current name does nothing.
    pub fn rename(&mut self, id: ProfileId, name: &str) -> Result<(), StorageError> {
        let index = self.index(id)?;
        if self.profiles[index].name == name {
            return Ok(());
        }
        let new_path = files::named_record(&self.dir, name)?;
        if new_path.exists() {
            return Err(StorageError::DuplicateName {
                name: name.to_owned(),
            });
        }

        let old_path = files::named_record(&self.dir, &self.profiles[index].name)?;
        files::remove_file(&old_path)?;
        let profile = &mut self.profiles[index];
        profile.name = name.to_owned();
        files::write_json(&new_path, &*profile)?;
        info!(id = id.get(), name, "profile_renamed");
        Ok(())
    }

    /// Profiles ordered by total score, highest first.
    #[must_use]
    pub fn leaderboard(&self) -> Vec<&Profile> {
        let mut ranked: Vec<&Profile> = self.profiles.iter().collect();
        ranked.sort_by(|left, right| right.total_score.cmp(&left.total_score));
        ranked
    }

    fn index(&self, id: ProfileId) -> Result<usize, StorageError> {
        let index = usize::try_from(id.get()).unwrap_or(usize::MAX);
        if index < self.profiles.len() {
            Ok(index)
        } else {
            Err(StorageError::out_of_range("profile", index, self.profiles.len()))
        }
    }

    fn persist(&self, profile: &Profile) -> Result<(), StorageError> {
        let path = files::named_record(&self.dir, &profile.name)?;
        files::write_json(&path, profile)
    }
}
