#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Durable storage for levels, player profiles and save slots.
//!
//! Every store owns one directory and keeps an in-memory copy of its records
//! that mirrors the files on disk. Writes are synchronous; multi-file updates
//! such as renumbering after a delete are performed one file at a time and are
//! not crash-safe.

mod catalog;
mod error;
mod files;
pub mod format;
mod profiles;
mod save_slots;

pub use catalog::{level_file_name, LevelCatalog};
pub use error::{FormatError, StorageError};
pub use format::LevelFormat;
pub use profiles::{InProgressSave, Profile, ProfileStore};
pub use save_slots::{SaveSlot, SaveSlotStore};
