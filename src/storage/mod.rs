pub mod json_backend;
pub mod memory;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::errors::JarsError;

pub type Result<T> = std::result::Result<T, JarsError>;

/// Describes one stored backup document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub name: String,
    pub path: PathBuf,
    pub created_at: Option<DateTime<Utc>>,
}

/// Persistence for the serialized `{ history, userName }` document.
///
/// Backends deal in JSON text only; shape and hydration belong to the codec.
pub trait StateStorage: Send + Sync {
    /// Returns the persisted document, or `None` when nothing was saved yet.
    fn load_state(&self) -> Result<Option<String>>;
    fn save_state(&self, document: &str) -> Result<()>;
    /// Stores a named copy of `document` and returns its descriptor.
    fn write_backup(&self, document: &str, note: Option<&str>) -> Result<BackupInfo>;
    /// Backups, newest first.
    fn list_backups(&self) -> Result<Vec<BackupInfo>>;
    fn read_backup(&self, name: &str) -> Result<String>;
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
