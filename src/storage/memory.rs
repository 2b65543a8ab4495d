use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;

use crate::errors::JarsError;

use super::{BackupInfo, Result, StateStorage};

#[derive(Debug, Default)]
struct Inner {
    state: Option<String>,
    backups: Vec<(BackupInfo, String)>,
    fail_writes: bool,
}

/// Volatile storage for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(document: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.lock().state = Some(document.into());
        storage
    }

    /// Makes every subsequent write fail, to exercise error paths.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn state(&self) -> Option<String> {
        self.lock().state.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StateStorage for MemoryStorage {
    fn load_state(&self) -> Result<Option<String>> {
        Ok(self.lock().state.clone())
    }

    fn save_state(&self, document: &str) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(JarsError::Storage("memory storage is read-only".into()));
        }
        inner.state = Some(document.to_string());
        Ok(())
    }

    fn write_backup(&self, document: &str, note: Option<&str>) -> Result<BackupInfo> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(JarsError::Storage("memory storage is read-only".into()));
        }
        let mut name = format!("backup-{}", inner.backups.len() + 1);
        if let Some(note) = note.map(str::trim).filter(|note| !note.is_empty()) {
            name.push('-');
            name.push_str(note);
        }
        let info = BackupInfo {
            path: PathBuf::from(&name),
            name,
            created_at: Some(Utc::now()),
        };
        inner.backups.push((info.clone(), document.to_string()));
        Ok(info)
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        Ok(self
            .lock()
            .backups
            .iter()
            .rev()
            .map(|(info, _)| info.clone())
            .collect())
    }

    fn read_backup(&self, name: &str) -> Result<String> {
        self.lock()
            .backups
            .iter()
            .find(|(info, _)| info.name == name)
            .map(|(_, document)| document.clone())
            .ok_or_else(|| JarsError::Storage(format!("backup `{}` not found", name)))
    }
}
