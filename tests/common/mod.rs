#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use once_cell::sync::Lazy;
use six_jars::{
    config::ConfigManager,
    core::BudgetManager,
    domain::MonthKey,
    storage::JsonStorage,
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique base directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn storage_in(base: &PathBuf) -> JsonStorage {
    JsonStorage::new(Some(base.clone()), Some(3)).expect("create json storage backend")
}

/// Opens a manager over file storage in `base`, seeded for `today`.
pub fn open_manager(base: &PathBuf, share: Option<&str>, today: &str) -> BudgetManager {
    BudgetManager::open(Box::new(storage_in(base)), share, month(today))
}

/// Creates an isolated manager and config manager sharing one directory.
pub fn setup_test_env() -> (BudgetManager, ConfigManager, PathBuf) {
    let base = temp_base();
    let manager = open_manager(&base, None, "2024-01");
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    (manager, config_manager, base)
}

pub fn month(raw: &str) -> MonthKey {
    raw.parse().expect("valid month key")
}
