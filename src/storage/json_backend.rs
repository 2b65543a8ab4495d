use chrono::{DateTime, Duration, NaiveDateTime, SubsecRound, Utc};
use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{ensure_dir, PathResolver},
    errors::JarsError,
};

use super::{BackupInfo, Result, StateStorage};

const BACKUP_PREFIX: &str = "six_jars";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const BACKUP_TIMESTAMP_LEN: usize = 18;
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// File-backed storage rooted at the application data directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    state_file: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let backups_dir = PathResolver::backup_dir_in(&app_root);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            state_file: PathResolver::state_file_in(&app_root),
            root: app_root,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> &Path {
        &self.state_file
    }

    /// Path of a stored backup. Only plain file names inside the backups
    /// directory are accepted.
    pub fn backup_path(&self, backup_name: &str) -> Result<PathBuf> {
        let is_plain_name = !backup_name.is_empty()
            && backup_name != "."
            && backup_name != ".."
            && !backup_name.contains(['/', '\\']);
        if !is_plain_name {
            return Err(JarsError::Storage(format!(
                "`{}` is not a backup name",
                backup_name
            )));
        }
        Ok(self.backups_dir.join(backup_name))
    }

    /// Deletes the oldest backups beyond the retention limit, never `keep`.
    fn prune_backups(&self, keep: &Path) -> Result<()> {
        let older = self
            .list_backups()?
            .into_iter()
            .filter(|info| info.path != keep);
        for stale in older.skip(self.retention - 1) {
            let _ = fs::remove_file(&stale.path);
        }
        Ok(())
    }

    /// A millisecond timestamp later than every existing backup, so names
    /// never collide and sort in write order.
    fn next_backup_time(&self) -> Result<DateTime<Utc>> {
        let now = Utc::now().trunc_subsecs(3);
        let latest = self
            .list_backups()?
            .into_iter()
            .filter_map(|info| info.created_at)
            .max();
        Ok(match latest {
            Some(latest) if latest >= now => latest + Duration::milliseconds(1),
            _ => now,
        })
    }
}

impl StateStorage for JsonStorage {
    fn load_state(&self) -> Result<Option<String>> {
        if !self.state_file.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.state_file)?))
    }

    fn save_state(&self, document: &str) -> Result<()> {
        let tmp = tmp_path(&self.state_file);
        write_atomic(&tmp, document)?;
        fs::rename(&tmp, &self.state_file)?;
        Ok(())
    }

    fn write_backup(&self, document: &str, note: Option<&str>) -> Result<BackupInfo> {
        ensure_dir(&self.backups_dir)?;
        let created_at = self.next_backup_time()?;
        let mut stem = format!(
            "{}_{}",
            BACKUP_PREFIX,
            created_at.format(BACKUP_TIMESTAMP_FORMAT)
        );
        if let Some(label) = sanitize_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let path = self
            .backups_dir
            .join(format!("{}.{}", stem, BACKUP_EXTENSION));
        write_atomic(&path, document)?;
        self.prune_backups(&path)?;
        Ok(BackupInfo {
            name: file_name(&path).unwrap_or_default(),
            path,
            created_at: Some(created_at),
        })
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let Some(name) = file_name(&path) else {
                continue;
            };
            entries.push(BackupInfo {
                created_at: parse_backup_timestamp(&name),
                name,
                path,
            });
        }
        entries.sort_by_key(|info| Reverse((info.created_at, info.name.clone())));
        Ok(entries)
    }

    fn read_backup(&self, name: &str) -> Result<String> {
        let path = self.backup_path(name)?;
        if !path.exists() {
            return Err(JarsError::Storage(format!("backup `{}` not found", name)));
        }
        Ok(fs::read_to_string(path)?)
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Reads the timestamp out of `six_jars_YYYYMMDD_HHMMSSmmm[...].json`.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let rest = name.strip_prefix(BACKUP_PREFIX)?.strip_prefix('_')?;
    let raw = rest.get(..BACKUP_TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_with_temp_dir(retention: usize) -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(Some(temp.path().to_path_buf()), Some(retention))
            .expect("json storage");
        (storage, temp)
    }

    #[test]
    fn missing_state_loads_as_none() {
        let (storage, _guard) = storage_with_temp_dir(3);
        assert_eq!(storage.load_state().unwrap(), None);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir(3);
        storage.save_state(r#"{"history":[]}"#).expect("save state");
        assert_eq!(
            storage.load_state().unwrap().as_deref(),
            Some(r#"{"history":[]}"#)
        );
        assert!(!tmp_path(storage.state_path()).exists());
    }

    #[test]
    fn backups_are_named_listed_and_pruned() {
        let (storage, _guard) = storage_with_temp_dir(2);
        let first = storage.write_backup("{}", Some("Before Tết!")).unwrap();
        assert!(first.name.starts_with("six_jars_"));
        assert!(first.name.ends_with("_before-tt.json"), "{}", first.name);
        assert!(first.created_at.is_some());

        storage.write_backup("{}", None).unwrap();
        storage.write_backup("{}", None).unwrap();
        let latest = storage.write_backup("{}", Some("latest")).unwrap();
        let listed = storage.list_backups().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|info| info.name == latest.name));
    }

    #[test]
    fn retention_keeps_the_newest_backups() {
        let (storage, _guard) = storage_with_temp_dir(2);
        let first = storage.write_backup("1", Some("a")).unwrap();
        let second = storage.write_backup("2", None).unwrap();
        let third = storage.write_backup("3", None).unwrap();
        assert!(first.created_at < second.created_at);
        assert!(second.created_at < third.created_at);

        let names: Vec<String> = storage
            .list_backups()
            .unwrap()
            .into_iter()
            .map(|info| info.name)
            .collect();
        assert_eq!(names, vec![third.name.clone(), second.name.clone()]);
        assert!(!first.path.exists());
        assert_eq!(storage.read_backup(&third.name).unwrap(), "3");
    }

    #[test]
    fn backup_names_cannot_leave_the_backups_directory() {
        let (storage, _guard) = storage_with_temp_dir(2);
        storage.save_state("{}").unwrap();
        for name in ["../state.json", "..", "", "sub/file.json", "..\\state.json"] {
            let err = storage.read_backup(name).unwrap_err();
            assert!(matches!(err, JarsError::Storage(_)), "{}", name);
        }
    }

    #[test]
    fn read_backup_reports_missing_names() {
        let (storage, _guard) = storage_with_temp_dir(2);
        let info = storage.write_backup("{\"a\":1}", None).unwrap();
        assert_eq!(storage.read_backup(&info.name).unwrap(), "{\"a\":1}");
        let err = storage.read_backup("nope.json").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn sanitize_note_collapses_separators() {
        assert_eq!(sanitize_note(Some("  Year End -- 2024 ")), Some("year-end-2024".into()));
        assert_eq!(sanitize_note(Some("!!!")), None);
        assert_eq!(sanitize_note(None), None);
    }
}
