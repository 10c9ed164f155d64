use crate::error::{Result, WatchError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Ids of items already delivered.
pub type SeenSet = HashSet<String>;

/// On-disk shape: `{"sent_ids": [...], "updated_at": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
struct SeenFile {
    #[serde(default)]
    sent_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// JSON file holding the set of delivered ids.
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty set; anything else unreadable is an error.
    pub fn load(&self) -> Result<SeenSet> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no state file yet, starting empty");
                return Ok(SeenSet::new());
            }
            Err(e) => return Err(WatchError::persistence(&self.path, e)),
        };

        let file: SeenFile = serde_json::from_str(&content)
            .map_err(|e| WatchError::persistence(&self.path, e))?;
        Ok(file.sent_ids.into_iter().collect())
    }

    /// Overwrite the file with the full set. Written to a sibling temp file
    /// and renamed into place so a crash never leaves a truncated file.
    pub fn save(&self, seen: &SeenSet) -> Result<()> {
        let mut sent_ids: Vec<String> = seen.iter().cloned().collect();
        sent_ids.sort();
        let file = SeenFile {
            sent_ids,
            updated_at: Some(Utc::now()),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| WatchError::persistence(&self.path, e))?;

        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(|e| WatchError::persistence(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(WatchError::persistence(&self.path, e));
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "sent_posts.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> SeenSet {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::new(dir.path().join("sent.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::new(dir.path().join("sent.json"));
        let ids = set(&["c", "a", "b"]);
        store.save(&ids).unwrap();
        assert_eq!(store.load().unwrap(), ids);
    }

    #[test]
    fn test_load_collapses_duplicates_and_ignores_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sent.json");
        std::fs::write(&path, r#"{"sent_ids": ["a", "b", "a"], "note": "x"}"#).unwrap();
        let loaded = SeenStore::new(&path).load().unwrap();
        assert_eq!(loaded, set(&["a", "b"]));
    }

    #[test]
    fn test_load_legacy_file_without_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sent.json");
        std::fs::write(&path, r#"{"sent_ids": ["x1"]}"#).unwrap();
        assert_eq!(SeenStore::new(&path).load().unwrap(), set(&["x1"]));
    }

    #[test]
    fn test_load_corrupt_file_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sent.json");
        std::fs::write(&path, "not json").unwrap();
        let err = SeenStore::new(&path).load().unwrap_err();
        assert!(matches!(err, WatchError::Persistence { .. }));
    }

    #[test]
    fn test_load_directory_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SeenStore::new(dir.path()).load().unwrap_err();
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_save_overwrites_with_full_set_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sent.json");
        let store = SeenStore::new(&path);
        store.save(&set(&["old"])).unwrap();
        store.save(&set(&["b", "a"])).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["sent_ids"], serde_json::json!(["a", "b"]));
        assert!(raw["updated_at"].is_string());
        assert!(!dir.path().join("sent.json.tmp").exists());
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::new(dir.path().join("nope").join("sent.json"));
        assert!(matches!(store.save(&set(&["a"])), Err(WatchError::Persistence { .. })));
    }
}
