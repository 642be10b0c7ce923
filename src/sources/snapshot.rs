//! Whole-file JSON snapshots of normalized source data.
use std::io::Write;
use std::path::Path;

use atomicwrites::{AtomicFile, OverwriteBehavior};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// On-disk snapshot body.
#[derive(Serialize, Deserialize, Debug)]
struct SnapshotEntry<T> {
    /// Unix timestamp (seconds since epoch) when the snapshot was saved.
    saved_at: i64,
    /// Normalized records.
    data: T,
}

/// Snapshot read/write failure; always recovered by the caller.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// File missing or unreadable.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// File present but not a valid snapshot.
    #[error("snapshot corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl CacheError {
    /// Whether the snapshot file simply does not exist.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// What: Read a snapshot file.
///
/// Inputs:
/// - `path`: Snapshot file.
///
/// Output:
/// - Stored records, or the reason the snapshot could not be used.
///
/// # Errors
/// - [`CacheError::Io`] when the file is missing or unreadable.
/// - [`CacheError::Corrupt`] when the contents do not deserialize.
///
/// Details:
/// - Snapshots never expire; their age is only logged.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, CacheError> {
    let content = std::fs::read_to_string(path)?;
    let entry: SnapshotEntry<T> = serde_json::from_str(&content)?;
    let age = chrono::Utc::now().timestamp() - entry.saved_at;
    info!(
        path = %path.display(),
        age_hours = age / 3600,
        "loaded snapshot"
    );
    Ok(entry.data)
}

/// What: Atomically write a snapshot file stamped with the current time.
///
/// Inputs:
/// - `path`: Snapshot file; parent directories are created.
/// - `data`: Records to store.
///
/// # Errors
/// - [`CacheError::Corrupt`] when serialization fails.
/// - [`CacheError::Io`] when the directory or file cannot be written.
///
/// Details:
/// - Writes a temporary file and renames it over `path`, so readers never see a partial file.
/// - Concurrent writers race; the last rename wins.
pub fn save<T: Serialize>(path: &Path, data: &T) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let entry = SnapshotEntry {
        saved_at: chrono::Utc::now().timestamp(),
        data,
    };
    let json = serde_json::to_vec_pretty(&entry)?;
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(&json)?;
            f.flush()
        })
        .map_err(|e| match e {
            atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => CacheError::Io(e),
        })?;
    debug!(path = %path.display(), bytes = json.len(), "saved snapshot");
    Ok(())
}

/// What: Delete a snapshot file if present.
///
/// Output:
/// - `Ok(true)` when a file was removed, `Ok(false)` when none existed.
///
/// # Errors
/// - Any I/O error other than "not found".
pub fn remove(path: &Path) -> Result<bool, CacheError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    /// What: Saved snapshots carry `saved_at` and `data` and load back
    ///
    /// - Input: Map written into a nested, not-yet-existing directory
    /// - Output: File parses as a JSON object with both keys; load returns the map
    fn save_creates_dirs_and_wraps_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("engine_map.json");
        let mut map = HashMap::new();
        map.insert("28.0.0".to_string(), "120.0.6099.5".to_string());
        save(&path, &map).expect("save");

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        assert!(raw.get("saved_at").and_then(serde_json::Value::as_i64).is_some());
        assert_eq!(raw["data"]["28.0.0"], "120.0.6099.5");

        let back: HashMap<String, String> = load(&path).expect("load");
        assert_eq!(back, map);
    }

    #[test]
    /// What: Missing and corrupt snapshots report distinct errors
    fn load_classifies_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = load::<Vec<String>>(&dir.path().join("none.json")).expect_err("missing");
        assert!(missing.is_missing());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"saved_at": 1, "data": 5}"#).expect("write");
        let corrupt = load::<Vec<String>>(&bad).expect_err("corrupt");
        assert!(!corrupt.is_missing());
        assert!(matches!(corrupt, CacheError::Corrupt(_)));
    }

    #[test]
    /// What: Removing reports whether a file existed
    fn remove_reports_presence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("registry_tags.json");
        save(&path, &Vec::<String>::new()).expect("save");
        assert!(remove(&path).expect("remove"));
        assert!(!remove(&path).expect("remove again"));
    }
}
