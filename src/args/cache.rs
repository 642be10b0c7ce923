//! Command-line snapshot management.

use std::path::Path;

use obsiver::sources::snapshot;
use obsiver::sources::{ChangelogSource, EngineMapSource, RegistrySource, Source};

/// Snapshot files written by the three sources.
const SNAPSHOT_FILES: [&str; 3] = [
    ChangelogSource::SNAPSHOT_FILE,
    RegistrySource::SNAPSHOT_FILE,
    EngineMapSource::SNAPSHOT_FILE,
];

/// What: Remove every source snapshot in `cache_dir`.
///
/// Output:
/// - Number of files actually deleted.
///
/// Details:
/// - Missing files are skipped; other failures are logged and skipped.
pub fn clear_snapshots(cache_dir: &Path) -> usize {
    let mut cleared = 0;
    for file in SNAPSHOT_FILES {
        let path = cache_dir.join(file);
        match snapshot::remove(&path) {
            Ok(true) => {
                tracing::info!(path = %path.display(), "cleared snapshot");
                cleared += 1;
            }
            Ok(false) => {
                tracing::debug!(path = %path.display(), "snapshot does not exist, skipping");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to clear snapshot");
            }
        }
    }
    cleared
}

/// What: Handle `--clear-cache`: delete the snapshots, report, and exit.
pub fn handle_clear_cache(cache_dir: &Path) -> ! {
    tracing::info!("clear cache requested from CLI");
    let cleared = clear_snapshots(cache_dir);
    if cleared > 0 {
        println!("Cleared {cleared} snapshot file(s) in {}", cache_dir.display());
    } else {
        println!("No snapshot files found in {}", cache_dir.display());
    }
    std::process::exit(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Only existing snapshots are counted; unrelated files survive
    fn clears_only_snapshot_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        snapshot::save(&dir.path().join("changelog.json"), &vec![1, 2, 3]).expect("seed");
        snapshot::save(&dir.path().join("engine_map.json"), &vec![4]).expect("seed");
        std::fs::write(dir.path().join("notes.txt"), "keep").expect("write");
        assert_eq!(clear_snapshots(dir.path()), 2);
        assert!(!dir.path().join("changelog.json").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert_eq!(clear_snapshots(dir.path()), 0);
    }
}
