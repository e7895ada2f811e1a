//! Age-based eviction of generated illustrations

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Illustrations older than this are deleted by the sweep
pub const ARTIFACT_RETENTION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Deletes every `*.<extension>` file in `dir` last modified more than `max_age` ago
///
/// Unreadable entries and failed deletions are skipped. Returns the number of
/// files removed.
pub fn sweep_expired(dir: &Path, extension: &str, max_age: Duration) -> usize {
    let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
        return 0;
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|meta| meta.modified()) else {
            continue;
        };
        if modified < cutoff && fs::remove_file(&path).is_ok() {
            tracing::debug!(path = %path.display(), "evicted expired illustration");
            removed += 1;
        }
    }
    removed
}
