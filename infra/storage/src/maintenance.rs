use crate::{SNAPSHOT_DIR, TMP_MARKER};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

const STALE_AFTER: Duration = Duration::from_secs(300);

pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now, STALE_AFTER)).await {
        Ok((removed, failed)) if removed > 0 || failed > 0 => {
            info!(removed, failed, "Cleaned up temporary snapshot files");
        },
        Err(e) => {
            error!(error = %e, "Temp file cleanup task panicked");
        },
        _ => {},
    }
}

fn remove_stale(root: &Path, now: SystemTime, threshold: Duration) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .flatten()
        .filter(|e| e.path() != root)
        .for_each(|entry| {
            let path = entry.path();

            if entry.file_type().is_file() {
                if is_tmp(&entry) && is_stale(&entry, now, threshold) {
                    match std::fs::remove_file(path) {
                        Ok(()) => removed += 1,
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "Failed to remove temp file");
                            failed += 1;
                        },
                    }
                }
            } else if entry.file_type().is_dir() && path.parent() != Some(root) {
                // Empty shard directories only; non-empty ones refuse removal.
                let _ = std::fs::remove_dir(path);
            }
        });

    (removed, failed)
}

/// Ids of every snapshot under `<root>/characters`, sorted.
pub(crate) fn snapshot_ids(root: &Path) -> Vec<String> {
    let mut ids: Vec<String> = WalkDir::new(root.join(SNAPSHOT_DIR))
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_file() && !is_tmp(e))
        .filter_map(|e| {
            let path = e.path();
            if path.extension().and_then(|x| x.to_str()) != Some("json") {
                return None;
            }
            path.file_stem().and_then(|s| s.to_str()).map(str::to_owned)
        })
        .collect();
    ids.sort();
    ids
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.contains(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime, threshold: Duration) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn only_stale_temp_files_are_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let shard = tmp.path().join(SNAPSHOT_DIR).join("ab");
        fs::create_dir_all(&shard).unwrap();
        fs::write(shard.join(format!("abc.json{TMP_MARKER}1")), b"{").unwrap();
        fs::write(shard.join("abc.json"), b"{}").unwrap();

        let later = SystemTime::now() + Duration::from_secs(3_600);
        let (removed, failed) = remove_stale(tmp.path(), later, STALE_AFTER);

        assert_eq!((removed, failed), (1, 0));
        assert!(shard.join("abc.json").exists());
        assert_eq!(snapshot_ids(tmp.path()), ["abc"]);
    }

    #[test]
    fn fresh_temp_files_survive() {
        let tmp = tempfile::tempdir().unwrap();
        let shard = tmp.path().join(SNAPSHOT_DIR).join("ab");
        fs::create_dir_all(&shard).unwrap();
        fs::write(shard.join(format!("abc.json{TMP_MARKER}7")), b"{").unwrap();

        let (removed, _) = remove_stale(tmp.path(), SystemTime::now(), STALE_AFTER);
        assert_eq!(removed, 0);
        assert!(snapshot_ids(tmp.path()).is_empty());
    }
}
