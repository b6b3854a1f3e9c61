use crate::error::StorageError;
use std::path::{Path, PathBuf};

const MAX_ID_LEN: usize = 64;

/// Character ids become file names, so only `[A-Za-z0-9_-]` is accepted.
pub(crate) fn validate_id(id: &str) -> Result<(), StorageError> {
    if id.is_empty() || id.len() > MAX_ID_LEN {
        return Err(StorageError::InvalidId {
            message: format!("length must be 1..={MAX_ID_LEN}, got {}", id.len()).into(),
            context: None,
        });
    }

    if let Some(bad) = id.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-')) {
        return Err(StorageError::InvalidId {
            message: id.to_owned().into(),
            context: Some(format!("illegal character {bad:?}").into()),
        });
    }

    Ok(())
}

/// `<root>/characters/<first two chars>/<id>.json`.
pub(crate) fn snapshot_path(root: &Path, id: &str) -> Result<PathBuf, StorageError> {
    validate_id(id)?;

    let shard: String = id.chars().take(2).collect::<String>().to_ascii_lowercase();
    let path = root.join(crate::SNAPSHOT_DIR).join(shard).join(format!("{id}.json"));

    ensure_within(root, &path)?;
    Ok(path)
}

/// Verifies that the first existing ancestor of `path` resolves inside `root`.
///
/// Catches shard directories replaced by symlinks pointing out of the sandbox.
pub(crate) fn ensure_within(root: &Path, path: &Path) -> Result<(), StorageError> {
    if !path.starts_with(root) {
        return Err(StorageError::PathTraversalAttempt {
            message: path.display().to_string().into(),
            context: Some("Path is outside sandbox boundaries".into()),
        });
    }

    let mut current = Some(path);
    while let Some(candidate) = current {
        if candidate == root {
            return Ok(());
        }
        if candidate.exists() {
            return match candidate.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(()),
                Ok(canonical) => Err(StorageError::PathTraversalAttempt {
                    message: canonical.display().to_string().into(),
                    context: Some("Existing parent directory is a symlink outside sandbox".into()),
                }),
                Err(e) => Err(StorageError::Io {
                    source: e,
                    context: Some("Failed to verify parent directory".into()),
                }),
            };
        }
        current = candidate.parent();
    }

    Err(StorageError::PathTraversalAttempt {
        message: path.display().to_string().into(),
        context: Some("No valid parent directory found within sandbox".into()),
    })
}
