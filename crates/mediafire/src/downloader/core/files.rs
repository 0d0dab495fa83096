//! File operation utilities
//!
//! Destination paths come straight from host metadata, so every name is
//! checked to be a single plain path component before it is joined.

use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::downloader::core::{DownloadError, FileOperation, Result};

/// Return the name unchanged if it is safe to use as one path component
pub fn safe_component(name: &str) -> Option<&str> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains('\0') {
        return None;
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(name),
        _ => None,
    }
}

/// Join a remote file name onto the destination directory
pub fn destination_path(dir: &Path, filename: &str) -> Option<PathBuf> {
    safe_component(filename).map(|name| dir.join(name))
}

/// Create the destination directory if it does not exist yet
pub async fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).await.map_err(|e| DownloadError::FileSystem {
        path: dir.to_path_buf(),
        operation: FileOperation::CreateDir,
        source: e,
    })?;
    debug!("Destination directory ready: {}", dir.display());
    Ok(())
}

/// Create or truncate the output file for one transfer
pub async fn create_truncated(path: &Path) -> Result<fs::File> {
    fs::File::create(path).await.map_err(|e| DownloadError::FileSystem {
        path: path.to_path_buf(),
        operation: FileOperation::Create,
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_kept_verbatim() {
        assert_eq!(safe_component("a.txt"), Some("a.txt"));
        assert_eq!(safe_component("My File (1).bin"), Some("My File (1).bin"));
    }

    #[test]
    fn traversal_and_separators_are_rejected() {
        for name in ["", ".", "..", "../a", "a/b", "a\\b", "/etc/passwd"] {
            assert_eq!(safe_component(name), None, "{name:?} should be rejected");
        }
    }
}
