// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for exported photos

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Create `dir` if needed and return it
pub fn ensure_dir(dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    debug!(path = %dir.display(), "Photo directory ready");
    Ok(dir.to_path_buf())
}

/// Write `data` to `dir/file_name` without blocking the runtime
///
/// An existing file of the same name is replaced; photo ids are unique, so
/// that only happens when the same photo is exported twice.
pub async fn save_bytes(
    dir: PathBuf,
    file_name: String,
    data: Vec<u8>,
) -> std::io::Result<PathBuf> {
    tokio::task::spawn_blocking(move || {
        ensure_dir(&dir)?;
        let path = dir.join(file_name);
        std::fs::write(&path, &data)?;
        info!(path = %path.display(), size = data.len(), "Photo saved");
        Ok(path)
    })
    .await
    .map_err(std::io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_creates_directory() {
        let dir = std::env::temp_dir()
            .join(format!("retrocam-storage-{}", uuid::Uuid::new_v4()))
            .join("nested");
        let path = save_bytes(dir.clone(), "a.jpg".into(), vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(path, dir.join("a.jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        std::fs::remove_dir_all(dir.parent().unwrap()).unwrap();
    }
}
