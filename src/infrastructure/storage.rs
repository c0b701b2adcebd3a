use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

/// Ensure the uploads directory exists and return its path.
pub fn ensure_uploads_dir(root: &Path) -> std::io::Result<PathBuf> {
    ensure_dir(root)?;
    Ok(root.to_path_buf())
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// A temporary uploaded file, removed when the guard drops.
///
/// Ingestion may fail at any stage; tying cleanup to Drop guarantees no
/// orphaned files survive either the success or the failure path.
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// Reserve a unique path for an incoming upload, keeping the original
    /// extension so the parser can dispatch on it.
    pub fn reserve(uploads_dir: &Path, original_filename: &str) -> Self {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let path = uploads_dir.join(format!("{}.{}", Uuid::new_v4(), extension));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(err) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %err, "Failed to remove temp upload");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_upload_removed_on_drop() {
        let dir = std::env::temp_dir();
        let upload = TempUpload::reserve(&dir, "report.csv");
        let path = upload.path().to_path_buf();

        fs::write(&path, b"a,b\n1,2\n").unwrap();
        assert!(path.exists());

        drop(upload);
        assert!(!path.exists());
    }

    #[test]
    fn test_reserve_keeps_extension() {
        let upload = TempUpload::reserve(Path::new("/tmp"), "Sheet Final.XLSX");
        assert!(upload.path().to_string_lossy().ends_with(".XLSX"));
    }
}
