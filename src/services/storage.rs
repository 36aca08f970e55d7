use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use uuid::Uuid;

/// URL prefix under which the output directory is served
pub const COMPRESSED_URL_PREFIX: &str = "/uploads/compressed";

/// Filesystem layout: a staging area for raw uploads and an output area for
/// compressed artifacts.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    staging_dir: PathBuf,
    output_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(staging_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create both directories (and any missing parents).
    pub async fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.staging_dir).await?;
        fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }

    /// Staging path for an upload: `<staging>/<id>.<ext>`
    pub fn staging_path(&self, id: &Uuid, ext: &str) -> PathBuf {
        self.staging_dir.join(format!("{}.{}", id, ext))
    }

    /// Create a fresh staging file. Fails if the name is already taken.
    pub async fn create_staging_file(&self, id: &Uuid, ext: &str) -> io::Result<(PathBuf, File)> {
        let path = self.staging_path(id, ext);
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        Ok((path, file))
    }

    /// Public URL for a file inside the output directory
    pub fn public_url(&self, output: &Path) -> Option<String> {
        let name = output.file_name()?.to_str()?;
        Some(format!("{}/{}", COMPRESSED_URL_PREFIX, name))
    }

    /// Whether both directories are present on disk
    pub async fn is_ready(&self) -> (bool, bool) {
        let staging = fs::metadata(&self.staging_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        let output = fs::metadata(&self.output_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        (staging, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_ensure_dirs_creates_nested_layout() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(root.path().join("up"), root.path().join("up/out"));

        assert_eq!(storage.is_ready().await, (false, false));
        storage.ensure_dirs().await.unwrap();
        assert_eq!(storage.is_ready().await, (true, true));

        // Idempotent
        storage.ensure_dirs().await.unwrap();
    }

    #[tokio::test]
    async fn test_staging_file_is_exclusive() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(root.path().join("up"), root.path().join("out"));
        storage.ensure_dirs().await.unwrap();

        let id = Uuid::new_v4();
        let (path, mut file) = storage.create_staging_file(&id, "png").await.unwrap();
        file.write_all(b"data").await.unwrap();
        file.flush().await.unwrap();

        assert_eq!(path, storage.staging_dir().join(format!("{}.png", id)));
        assert!(storage.create_staging_file(&id, "png").await.is_err());
    }

    #[test]
    fn test_public_url() {
        let storage = LocalStorage::new("./uploads", "./uploads/compressed");
        let url = storage.public_url(Path::new("./uploads/compressed/abc.jpg"));
        assert_eq!(url.as_deref(), Some("/uploads/compressed/abc.jpg"));
        assert_eq!(storage.public_url(Path::new("/")), None);
    }
}
