use retro_core::RetroResult;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Snapshot file writer using write-to-temp-file then rename, so readers
/// (including file watchers in other processes) never see a partial board.
pub struct AtomicWriter;

impl AtomicWriter {
    pub async fn write_atomic(path: &Path, data: &[u8]) -> RetroResult<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).await?;

        // Temp file in the same directory keeps the rename on one filesystem.
        let temp_file = tempfile::Builder::new()
            .prefix(".retro-")
            .suffix(".tmp")
            .tempfile_in(parent)?;
        let temp_path = temp_file.path().to_path_buf();

        fs::write(&temp_path, data).await?;
        fs::rename(&temp_path, path).await?;

        tracing::debug!(
            "Atomically wrote {} bytes to {}",
            data.len(),
            path.display()
        );
        Ok(())
    }

    /// Read a whole file, `None` when it does not exist.
    pub async fn read_optional(path: &Path) -> RetroResult<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(data) => {
                tracing::debug!("Read {} bytes from {}", data.len(), path.display());
                Ok(Some(data))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_atomic_write_creates_parent() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("boards").join("board.json");

        AtomicWriter::write_atomic(&file_path, b"{}").await.unwrap();

        let read_data = AtomicWriter::read_optional(&file_path).await.unwrap();
        assert_eq!(read_data.as_deref(), Some(&b"{}"[..]));
    }

    #[tokio::test]
    async fn test_atomic_write_overwrites_without_leftovers() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("board.json");

        AtomicWriter::write_atomic(&file_path, b"First").await.unwrap();
        AtomicWriter::write_atomic(&file_path, b"Second").await.unwrap();

        let read_data = AtomicWriter::read_optional(&file_path).await.unwrap();
        assert_eq!(read_data.as_deref(), Some(&b"Second"[..]));
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let dir = tempdir().unwrap();
        let missing = AtomicWriter::read_optional(&dir.path().join("nope.json"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
