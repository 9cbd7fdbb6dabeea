use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{MeasureError, PersistError};
use crate::image::{decode_base64, image_dimensions};

/// The filesystem as seen by the export pipeline
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Decode base64 `data` and write it to `path`, replacing any existing file
    async fn write_base64(&self, path: &Path, data: &str) -> Result<(), PersistError>;

    /// Pixel width and height of the image stored at `path`
    async fn image_dimensions(&self, path: &Path) -> Result<(u32, u32), MeasureError>;
}

/// Local disk store. Parent directories are created on first write.
#[derive(Clone, Debug, Default)]
pub struct DiskStore;

#[async_trait]
impl ImageStore for DiskStore {
    async fn write_base64(&self, path: &Path, data: &str) -> Result<(), PersistError> {
        let bytes = decode_base64(data)?;
        let io_err = |source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(path, &bytes).await.map_err(io_err)?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "image persisted");
        Ok(())
    }

    async fn image_dimensions(&self, path: &Path) -> Result<(u32, u32), MeasureError> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || image_dimensions(path)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::to_data_uri;
    use base64::Engine as _;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        image::RgbaImage::new(width, height)
            .write_to(&mut out, image::ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn writes_and_measures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jokeXP.png");
        let payload = base64::engine::general_purpose::STANDARD.encode(png_bytes(12, 7));

        let store = DiskStore;
        store.write_base64(&path, &payload).await.unwrap();
        assert_eq!(store.image_dimensions(&path).await.unwrap(), (12, 7));
    }

    #[tokio::test]
    async fn overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jokeXP.png");
        let store = DiskStore;

        for (w, h) in [(3, 3), (5, 1)] {
            let uri = to_data_uri("image/png", &png_bytes(w, h));
            let payload = uri.split_once(',').unwrap().1;
            store.write_base64(&path, payload).await.unwrap();
        }
        assert_eq!(store.image_dimensions(&path).await.unwrap(), (5, 1));
    }

    #[tokio::test]
    async fn bad_payload_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jokeXP.png");

        let err = DiskStore.write_base64(&path, "%%%").await.unwrap_err();
        assert!(matches!(err, PersistError::Decode(_)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn measures_files_without_a_png_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blague");
        let payload = base64::engine::general_purpose::STANDARD.encode(png_bytes(20, 10));

        DiskStore.write_base64(&path, &payload).await.unwrap();
        assert_eq!(DiskStore.image_dimensions(&path).await.unwrap(), (20, 10));
    }

    #[tokio::test]
    async fn measuring_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jokeXP.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(DiskStore.image_dimensions(&path).await.is_err());
    }
}
