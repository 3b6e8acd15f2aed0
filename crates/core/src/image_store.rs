//! Local filesystem store for uploaded pereval images.
//!
//! Files are written under `<root>/perevals/<yyyy>/<mm>/<uuid>.<ext>` and
//! referenced from the database by that relative path.

use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Extension used when the uploaded file name carries none we can trust.
const FALLBACK_EXTENSION: &str = "bin";

/// Longest extension kept from the client-supplied file name.
const MAX_EXTENSION_LEN: usize = 5;

/// One uploaded image file as received from the multipart body.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the image to disk and return its path relative to the store root.
    pub async fn save(&self, image: &UploadedImage) -> Result<String, CoreError> {
        let now = chrono::Utc::now();
        let relative = format!(
            "perevals/{}/{}.{}",
            now.format("%Y/%m"),
            uuid::Uuid::new_v4(),
            file_extension(image.file_name.as_deref())
        );
        let full_path = self.root.join(&relative);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::Storage(e.to_string()))?;
        }
        tokio::fs::write(&full_path, &image.bytes)
            .await
            .map_err(|e| CoreError::Storage(e.to_string()))?;

        tracing::debug!(path = %relative, size = image.bytes.len(), "Stored image");
        Ok(relative)
    }

    /// Delete a previously stored image. A file that is already gone is not an error.
    pub async fn remove(&self, relative: &str) -> Result<(), CoreError> {
        if Path::new(relative)
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(CoreError::Storage(format!(
                "Refusing to remove path outside the store: {relative}"
            )));
        }

        match tokio::fs::remove_file(self.root.join(relative)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Storage(e.to_string())),
        }
    }
}

/// Lowercased alphanumeric extension of `file_name`, or [`FALLBACK_EXTENSION`].
fn file_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}
