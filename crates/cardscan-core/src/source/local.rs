//! Local folder source.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::ImageSource;
use crate::error::SourceError;
use crate::types::ImageItem;

/// Reads card images from the top level of a directory.
pub struct LocalSource {
    dir: PathBuf,
    supported_formats: Vec<String>,
}

impl LocalSource {
    pub fn new(dir: impl Into<PathBuf>, supported_formats: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            supported_formats,
        }
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    fn unavailable(&self, message: impl Into<String>) -> SourceError {
        SourceError::Unavailable {
            locator: self.dir.display().to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl ImageSource for LocalSource {
    fn name(&self) -> &str {
        "local"
    }

    async fn list_items(&self) -> Result<Vec<ImageItem>, SourceError> {
        let dir = tokio::fs::canonicalize(&self.dir)
            .await
            .map_err(|e| self.unavailable(e.to_string()))?;
        let metadata = tokio::fs::metadata(&dir)
            .await
            .map_err(|e| self.unavailable(e.to_string()))?;
        if !metadata.is_dir() {
            return Err(self.unavailable("not a directory"));
        }

        let mut items = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {e}", dir.display());
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !self.is_supported(path) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            items.push(ImageItem::new(path.display().to_string(), name));
        }

        // Sort by name for deterministic ordering
        items.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!("Found {} images in {}", items.len(), dir.display());
        Ok(items)
    }

    async fn fetch(&self, item: &ImageItem) -> Result<Vec<u8>, SourceError> {
        tokio::fs::read(&item.id)
            .await
            .map_err(|e| SourceError::Fetch {
                item: item.name.clone(),
                message: e.to_string(),
            })
    }
}
