//! Google Drive folder source.

use async_trait::async_trait;

use super::ImageSource;
use crate::error::SourceError;
use crate::google::DriveClient;
use crate::types::ImageItem;

/// Lists and downloads the images in one Drive folder.
pub struct DriveSource {
    client: DriveClient,
    folder_id: String,
    page_size: u32,
}

impl DriveSource {
    pub fn new(client: DriveClient, folder_id: impl Into<String>, page_size: u32) -> Self {
        Self {
            client,
            folder_id: folder_id.into(),
            page_size,
        }
    }
}

#[async_trait]
impl ImageSource for DriveSource {
    fn name(&self) -> &str {
        "drive"
    }

    async fn list_items(&self) -> Result<Vec<ImageItem>, SourceError> {
        let files = self
            .client
            .list_images(&self.folder_id, self.page_size)
            .await
            .map_err(|e| SourceError::Unavailable {
                locator: self.folder_id.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!("Drive folder {} lists {} images", self.folder_id, files.len());
        Ok(files
            .into_iter()
            .map(|f| ImageItem::new(f.id, f.name))
            .collect())
    }

    async fn fetch(&self, item: &ImageItem) -> Result<Vec<u8>, SourceError> {
        self.client
            .download(&item.id)
            .await
            .map_err(|e| SourceError::Fetch {
                item: item.name.clone(),
                message: e.to_string(),
            })
    }
}
