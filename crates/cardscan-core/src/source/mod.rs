//! Image source adapters.
//!
//! A source is bound to its locator when constructed and then only lists and
//! fetches. The pipeline never knows which variant it holds.

mod drive;
mod local;

pub use drive::DriveSource;
pub use local::LocalSource;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::ImageItem;

/// Enumerates card images and fetches their bytes.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Short name for logs ("local", "drive").
    fn name(&self) -> &str;

    /// Every image in the bound location, in processing order.
    ///
    /// Failure here is fatal to the run.
    async fn list_items(&self) -> Result<Vec<ImageItem>, SourceError>;

    /// Raw bytes of one listed item. Failure costs only that item.
    async fn fetch(&self, item: &ImageItem) -> Result<Vec<u8>, SourceError>;
}
