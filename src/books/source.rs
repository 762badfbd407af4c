use async_trait::async_trait;

use crate::books::models::VolumesPage;
use crate::books::query::VolumeQuery;
use crate::error::Result;

/// Anything that can answer a [`VolumeQuery`] with a page of volumes
///
/// [`BooksClient`](crate::BooksClient) is the production implementation.
/// The search controller only depends on this trait.
#[async_trait]
pub trait VolumeSource: Send + Sync {
    async fn search(&self, query: &VolumeQuery) -> Result<VolumesPage>;
}
