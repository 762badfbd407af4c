use serde::{Deserialize, Serialize};

/// A catalog entry returned by the volumes API
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Catalog-assigned id, unique within the catalog
    pub id: String,
    #[serde(default)]
    pub volume_info: VolumeInfo,
}

/// Display metadata for a volume
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    /// ISO 639-1 code as reported by the catalog
    pub language: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub image_links: Option<ImageLinks>,
    pub preview_link: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
    pub small_thumbnail: Option<String>,
}

impl Volume {
    /// Best available cover image
    pub fn thumbnail(&self) -> Option<&str> {
        self.volume_info.image_links.as_ref().and_then(|links| {
            links
                .thumbnail
                .as_deref()
                .or(links.small_thumbnail.as_deref())
        })
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VolumesPage {
    pub items: Vec<Volume>,
    /// Catalog's estimate of the total number of matches
    pub total_items: u32,
}

impl VolumesPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
