use serde::{Deserialize, Serialize};

use super::models::{Volume, VolumesPage};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VolumesResponse {
    #[serde(default)]
    pub items: Option<Vec<Volume>>,
    #[serde(default)]
    pub total_items: u32,
}

impl From<VolumesResponse> for VolumesPage {
    fn from(response: VolumesResponse) -> Self {
        VolumesPage {
            items: response.items.unwrap_or_default(),
            total_items: response.total_items,
        }
    }
}

/// Error envelope the API sends with non-2xx statuses
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}
