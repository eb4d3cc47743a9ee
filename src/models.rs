use serde::{Deserialize, Serialize};

/// A work as listed in search results and related-work strips
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WorkSummary {
    pub id: String,
    pub title: String,
    pub cover: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VolumeEntry {
    pub volume: String,
    pub cover: Option<String>,
    pub locale: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeGallery {
    pub volumes: Vec<VolumeEntry>,
    pub total_volumes: usize,
    pub latest_volume: Option<String>,
}

impl VolumeGallery {
    pub fn from_volumes(volumes: Vec<VolumeEntry>) -> Self {
        Self {
            total_volumes: volumes.len(),
            latest_volume: volumes.last().map(|v| v.volume.clone()),
            volumes,
        }
    }
}

/// Author and artist display names
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Credits {
    pub authors: Vec<String>,
    pub artists: Vec<String>,
}

/// Everything the work detail page shows
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub year: Option<i32>,
    pub content_rating: String,
    pub tags: Vec<String>,
    pub cover: Option<String>,
    pub alt_titles: Vec<String>,
    pub total_volumes: usize,
    pub latest_volume: Option<String>,
    pub volumes: Vec<VolumeEntry>,
    pub authors: Vec<String>,
    pub artists: Vec<String>,
    pub related_works: Vec<WorkSummary>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SearchResponse {
    pub items: Vec<WorkSummary>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
}
