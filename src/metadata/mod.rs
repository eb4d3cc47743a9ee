//! Catalog handlers
//!
//! [`Catalog`] turns upstream records into the display records served by the
//! HTTP routes. Work detail aggregation lives in [`aggregate`], free-text
//! search in [`search`], and the "related works" strip in [`related`].
//!
//! Primary lookups propagate [`UpstreamError`]; every secondary lookup
//! (covers, gallery, credits, related works, per-candidate covers) logs the
//! failure and falls back to an empty value instead.

pub mod aggregate;
pub mod related;
pub mod search;

use crate::covers::{build_volume_gallery, pick_best_cover, CoverTemplate};
use crate::locale::{resolve_title, UNTITLED};
use crate::models::{VolumeGallery, WorkSummary};
use crate::sources::mangadex::MangaData;
use crate::sources::{UpstreamApi, UpstreamError};
use std::sync::Arc;

/// Normalization settings shared by every handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub locale_priority: Vec<String>,
    pub covers: CoverTemplate,
    pub search_concurrency: usize,
    pub default_search_limit: u32,
    pub max_search_limit: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        crate::config::Config::default().catalog_settings()
    }
}

impl CatalogSettings {
    pub fn priority(&self) -> &[String] {
        self.locale_priority.as_slice()
    }

    /// Settings that cannot stall or panic a handler: at least one cover
    /// lookup at a time, and `1 <= default <= max` for search limits
    pub fn normalized(mut self) -> Self {
        self.search_concurrency = self.search_concurrency.max(1);
        self.max_search_limit = self.max_search_limit.max(1);
        self.default_search_limit = self.default_search_limit.clamp(1, self.max_search_limit);
        self
    }

    /// Requested result count, defaulted and clamped to `1..=max_search_limit`
    pub fn clamp_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_search_limit)
            .clamp(1, self.max_search_limit)
    }
}

/// Request handlers over an upstream source. Cheap to clone.
#[derive(Clone)]
pub struct Catalog {
    upstream: Arc<dyn UpstreamApi>,
    settings: Arc<CatalogSettings>,
}

impl Catalog {
    pub fn new(upstream: Arc<dyn UpstreamApi>, settings: CatalogSettings) -> Self {
        Self {
            upstream,
            settings: Arc::new(settings.normalized()),
        }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// Best cover for a work, or `None` when unavailable or the lookup failed
    pub async fn best_cover(&self, manga_id: &str) -> Option<String> {
        match self.upstream.list_covers(manga_id).await {
            Ok(covers) => pick_best_cover(&covers, manga_id, &self.settings.covers),
            Err(e) => {
                log::warn!("Cover lookup failed for {}: {}", manga_id, e);
                None
            }
        }
    }

    /// Volume gallery for a work; empty when the lookup failed
    pub async fn volume_gallery(&self, manga_id: &str) -> VolumeGallery {
        match self.upstream.list_covers(manga_id).await {
            Ok(covers) => build_volume_gallery(&covers, manga_id, &self.settings.covers),
            Err(e) => {
                log::warn!("Volume lookup failed for {}: {}", manga_id, e);
                VolumeGallery::default()
            }
        }
    }

    fn display_title(&self, manga: &MangaData) -> String {
        resolve_title(
            &manga.attributes.title,
            &manga.attributes.alt_titles,
            self.settings.priority(),
            UNTITLED,
        )
    }

    /// Summary using the cover embedded in a listing (no extra lookup)
    fn summary_from_listing(&self, manga: &MangaData) -> WorkSummary {
        WorkSummary {
            id: manga.id.clone(),
            title: self.display_title(manga),
            cover: manga
                .cover_file_name()
                .map(|file| self.settings.covers.url(&manga.id, file)),
        }
    }

    fn upstream(&self) -> &dyn UpstreamApi {
        self.upstream.as_ref()
    }
}

/// Result type of the primary lookups
pub type CatalogResult<T> = Result<T, UpstreamError>;
