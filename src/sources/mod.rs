//! Upstream metadata sources
//!
//! [`UpstreamApi`] is the seam between the catalog handlers and the network.
//! The production implementation is [`mangadex::MangaDexClient`]; tests plug
//! in their own.

pub mod mangadex;

use crate::covers::CoverRecord;
use crate::metrics::FailureKind;
use async_trait::async_trait;
use mangadex::MangaData;

/// Why an upstream lookup failed
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Resource not found upstream")]
    NotFound,

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl UpstreamError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::NotFound)
    }

    pub fn failure_kind(&self) -> FailureKind {
        match self {
            UpstreamError::NotFound => FailureKind::NotFound,
            UpstreamError::Status(429) => FailureKind::RateLimited,
            UpstreamError::Request(e) if e.is_timeout() => FailureKind::Timeout,
            _ => FailureKind::Other,
        }
    }
}

/// Related entities that can be expanded inline on a manga record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Include {
    CoverArt,
    Author,
    Artist,
}

impl Include {
    pub fn as_str(&self) -> &'static str {
        match self {
            Include::CoverArt => "cover_art",
            Include::Author => "author",
            Include::Artist => "artist",
        }
    }
}

/// Ordering requested from the manga listing endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MangaOrder {
    Relevance,
    FollowedCount,
    Rating,
}

impl MangaOrder {
    pub fn param(&self) -> &'static str {
        match self {
            MangaOrder::Relevance => "order[relevance]",
            MangaOrder::FollowedCount => "order[followedCount]",
            MangaOrder::Rating => "order[rating]",
        }
    }
}

/// Parameters for `GET /manga`. Cover art is always expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MangaQuery {
    pub title: Option<String>,
    pub limit: u32,
    pub order: MangaOrder,
}

impl MangaQuery {
    pub fn by_title(title: &str, limit: u32) -> Self {
        Self {
            title: Some(title.to_string()),
            limit,
            order: MangaOrder::Relevance,
        }
    }

    pub fn top(order: MangaOrder, limit: u32) -> Self {
        Self {
            title: None,
            limit,
            order,
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(title) = &self.title {
            params.push(("title", title.clone()));
        }
        params.push(("limit", self.limit.to_string()));
        params.push(("includes[]", Include::CoverArt.as_str().to_string()));
        params.push((self.order.param(), "desc".to_string()));
        params
    }
}

/// Whether `id` can name a work. MangaDex ids are UUIDs and end up as a URL
/// path segment, so only ASCII alphanumerics and `-` are accepted.
pub fn is_valid_manga_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

const MAX_ID_LEN: usize = 64;

/// Read-only view of the upstream metadata service
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// Ranked manga listing; ranking is left to the upstream service
    async fn search_manga(&self, query: &MangaQuery) -> Result<Vec<MangaData>, UpstreamError>;

    /// One manga with the requested relationships expanded
    async fn get_manga(&self, id: &str, includes: &[Include]) -> Result<MangaData, UpstreamError>;

    /// Cover records for a manga, ascending by volume
    async fn list_covers(&self, manga_id: &str) -> Result<Vec<CoverRecord>, UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_query_params() {
        let params = MangaQuery::by_title("frieren", 20).to_params();
        assert_eq!(
            params,
            vec![
                ("title", "frieren".to_string()),
                ("limit", "20".to_string()),
                ("includes[]", "cover_art".to_string()),
                ("order[relevance]", "desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_top_query_has_no_title() {
        let params = MangaQuery::top(MangaOrder::FollowedCount, 20).to_params();
        assert!(params.iter().all(|(k, _)| *k != "title"));
        assert!(params.contains(&("order[followedCount]", "desc".to_string())));
    }

    #[test]
    fn test_manga_id_validation() {
        assert!(is_valid_manga_id("a1b2c3d4-0000-4000-8000-123456789abc"));
        assert!(is_valid_manga_id("frieren"));
        assert!(!is_valid_manga_id(""));
        assert!(!is_valid_manga_id("abc?limit=1&x="));
        assert!(!is_valid_manga_id("../cover"));
        assert!(!is_valid_manga_id("a/b"));
        assert!(!is_valid_manga_id("abc%3F"));
        assert!(!is_valid_manga_id(&"a".repeat(65)));
    }

    #[test]
    fn test_failure_kind() {
        assert_eq!(UpstreamError::NotFound.failure_kind(), FailureKind::NotFound);
        assert_eq!(UpstreamError::Status(429).failure_kind(), FailureKind::RateLimited);
        assert_eq!(UpstreamError::Status(500).failure_kind(), FailureKind::Other);
        assert!(UpstreamError::NotFound.is_not_found());
    }
}
