use super::{is_valid_manga_id, Include, MangaQuery, UpstreamApi, UpstreamError};
use crate::covers::CoverRecord;
use crate::locale::{deserialize_localized, deserialize_localized_list, LocalizedText};
use crate::metrics::{track_request, MetricsTracker};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

pub const BASE_URL: &str = "https://api.mangadex.org";

/// Covers fetched per work; enough for every volume of long series
const COVER_PAGE_LIMIT: u32 = 100;

#[derive(Deserialize)]
struct MangaList {
    #[serde(default)]
    data: Vec<MangaData>,
}

#[derive(Deserialize)]
struct MangaEntity {
    data: MangaData,
}

#[derive(Deserialize)]
struct CoverList {
    #[serde(default)]
    data: Vec<CoverData>,
}

#[derive(Deserialize)]
struct CoverData {
    #[serde(default)]
    attributes: CoverAttributes,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CoverAttributes {
    file_name: Option<String>,
    volume: Option<String>,
    locale: Option<String>,
}

impl From<CoverData> for CoverRecord {
    fn from(cover: CoverData) -> Self {
        CoverRecord {
            file_name: cover.attributes.file_name,
            volume: cover.attributes.volume,
            locale: cover.attributes.locale,
        }
    }
}

/// A manga record as returned by `/manga` and `/manga/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct MangaData {
    pub id: String,
    #[serde(default)]
    pub attributes: MangaAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MangaAttributes {
    #[serde(deserialize_with = "deserialize_localized")]
    pub title: LocalizedText,
    #[serde(deserialize_with = "deserialize_localized_list")]
    pub alt_titles: Vec<LocalizedText>,
    #[serde(deserialize_with = "deserialize_localized")]
    pub description: LocalizedText,
    pub status: Option<String>,
    pub year: Option<i32>,
    pub content_rating: Option<String>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub attributes: TagAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagAttributes {
    #[serde(default, deserialize_with = "deserialize_localized")]
    pub name: LocalizedText,
}

/// A related entity; `attributes` is only present when it was expanded
#[derive(Debug, Clone, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub rel_type: String,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

impl Relationship {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .as_ref()
            .and_then(|attrs| attrs.get(key))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

impl MangaData {
    /// File name of the expanded `cover_art` relationship, if any
    pub fn cover_file_name(&self) -> Option<&str> {
        self.relationships
            .iter()
            .filter(|r| r.rel_type == Include::CoverArt.as_str())
            .find_map(|r| r.attribute("fileName"))
    }

    /// Display names of expanded relationships of one type, in upstream order
    pub fn related_names(&self, include: Include) -> Vec<String> {
        self.relationships
            .iter()
            .filter(|r| r.rel_type == include.as_str())
            .filter_map(|r| r.attribute("name"))
            .map(str::to_string)
            .collect()
    }

    pub fn tag_names(&self) -> Vec<LocalizedText> {
        self.attributes
            .tags
            .iter()
            .map(|tag| tag.attributes.name.clone())
            .collect()
    }
}

/// `UpstreamApi` over the public MangaDex REST API
pub struct MangaDexClient {
    client: Client,
    base_url: String,
    metrics: Arc<MetricsTracker>,
}

impl MangaDexClient {
    pub fn new(client: Client, base_url: &str, metrics: Arc<MetricsTracker>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            metrics,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        track_request(&self.metrics, endpoint, UpstreamError::failure_kind, async {
            log::debug!("MangaDex request: {} {:?}", url, query);
            let response = self.client.get(&url).query(query).send().await?;
            match response.status() {
                StatusCode::NOT_FOUND => return Err(UpstreamError::NotFound),
                status if !status.is_success() => {
                    return Err(UpstreamError::Status(status.as_u16()))
                }
                _ => {}
            }
            let text = response.text().await?;
            Ok::<T, UpstreamError>(serde_json::from_str(&text)?)
        })
        .await
    }
}

#[async_trait]
impl UpstreamApi for MangaDexClient {
    async fn search_manga(&self, query: &MangaQuery) -> Result<Vec<MangaData>, UpstreamError> {
        let list: MangaList = self
            .get_json("manga.search", "/manga", &query.to_params())
            .await?;
        Ok(list.data)
    }

    async fn get_manga(&self, id: &str, includes: &[Include]) -> Result<MangaData, UpstreamError> {
        if !is_valid_manga_id(id) {
            return Err(UpstreamError::NotFound);
        }
        let params: Vec<(&str, String)> = includes
            .iter()
            .map(|include| ("includes[]", include.as_str().to_string()))
            .collect();
        let entity: MangaEntity = self
            .get_json("manga.detail", &format!("/manga/{}", id), &params)
            .await?;
        Ok(entity.data)
    }

    async fn list_covers(&self, manga_id: &str) -> Result<Vec<CoverRecord>, UpstreamError> {
        let params = [
            ("manga[]", manga_id.to_string()),
            ("limit", COVER_PAGE_LIMIT.to_string()),
            ("order[volume]", "asc".to_string()),
        ];
        let list: CoverList = self.get_json("cover.list", "/cover", &params).await?;
        Ok(list.data.into_iter().map(CoverRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_manga_with_relationships() {
        let value = json!({
            "id": "m1",
            "type": "manga",
            "attributes": {
                "title": {"en": "Frieren"},
                "altTitles": [{"ja": "葬送のフリーレン"}, {"ko": "장송의 프리렌"}],
                "description": [],
                "status": "ongoing",
                "year": 2020,
                "contentRating": "safe",
                "tags": [
                    {"id": "t1", "attributes": {"name": {"en": "Fantasy"}}},
                    {"id": "t2", "attributes": {"name": {}}}
                ]
            },
            "relationships": [
                {"id": "a1", "type": "author", "attributes": {"name": "Yamada Kanehito"}},
                {"id": "a2", "type": "artist", "attributes": {"name": "Abe Tsukasa"}},
                {"id": "a3", "type": "author"},
                {"id": "c1", "type": "cover_art", "attributes": {"fileName": "cover.jpg"}}
            ]
        });
        let manga: MangaData = serde_json::from_value(value).unwrap();

        assert_eq!(manga.attributes.title.get("en").map(String::as_str), Some("Frieren"));
        assert_eq!(manga.attributes.alt_titles.len(), 2);
        assert!(manga.attributes.description.is_empty());
        assert_eq!(manga.attributes.year, Some(2020));
        assert_eq!(manga.tag_names().len(), 2);
        assert_eq!(manga.cover_file_name(), Some("cover.jpg"));
        assert_eq!(manga.related_names(Include::Author), vec!["Yamada Kanehito"]);
        assert_eq!(manga.related_names(Include::Artist), vec!["Abe Tsukasa"]);
    }

    #[test]
    fn test_decode_sparse_manga() {
        let manga: MangaData =
            serde_json::from_value(json!({"id": "m2", "attributes": {"year": null}})).unwrap();
        assert!(manga.attributes.title.is_empty());
        assert!(manga.attributes.tags.is_empty());
        assert_eq!(manga.attributes.status, None);
        assert_eq!(manga.cover_file_name(), None);
    }

    #[test]
    fn test_decode_cover_list() {
        let list: CoverList = serde_json::from_value(json!({
            "result": "ok",
            "data": [
                {"id": "c1", "attributes": {"fileName": "a.jpg", "volume": "1", "locale": "ja"}},
                {"id": "c2", "attributes": {"fileName": "b.jpg", "volume": null, "locale": null}},
                {"id": "c3"}
            ]
        }))
        .unwrap();
        let covers: Vec<CoverRecord> = list.data.into_iter().map(CoverRecord::from).collect();
        assert_eq!(covers[0], CoverRecord::new("a.jpg", Some("1"), Some("ja")));
        assert_eq!(covers[1].volume, None);
        assert_eq!(covers[2], CoverRecord::default());
    }

    #[tokio::test]
    async fn test_malformed_id_never_leaves_the_client() {
        // nothing listens on the discard port; a request would surface as Request
        let client = MangaDexClient::new(
            Client::new(),
            "http://127.0.0.1:9",
            Arc::new(MetricsTracker::new()),
        );
        for id in ["abc?limit=1&x=", "../cover", "a/b", ""] {
            let result = client.get_manga(id, &[Include::CoverArt]).await;
            assert!(matches!(result, Err(UpstreamError::NotFound)), "{:?}", id);
        }
        assert!(client.metrics.get_all_metrics().is_empty());
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = MangaDexClient::new(
            Client::new(),
            "https://api.mangadex.org/",
            Arc::new(MetricsTracker::new()),
        );
        assert_eq!(client.base_url(), BASE_URL);
    }
}
