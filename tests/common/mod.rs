//! In-process stand-in for the MangaDex API used by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use manga_shelf::covers::CoverRecord;
use manga_shelf::metadata::{Catalog, CatalogSettings};
use manga_shelf::sources::mangadex::MangaData;
use manga_shelf::sources::{Include, MangaOrder, MangaQuery, UpstreamApi, UpstreamError};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct FakeUpstream {
    /// Records served by `get_manga`
    pub manga: HashMap<String, MangaData>,
    /// Ranked results for title searches
    pub search_results: Vec<MangaData>,
    /// Results for the followed-count and rating listings
    pub top_results: Vec<MangaData>,
    pub covers: HashMap<String, Vec<CoverRecord>>,
    pub cover_delays: HashMap<String, Duration>,
    pub failing_covers: HashSet<String>,
    /// Delay applied to every secondary call (covers and credits)
    pub secondary_delay: Option<Duration>,
    pub fail_credits: bool,
    pub fail_search: bool,
    pub fail_rating_list: bool,
    pub detail_status: Option<u16>,

    pub search_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub cover_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub queries: Mutex<Vec<MangaQuery>>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manga(mut self, manga: MangaData) -> Self {
        self.manga.insert(manga.id.clone(), manga);
        self
    }

    pub fn with_covers(mut self, manga_id: &str, covers: Vec<CoverRecord>) -> Self {
        self.covers.insert(manga_id.to_string(), covers);
        self
    }

    pub fn recorded_queries(&self) -> Vec<MangaQuery> {
        self.queries.lock().unwrap().clone()
    }

    async fn track<T>(&self, delay: Option<Duration>, result: T) -> T {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl UpstreamApi for FakeUpstream {
    async fn search_manga(&self, query: &MangaQuery) -> Result<Vec<MangaData>, UpstreamError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());
        match query.order {
            MangaOrder::Relevance if self.fail_search => Err(UpstreamError::Status(503)),
            MangaOrder::Relevance => Ok(self
                .search_results
                .iter()
                .take(query.limit as usize)
                .cloned()
                .collect()),
            MangaOrder::Rating if self.fail_rating_list => Err(UpstreamError::Status(500)),
            _ => Ok(self.top_results.clone()),
        }
    }

    async fn get_manga(&self, id: &str, includes: &[Include]) -> Result<MangaData, UpstreamError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let credits_only = !includes.contains(&Include::CoverArt);
        if credits_only {
            let result = if self.fail_credits {
                Err(UpstreamError::Status(500))
            } else {
                self.manga.get(id).cloned().ok_or(UpstreamError::NotFound)
            };
            return self.track(self.secondary_delay, result).await;
        }
        if let Some(status) = self.detail_status {
            return Err(UpstreamError::Status(status));
        }
        self.manga.get(id).cloned().ok_or(UpstreamError::NotFound)
    }

    async fn list_covers(&self, manga_id: &str) -> Result<Vec<CoverRecord>, UpstreamError> {
        self.cover_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self
            .cover_delays
            .get(manga_id)
            .copied()
            .or(self.secondary_delay);
        let result = if self.failing_covers.contains(manga_id) {
            Err(UpstreamError::Status(502))
        } else {
            Ok(self.covers.get(manga_id).cloned().unwrap_or_default())
        };
        self.track(delay, result).await
    }
}

/// Decode a manga record the way it arrives from upstream
pub fn manga(value: Value) -> MangaData {
    serde_json::from_value(value).expect("valid manga fixture")
}

/// Minimal listing entry with an English title and an embedded cover
pub fn listed(id: &str, title: &str) -> MangaData {
    manga(json!({
        "id": id,
        "attributes": {"title": {"en": title}},
        "relationships": [
            {"id": format!("cover-{}", id), "type": "cover_art", "attributes": {"fileName": format!("{}.jpg", id)}}
        ]
    }))
}

pub fn settings() -> CatalogSettings {
    CatalogSettings::default()
}

pub fn catalog(upstream: Arc<FakeUpstream>) -> Catalog {
    Catalog::new(upstream, settings())
}

pub fn cover_url(manga_id: &str, file: &str) -> String {
    settings().covers.url(manga_id, file)
}
