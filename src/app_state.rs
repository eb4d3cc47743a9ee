//! Application state for the Actix-web server
//!
//! `AppState` is wrapped in `web::Data` and shared by every handler. Apart
//! from the metrics tracker it holds nothing mutable; each request builds
//! its records from scratch.

use crate::config::Config;
use crate::metadata::Catalog;
use crate::metrics::MetricsTracker;
use crate::sources::mangadex::MangaDexClient;
use std::sync::Arc;

pub struct AppState {
    /// Search and detail handlers
    pub catalog: Catalog,
    /// Per-endpoint upstream metrics
    pub metrics: Arc<MetricsTracker>,
    /// Application configuration
    pub config: Config,
}

impl AppState {
    pub fn new(catalog: Catalog, metrics: Arc<MetricsTracker>, config: Config) -> Self {
        Self {
            catalog,
            metrics,
            config,
        }
    }

    /// Wire the MangaDex client, metrics and catalog from `config`
    pub fn from_config(config: Config) -> Result<Self, reqwest::Error> {
        let metrics = Arc::new(MetricsTracker::new());
        let client = config.upstream.create_http_client()?;
        let upstream = MangaDexClient::new(client, &config.upstream.api_base_url, metrics.clone());
        let catalog = Catalog::new(Arc::new(upstream), config.catalog_settings());
        Ok(Self::new(catalog, metrics, config))
    }
}
