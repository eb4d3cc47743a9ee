//! Debounced, cancellable search for an interactive search box
//!
//! Every submitted query runs in its own task that first waits out the
//! debounce delay. Submitting again aborts the previous task, so a query
//! replaced inside the delay never reaches the backend and one replaced
//! mid-request is dropped at its next await point.

use crate::config::Config;
use crate::models::WorkSummary;
use crate::site_client::SiteError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};

/// Result count requested by the search box
pub const SESSION_RESULT_LIMIT: u32 = 24;

/// Where a session sends its queries
#[async_trait]
pub trait SearchBackend: Send + Sync + 'static {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<WorkSummary>, SiteError>;
}

/// Outcome of one submission; awaiting a superseded one yields a cancelled
/// `JoinError`.
pub type PendingSearch = JoinHandle<Result<Vec<WorkSummary>, SiteError>>;

pub struct SearchSession<B: SearchBackend> {
    backend: Arc<B>,
    debounce: Duration,
    limit: u32,
    current: Option<AbortHandle>,
}

impl<B: SearchBackend> SearchSession<B> {
    pub fn new(backend: Arc<B>, debounce: Duration) -> Self {
        Self {
            backend,
            debounce,
            limit: SESSION_RESULT_LIMIT,
            current: None,
        }
    }

    /// Session using the configured debounce delay (`catalog.debounce_ms`)
    pub fn from_config(backend: Arc<B>, config: &Config) -> Self {
        Self::new(backend, config.debounce())
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Submit the current input. Must be called from within a tokio runtime.
    pub fn submit(&mut self, input: &str) -> PendingSearch {
        self.cancel();

        let query = input.trim().to_string();
        if query.is_empty() {
            return tokio::spawn(async { Ok(Vec::new()) });
        }

        let backend = Arc::clone(&self.backend);
        let debounce = self.debounce;
        let limit = self.limit;
        let pending = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            log::debug!("Search session sending {:?}", query);
            backend.search(&query, limit).await
        });
        self.current = Some(pending.abort_handle());
        pending
    }

    /// Abort the in-flight query, if any
    pub fn cancel(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.abort();
        }
    }
}

impl<B: SearchBackend> Drop for SearchSession<B> {
    fn drop(&mut self) {
        self.cancel();
    }
}
