//! Metrics for upstream MangaDex calls
//!
//! Tracks success rates, error counts, and response times per upstream endpoint

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

/// Broad category of a failed upstream call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    RateLimited,
    Timeout,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointMetrics {
    pub endpoint: String,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub average_response_time_ms: f64,
    pub total_response_time_ms: u64,
    pub not_found_count: u64,
    pub rate_limit_hits: u64,
    pub timeout_count: u64,
}

impl EndpointMetrics {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            last_success: None,
            last_failure: None,
            last_error: None,
            average_response_time_ms: 0.0,
            total_response_time_ms: 0,
            not_found_count: 0,
            rate_limit_hits: 0,
            timeout_count: 0,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.successful_requests as f64 / self.total_requests as f64) * 100.0
        }
    }

    pub fn record_success(&mut self, response_time: Duration) {
        self.total_requests += 1;
        self.successful_requests += 1;
        self.last_success = Some(Utc::now());

        let response_ms = response_time.as_millis() as u64;
        self.total_response_time_ms += response_ms;
        self.average_response_time_ms =
            self.total_response_time_ms as f64 / self.successful_requests as f64;
    }

    pub fn record_failure(&mut self, error: String, kind: FailureKind) {
        self.total_requests += 1;
        self.failed_requests += 1;
        self.last_failure = Some(Utc::now());
        self.last_error = Some(error);

        match kind {
            FailureKind::NotFound => self.not_found_count += 1,
            FailureKind::RateLimited => self.rate_limit_hits += 1,
            FailureKind::Timeout => self.timeout_count += 1,
            FailureKind::Other => {}
        }
    }
}

/// Totals across all endpoints, served on `/metrics/summary`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricsSummary {
    pub endpoints: usize,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub success_rate: f64,
}

/// Shared tracker; the only state that outlives a request
#[derive(Debug, Default)]
pub struct MetricsTracker {
    metrics: Mutex<HashMap<String, EndpointMetrics>>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, EndpointMetrics>> {
        // counters stay meaningful even if a holder panicked
        self.metrics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_success(&self, endpoint: &str, response_time: Duration) {
        let mut metrics = self.lock();
        let endpoint_metrics = metrics
            .entry(endpoint.to_string())
            .or_insert_with(|| EndpointMetrics::new(endpoint.to_string()));
        endpoint_metrics.record_success(response_time);

        log::debug!(
            "[{}] Success - Response time: {}ms - Success rate: {:.2}%",
            endpoint,
            response_time.as_millis(),
            endpoint_metrics.success_rate()
        );
    }

    pub fn record_failure(&self, endpoint: &str, error: String, kind: FailureKind) {
        let mut metrics = self.lock();
        let endpoint_metrics = metrics
            .entry(endpoint.to_string())
            .or_insert_with(|| EndpointMetrics::new(endpoint.to_string()));
        endpoint_metrics.record_failure(error.clone(), kind);

        log::warn!(
            "[{}] Failure - Error: {} - Success rate: {:.2}%",
            endpoint,
            error,
            endpoint_metrics.success_rate()
        );
    }

    pub fn get_metrics(&self, endpoint: &str) -> Option<EndpointMetrics> {
        self.lock().get(endpoint).cloned()
    }

    /// All endpoints, sorted by name
    pub fn get_all_metrics(&self) -> Vec<EndpointMetrics> {
        let mut all: Vec<EndpointMetrics> = self.lock().values().cloned().collect();
        all.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
        all
    }

    pub fn summary(&self) -> MetricsSummary {
        let metrics = self.lock();
        let mut summary = MetricsSummary {
            endpoints: metrics.len(),
            ..Default::default()
        };
        for m in metrics.values() {
            summary.total_requests += m.total_requests;
            summary.successful_requests += m.successful_requests;
            summary.failed_requests += m.failed_requests;
        }
        if summary.total_requests > 0 {
            summary.success_rate =
                summary.successful_requests as f64 / summary.total_requests as f64 * 100.0;
        }
        summary
    }
}

/// Time an upstream call and record its outcome under `endpoint`
pub async fn track_request<F, T, E>(
    tracker: &MetricsTracker,
    endpoint: &str,
    classify: impl Fn(&E) -> FailureKind,
    operation: F,
) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let start = Instant::now();
    let result = operation.await;
    let duration = start.elapsed();

    match &result {
        Ok(_) => tracker.record_success(endpoint, duration),
        Err(e) => tracker.record_failure(endpoint, e.to_string(), classify(e)),
    }

    result
}
