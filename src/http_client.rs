use reqwest::{Client, ClientBuilder};
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = concat!("manga-shelf/", env!("CARGO_PKG_VERSION"));

/// Settings for the outbound HTTP client shared by all upstream calls
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub enable_gzip: bool,
    pub pool_idle_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            enable_gzip: true,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Build the client. Requests are never retried; the timeout is the only
/// bound on a slow upstream.
pub fn build_client(config: &HttpClientConfig) -> Result<Client, reqwest::Error> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    ClientBuilder::new()
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .gzip(config.enable_gzip)
        .brotli(config.enable_gzip)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .pool_idle_timeout(Some(config.pool_idle_timeout))
        .default_headers(headers)
        .build()
}
