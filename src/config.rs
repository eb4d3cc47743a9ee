use crate::covers::CoverTemplate;
use crate::http_client::HttpClientConfig;
use crate::metadata::CatalogSettings;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `server.public_base_url`
pub const PUBLIC_BASE_URL_ENV: &str = "PUBLIC_BASE_URL";
/// Environment variable overriding `upstream.api_base_url`
pub const API_BASE_URL_ENV: &str = "MANGADEX_API_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// First port tried when binding
    #[serde(default = "default_first_port")]
    pub first_port: u16,

    /// Last port tried when binding
    #[serde(default = "default_last_port")]
    pub last_port: u16,

    /// Address this service is reachable at, used to call itself
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// MangaDex API root
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Host serving cover images
    #[serde(default = "default_cover_host")]
    pub cover_host: String,

    /// Appended to every cover file name (thumbnail size selector)
    #[serde(default = "default_cover_size_suffix")]
    pub cover_size_suffix: String,

    /// Timeout for HTTP requests in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent sent upstream; crate name and version when empty
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Locale order used for every localized field
    #[serde(default = "default_locale_priority")]
    pub locale_priority: Vec<String>,

    /// Cover lookups in flight at once per search request
    #[serde(default = "default_search_concurrency")]
    pub search_concurrency: usize,

    #[serde(default = "default_search_limit")]
    pub default_search_limit: u32,

    #[serde(default = "default_max_search_limit")]
    pub max_search_limit: u32,

    /// Quiet period before an interactive search is sent
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_first_port() -> u16 { 8080 }
fn default_last_port() -> u16 { 8090 }
fn default_public_base_url() -> String { "http://localhost:8080".to_string() }
fn default_api_base_url() -> String { crate::sources::mangadex::BASE_URL.to_string() }
fn default_cover_host() -> String { CoverTemplate::default().host }
fn default_cover_size_suffix() -> String { CoverTemplate::default().size_suffix }
fn default_timeout() -> u64 { 30 }
fn default_locale_priority() -> Vec<String> {
    ["ja", "en", "ko", "zh"].iter().map(|l| l.to_string()).collect()
}
fn default_search_concurrency() -> usize { 10 }
fn default_search_limit() -> u32 { 20 }
fn default_max_search_limit() -> u32 { 50 }
fn default_debounce() -> u64 { 350 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            first_port: default_first_port(),
            last_port: default_last_port(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            cover_host: default_cover_host(),
            cover_size_suffix: default_cover_size_suffix(),
            timeout_secs: default_timeout(),
            user_agent: None,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            locale_priority: default_locale_priority(),
            search_concurrency: default_search_concurrency(),
            default_search_limit: default_search_limit(),
            max_search_limit: default_max_search_limit(),
            debounce_ms: default_debounce(),
        }
    }
}

impl Config {
    /// Read `config.toml` from the working directory, then apply environment
    /// overrides. A missing or invalid file yields the defaults.
    pub fn load() -> Self {
        let mut cfg = Self::load_file(Path::new("config.toml"));
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg
    }

    pub fn load_file(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Config>(content)
    }

    /// Apply overrides from `lookup` (the process environment in production)
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(PUBLIC_BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.public_base_url = url.trim().to_string();
        }
        if let Some(url) = lookup(API_BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.upstream.api_base_url = url.trim().to_string();
        }
    }

    pub fn catalog_settings(&self) -> CatalogSettings {
        CatalogSettings {
            locale_priority: self.catalog.locale_priority.clone(),
            covers: self.upstream.cover_template(),
            search_concurrency: self.catalog.search_concurrency,
            default_search_limit: self.catalog.default_search_limit,
            max_search_limit: self.catalog.max_search_limit,
        }
        .normalized()
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.catalog.debounce_ms)
    }
}

impl UpstreamConfig {
    pub fn cover_template(&self) -> CoverTemplate {
        CoverTemplate {
            host: self.cover_host.clone(),
            size_suffix: self.cover_size_suffix.clone(),
        }
    }

    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut config = HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            ..Default::default()
        };
        if let Some(agent) = self.user_agent.as_ref().filter(|a| !a.is_empty()) {
            config.user_agent = agent.clone();
        }
        config
    }

    /// Create the outbound HTTP client from this configuration
    pub fn create_http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        crate::http_client::build_client(&self.http_client_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.server.first_port, 8080);
        assert_eq!(cfg.upstream.api_base_url, "https://api.mangadex.org");
        assert_eq!(cfg.catalog.locale_priority, vec!["ja", "en", "ko", "zh"]);
        assert_eq!(cfg.catalog.search_concurrency, 10);
        assert_eq!(cfg.debounce(), Duration::from_millis(350));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            [catalog]
            locale_priority = ["en", "ja"]
            max_search_limit = 30

            [upstream]
            cover_size_suffix = ""
            "#,
        )
        .unwrap();
        assert_eq!(cfg.catalog.locale_priority, vec!["en", "ja"]);
        assert_eq!(cfg.catalog.max_search_limit, 30);
        assert_eq!(cfg.catalog.default_search_limit, 20);
        assert_eq!(cfg.upstream.cover_template().size_suffix, "");
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        assert!(Config::from_toml_str("[catalog]\nsearch_concurrency = \"many\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (PUBLIC_BASE_URL_ENV, "https://shelf.example"),
            (API_BASE_URL_ENV, "  "),
        ]
        .into_iter()
        .collect();
        let mut cfg = Config::default();
        cfg.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(cfg.server.public_base_url, "https://shelf.example");
        assert_eq!(cfg.upstream.api_base_url, "https://api.mangadex.org");
    }

    #[test]
    fn test_catalog_settings_clamp_zero() {
        let mut cfg = Config::default();
        cfg.catalog.search_concurrency = 0;
        let settings = cfg.catalog_settings();
        assert_eq!(settings.search_concurrency, 1);
        assert_eq!(settings.covers, CoverTemplate::default());
    }
}
