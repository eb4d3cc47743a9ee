// Library interface for manga_shelf
// The binary, the integration tests and the site client all build on these modules

pub mod app_state;
pub mod config;
pub mod covers;
pub mod http_client;
pub mod locale;
pub mod metadata;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod search_session;
pub mod site_client;
pub mod sources;
