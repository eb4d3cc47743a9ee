use actix_web::{web, App, HttpServer};
use log::{error, info};
use manga_shelf::app_state::AppState;
use manga_shelf::config::Config;
use manga_shelf::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = log4rs::init_file("log4rs.yml", Default::default()) {
        eprintln!("Logging not configured (log4rs.yml): {}", e);
    }

    let cfg = Config::load();
    info!("Upstream API: {}", cfg.upstream.api_base_url);
    info!("  Cover URLs: {}/covers/{{id}}/{{file}}{}", cfg.upstream.cover_host, cfg.upstream.cover_size_suffix);
    info!("  Locale priority: {:?}", cfg.catalog.locale_priority);
    info!("  Search concurrency: {}", cfg.catalog.search_concurrency);
    info!("  Public base URL: {}", cfg.server.public_base_url);

    let data = match AppState::from_config(cfg) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e));
        }
    };

    let server = data.config.server.clone();

    // Try each port in the configured range until one binds
    let mut last_err: Option<std::io::Error> = None;
    for port in server.first_port..=server.last_port {
        let data_clone = data.clone();
        let addr = format!("{}:{}", server.host, port);
        match HttpServer::new(move || {
            App::new()
                .app_data(data_clone.clone())
                .configure(routes::configure)
        })
        .bind(&addr)
        {
            Ok(bound) => {
                info!("Listening on {}", addr);
                return bound.run().await;
            }
            Err(e) => {
                last_err = Some(e);
                continue;
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            format!("No available ports {}-{}", server.first_port, server.last_port),
        )
    }))
}
