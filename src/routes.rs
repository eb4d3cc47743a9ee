use crate::app_state::AppState;
use crate::models::{SearchParams, SearchResponse};
use actix_web::{get, web, HttpResponse, Responder};
use log::error;
use serde_json::json;

/// Register every route on an `App`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search)
        .service(work_detail)
        .service(get_metrics)
        .service(get_metrics_summary);
}

/// Lenient limit parsing: anything that is not a non-negative integer means
/// "use the default"
fn parse_limit(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
}

#[get("/api/search")]
async fn search(data: web::Data<AppState>, query: web::Query<SearchParams>) -> impl Responder {
    let q = query.q.as_deref().unwrap_or_default();
    let limit = parse_limit(query.limit.as_deref());

    match data.catalog.search(q, limit).await {
        Ok(items) => HttpResponse::Ok().json(SearchResponse { items }),
        Err(e) => {
            error!("Search for {:?} failed: {}", q, e);
            HttpResponse::InternalServerError().json(json!({"error": "Search failed"}))
        }
    }
}

#[get("/api/works/{id}")]
async fn work_detail(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    match data.catalog.work_detail(&id).await {
        Ok(detail) => HttpResponse::Ok().json(detail),
        Err(e) if e.is_not_found() => {
            HttpResponse::NotFound().json(json!({"error": "Manga not found"}))
        }
        Err(e) => {
            error!("Failed to fetch manga {}: {}", id, e);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to fetch manga"}))
        }
    }
}

#[get("/metrics")]
async fn get_metrics(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.metrics.get_all_metrics())
}

#[get("/metrics/summary")]
async fn get_metrics_summary(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.metrics.summary())
}
