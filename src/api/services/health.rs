use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::trace;

/// Liveness endpoint; also the target other deployments probe for readiness
pub async fn health_check() -> impl Responder {
    trace!("Received health check request");
    HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-store"))
        .json(json!({ "status": "ok" }))
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(health_check))
        .route("", web::head().to(health_check))
}
