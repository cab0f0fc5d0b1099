//! Tracer link API 路由 `/api/tracer-links`
//!
//! 包含：
//! - GET /analytics
//! - GET /readiness
//! - POST /jobs/{jobId}/rewrite
//! - GET /jobs/{jobId}/analytics
//! - PATCH /links/{id}

use actix_web::web;

use super::analytics::{get_analytics_overview, get_job_analytics};
use super::links::{rewrite_job_document, update_tracer_link};
use super::readiness::get_readiness;

pub const TRACER_API_PREFIX: &str = "/api/tracer-links";

pub fn tracer_api_routes() -> actix_web::Scope {
    web::scope(TRACER_API_PREFIX)
        .route("/analytics", web::get().to(get_analytics_overview))
        .route("/readiness", web::get().to(get_readiness))
        .route("/jobs/{job_id}/rewrite", web::post().to(rewrite_job_document))
        .route("/jobs/{job_id}/analytics", web::get().to(get_job_analytics))
        .route("/links/{id}", web::patch().to(update_tracer_link))
}
