//! Tracer link 写操作端点
//!
//! - POST /jobs/{jobId}/rewrite - 改写简历中的外链
//! - PATCH /links/{id} - 启用 / 停用单条链接

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::config::TracerConfig;
use crate::errors::TracerError;
use crate::services::{JobDirectory, ReadinessChecker, TracerLinkService};
use crate::utils::request_origin;

use super::error_code::ErrorCode;
use super::helpers::{api_result, error_from_tracer, error_response, success_response};
use super::types::{RewriteDocumentResponse, UpdateTracerLinkRequest};

pub async fn rewrite_job_document(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<Value>,
    jobs: web::Data<Arc<dyn JobDirectory>>,
    checker: web::Data<Arc<ReadinessChecker>>,
    service: web::Data<Arc<TracerLinkService>>,
    settings: web::Data<Arc<TracerConfig>>,
) -> actix_web::Result<HttpResponse> {
    let job_id = path.into_inner();

    let job = match jobs.find_job(&job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::JobNotFound,
                &format!("Job not found: {}", job_id),
            ));
        }
        Err(e) => return Ok(error_from_tracer(&e)),
    };

    let origin = request_origin(&req, settings.trust_proxy);
    let Some(base_url) = checker.public_base_url(origin.as_deref()) else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::PublicBaseUrlMissing,
            "No public base URL: configure tracer.public_base_url",
        ));
    };

    let mut document = body.into_inner();
    match service.rewrite_document(&job, &mut document, &base_url).await {
        Ok(links) => Ok(success_response(RewriteDocumentResponse {
            job_id: job.id,
            public_base_url: base_url,
            document,
            links,
        })),
        Err(TracerError::Validation(msg)) => Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::PublicBaseUrlMissing,
            &msg,
        )),
        Err(e) => Ok(error_from_tracer(&e)),
    }
}

pub async fn update_tracer_link(
    path: web::Path<String>,
    body: web::Json<UpdateTracerLinkRequest>,
    service: web::Data<Arc<TracerLinkService>>,
) -> actix_web::Result<HttpResponse> {
    let link_id = path.into_inner();

    match service.set_active(&link_id, body.is_active).await {
        Err(TracerError::NotFound(msg)) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::TracerLinkNotFound,
            &msg,
        )),
        result => {
            if let Ok(link) = &result {
                info!("Tracer link {} set active={}", link.id, link.is_active);
            }
            Ok(api_result(result))
        }
    }
}
