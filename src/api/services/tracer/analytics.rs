//! Analytics API 端点
//!
//! - GET /analytics - totals、按日趋势、热门职位、热门链接
//! - GET /jobs/{jobId}/analytics - 单个职位的汇总与每条链接的明细

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use std::sync::Arc;
use tracing::debug;

use crate::errors::TracerError;
use crate::services::{AnalyticsQuery, AnalyticsService};

use super::error_code::ErrorCode;
use super::helpers::{api_result, error_from_tracer, error_response};

pub async fn get_analytics_overview(
    query: web::Query<AnalyticsQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> actix_web::Result<HttpResponse> {
    let filter = match query.into_inner().into_filter() {
        Ok(filter) => filter,
        Err(e) => return Ok(invalid_filter(&e)),
    };
    debug!("Analytics overview requested: {:?}", filter);

    Ok(api_result(service.overview(&filter).await))
}

pub async fn get_job_analytics(
    path: web::Path<String>,
    query: web::Query<AnalyticsQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> actix_web::Result<HttpResponse> {
    let job_id = path.into_inner();
    let filter = match query.into_inner().into_filter() {
        Ok(filter) => filter,
        Err(e) => return Ok(invalid_filter(&e)),
    };

    match service.job_analytics(&job_id, &filter).await {
        Err(TracerError::NotFound(msg)) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::JobNotFound,
            &msg,
        )),
        other => Ok(api_result(other)),
    }
}

fn invalid_filter(err: &TracerError) -> HttpResponse {
    match err {
        TracerError::Validation(msg) => error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::AnalyticsInvalidFilter,
            msg,
        ),
        other => error_from_tracer(other),
    }
}
