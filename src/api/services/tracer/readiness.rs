//! 就绪检查端点

use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;

use crate::config::TracerConfig;
use crate::services::ReadinessChecker;
use crate::utils::request_origin;

use super::helpers::success_response;
use super::types::ReadinessQuery;

/// GET /readiness?force=true
///
/// 检查结果本身总是 200，状态写在 `status` 字段里
pub async fn get_readiness(
    req: HttpRequest,
    query: web::Query<ReadinessQuery>,
    checker: web::Data<Arc<ReadinessChecker>>,
    settings: web::Data<Arc<TracerConfig>>,
) -> actix_web::Result<HttpResponse> {
    let origin = request_origin(&req, settings.trust_proxy);
    let report = checker.check(origin.as_deref(), query.force).await;
    Ok(success_response(report))
}
