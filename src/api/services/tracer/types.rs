//! Tracer link API 类型定义

use serde::{Deserialize, Serialize};

use crate::services::RewrittenLink;

/// 统一响应包装
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// POST /api/tracer-links/jobs/{jobId}/rewrite 的响应
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RewriteDocumentResponse {
    pub job_id: String,
    pub public_base_url: String,
    pub document: serde_json::Value,
    pub links: Vec<RewrittenLink>,
}

/// PATCH /api/tracer-links/links/{id}
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTracerLinkRequest {
    pub is_active: bool,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ReadinessQuery {
    #[serde(default)]
    pub force: bool,
}
