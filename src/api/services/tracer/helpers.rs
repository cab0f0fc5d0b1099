//! 响应构建帮助函数

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;
use tracing::error;

use crate::errors::TracerError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, code, message, None)
}

/// TracerError → HttpResponse（自动映射状态码与错误码）
pub fn error_from_tracer(err: &TracerError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        error!("{}", err.format_simple());
    }
    error_response(status, ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse
pub fn api_result<T: Serialize>(result: crate::errors::Result<T>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_tracer(&e),
    }
}

/// 查询参数解析失败时同样返回统一的 JSON 包装
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    let message = format!("query: {}", err);
    tracing::debug!("Rejected query string for {}: {}", req.path(), message);
    let response = error_response(
        StatusCode::BAD_REQUEST,
        ErrorCode::AnalyticsInvalidFilter,
        &message,
    );
    InternalError::from_response(err, response).into()
}
