//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::TracerError;

/// API 错误码
///
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: tracer link 错误
/// - 6000-6099: analytics 错误
/// - 7000-7099: 就绪检查错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,

    // tracer link 错误 3000-3099
    TracerLinkNotFound = 3000,
    JobNotFound = 3001,
    PublicBaseUrlMissing = 3002,
    TokenSpaceExhausted = 3003,
    TracerLinkDatabaseError = 3005,

    // analytics 错误 6000-6099
    AnalyticsQueryFailed = 6000,
    AnalyticsInvalidFilter = 6002,

    // 就绪检查错误 7000-7099
    ReadinessUnavailable = 7000,
}

impl From<&TracerError> for ErrorCode {
    fn from(err: &TracerError) -> Self {
        match err {
            TracerError::Validation(_) => ErrorCode::BadRequest,
            TracerError::NotFound(_) => ErrorCode::NotFound,
            TracerError::TokenSpaceExhausted(_) => ErrorCode::TokenSpaceExhausted,
            TracerError::DatabaseOperation(_) | TracerError::DatabaseConnection(_) => {
                ErrorCode::TracerLinkDatabaseError
            }
            _ => ErrorCode::InternalServerError,
        }
    }
}
