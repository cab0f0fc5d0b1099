//! Tracer link 管理 API
//!
//! 简历外链改写、链接启停、点击分析与公网就绪检查。

mod analytics;
pub mod error_code;
mod helpers;
mod links;
mod readiness;
pub mod routes;
mod types;

pub use types::*;

pub use helpers::{
    api_result, error_from_tracer, error_response, query_error_handler, success_response,
};

pub use error_code::ErrorCode;

pub use analytics::{get_analytics_overview, get_job_analytics};
pub use links::{rewrite_job_document, update_tracer_link};
pub use readiness::get_readiness;
pub use routes::{TRACER_API_PREFIX, tracer_api_routes};
