//! HTTP 层：actix-web 端点与中间件

pub mod middleware;
pub mod services;
