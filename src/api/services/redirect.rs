//! 公开跳转端点 `GET /cv/{token}`
//!
//! 成功时 302 到原始地址并禁止任何缓存，否则统一 404，不泄露 token 是否存在。
//! HEAD 返回同样的状态与 Location，但不记录点击。

use actix_web::http::StatusCode;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, web};
use std::sync::Arc;
use tracing::{error, trace};

use crate::api::middleware::RequestId;
use crate::config::TracerConfig;
use crate::services::token::is_well_formed;
use crate::services::{RedirectRequest, RedirectResolver};
use crate::utils::request::{referrer, user_agent};
use crate::utils::extract_client_ip;

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        resolver: web::Data<Arc<RedirectResolver>>,
        settings: web::Data<Arc<TracerConfig>>,
    ) -> impl Responder {
        let token = path.into_inner();
        if !is_well_formed(&token) {
            // 非法 token 不查库
            trace!("Malformed tracer token rejected: {}", token);
            return Self::not_found_response();
        }

        let request = RedirectRequest {
            request_id: req.extensions().get::<RequestId>().map(|id| id.0.clone()),
            remote_ip: extract_client_ip(&req, settings.trust_proxy),
            user_agent: user_agent(&req),
            referrer: referrer(&req),
            token,
        };

        match resolver.resolve(&request).await {
            Ok(Some(resolved)) => Self::found_response(resolved.destination_url),
            Ok(None) => Self::not_found_response(),
            Err(e) => {
                error!("Tracer redirect failed for {}: {}", request.token, e);
                Self::error_response()
            }
        }
    }

    /// 链接预检（邮件扫描器等）常用 HEAD，不计入点击
    pub async fn handle_head(
        path: web::Path<String>,
        resolver: web::Data<Arc<RedirectResolver>>,
    ) -> impl Responder {
        let token = path.into_inner();
        if !is_well_formed(&token) {
            return Self::not_found_response();
        }

        match resolver.lookup(&token).await {
            Ok(Some(resolved)) => Self::found_response(resolved.destination_url),
            Ok(None) => Self::not_found_response(),
            Err(e) => {
                error!("Tracer HEAD lookup failed for {}: {}", token, e);
                Self::error_response()
            }
        }
    }

    #[inline]
    fn found_response(destination: String) -> HttpResponse {
        HttpResponse::Found()
            .insert_header(("Location", destination))
            .insert_header(("Cache-Control", "no-store"))
            .insert_header(("Pragma", "no-cache"))
            .insert_header(("Expires", "0"))
            .finish()
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .insert_header(("Cache-Control", "no-store"))
            .body("Not Found")
    }

    #[inline]
    fn error_response() -> HttpResponse {
        HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .insert_header(("Cache-Control", "no-store"))
            .body("Internal Server Error")
    }
}

pub fn redirect_routes() -> actix_web::Scope {
    web::scope("/cv")
        .route("/{token}", web::get().to(RedirectService::handle_redirect))
        .route("/{token}", web::head().to(RedirectService::handle_head))
}
