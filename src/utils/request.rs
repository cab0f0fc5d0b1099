//! 从 HttpRequest 中提取客户端信息
//!
//! 只有显式开启 `tracer.trust_proxy` 时才读取转发头，否则一律使用连接信息，防止伪造。

use actix_web::HttpRequest;
use actix_web::http::header::{self, HeaderMap};
use tracing::debug;

/// 提取客户端 IP（原始值，调用方负责泛化）
///
/// 策略：
/// 1. trust_proxy 且存在 X-Forwarded-For / X-Real-IP → 使用转发 IP
/// 2. 默认 → 使用连接 IP
pub fn extract_client_ip(req: &HttpRequest, trust_proxy: bool) -> Option<String> {
    if trust_proxy && let Some(forwarded) = extract_forwarded_ip_from_headers(req.headers()) {
        debug!("Trusted proxy: using forwarded IP {}", forwarded);
        return Some(forwarded);
    }

    req.peer_addr().map(|addr| addr.ip().to_string())
}

/// 从 HeaderMap 提取转发的 IP
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    // 优先 X-Forwarded-For（取第一个，即原始客户端 IP）
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            // 其次 X-Real-IP
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// 推断请求的外部 origin（`scheme://host`）
///
/// trust_proxy 时使用 actix 的 ConnectionInfo（读取 Forwarded / X-Forwarded-Host / X-Forwarded-Proto），
/// 否则只看 Host 头与监听是否为 TLS。
pub fn request_origin(req: &HttpRequest, trust_proxy: bool) -> Option<String> {
    if trust_proxy {
        let info = req.connection_info();
        let host = info.host().trim();
        if host.is_empty() {
            return None;
        }
        return Some(format!("{}://{}", info.scheme(), host));
    }

    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.to_string()))?;

    let scheme = req.uri().scheme_str().unwrap_or(if req.app_config().secure() {
        "https"
    } else {
        "http"
    });

    Some(format!("{}://{}", scheme, host))
}

/// User-Agent 头
pub fn user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

/// Referer 头
pub fn referrer(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::REFERER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}
