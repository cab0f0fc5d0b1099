//! URL 验证模块
//!
//! 重定向目标与公网地址只接受 http(s)，其余协议一律拒绝

use url::Url;

/// URL 验证错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    InvalidFormat(String),
    MissingHost,
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
            Self::MissingHost => write!(f, "URL has no host"),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// 解析并校验为绝对 http(s) URL
pub fn parse_web_url(raw: &str) -> Result<Url, UrlValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let url = Url::parse(raw).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::InvalidProtocol(format!("{}:", other))),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}

/// 是否为可安全重定向的绝对 http(s) URL
pub fn is_web_url(raw: &str) -> bool {
    parse_web_url(raw).is_ok()
}

/// Host part of a Referer header, lowercased. `None` if absent or unparsable.
pub fn referrer_host(referrer: Option<&str>) -> Option<String> {
    let url = Url::parse(referrer?.trim()).ok()?;
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_ascii_lowercase())
}

/// Normalize a base URL to `scheme://host[:port][/path]` without a trailing slash
pub fn normalize_base_url(raw: &str) -> Result<String, UrlValidationError> {
    let url = parse_web_url(raw)?;
    let mut normalized = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        normalized.push_str(&format!(":{}", port));
    }
    let path = url.path().trim_end_matches('/');
    normalized.push_str(path);
    Ok(normalized)
}

/// Public redirect URL for a token
pub fn tracer_url(base_url: &str, token: &str) -> String {
    format!("{}/cv/{}", base_url.trim_end_matches('/'), token)
}
