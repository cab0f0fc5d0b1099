//! Redirect resolver
//!
//! token -> destination, recording one privacy-bounded click event per
//! successful resolution. Unknown, inactive or non-web destinations resolve
//! to `None` and record nothing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::errors::Result;
use crate::services::classifier;
use crate::storage::{NewClickEvent, SeaOrmStorage};
use crate::utils::{fingerprint_hash, generalize_ip, ip_hash, is_web_url, referrer_host};

/// Raw request facts; never persisted as-is
#[derive(Debug, Clone, Default)]
pub struct RedirectRequest {
    pub token: String,
    pub request_id: Option<String>,
    pub remote_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRedirect {
    pub tracer_link_id: String,
    pub destination_url: String,
    pub job_id: String,
}

pub struct RedirectResolver {
    storage: Arc<SeaOrmStorage>,
}

impl RedirectResolver {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn resolve(&self, request: &RedirectRequest) -> Result<Option<ResolvedRedirect>> {
        self.resolve_at(request, Utc::now()).await
    }

    /// 只查找可跳转的目标，不记录点击（HEAD 请求使用）
    pub async fn lookup(&self, token: &str) -> Result<Option<ResolvedRedirect>> {
        let Some(link) = self.storage.find_active_link_by_token(token).await? else {
            debug!("No active tracer link for token");
            return Ok(None);
        };

        if !is_web_url(&link.destination_url) {
            warn!(
                "Refusing redirect for tracer link {} ({}): destination is not http(s)",
                link.id, link.token
            );
            return Ok(None);
        }

        Ok(Some(ResolvedRedirect {
            tracer_link_id: link.id,
            destination_url: link.destination_url,
            job_id: link.job_id,
        }))
    }

    #[instrument(skip(self, request), fields(token = %request.token))]
    pub async fn resolve_at(
        &self,
        request: &RedirectRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<ResolvedRedirect>> {
        let Some(resolved) = self.lookup(&request.token).await? else {
            return Ok(None);
        };

        let event = build_click_event(&resolved.tracer_link_id, request, now);
        self.storage.record_click(&event).await?;

        Ok(Some(resolved))
    }
}

/// Generalize, hash and classify the request into a storable event
pub fn build_click_event(
    tracer_link_id: &str,
    request: &RedirectRequest,
    now: DateTime<Utc>,
) -> NewClickEvent {
    let generalized_ip = request.remote_ip.as_deref().and_then(generalize_ip);
    let user_agent = request
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|ua| !ua.is_empty());
    let classification = classifier::classify(user_agent);

    NewClickEvent {
        tracer_link_id: tracer_link_id.to_string(),
        clicked_at: now.timestamp(),
        request_id: request.request_id.clone(),
        is_likely_bot: classification.is_likely_bot,
        device_type: classification.device_type.to_string(),
        ua_family: classification.ua_family.to_string(),
        os_family: classification.os_family.to_string(),
        referrer_host: referrer_host(request.referrer.as_deref()),
        ip_hash: generalized_ip.as_deref().map(ip_hash),
        unique_fingerprint_hash: fingerprint_hash(
            generalized_ip.as_deref(),
            user_agent,
            now.date_naive(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> RedirectRequest {
        RedirectRequest {
            token: "acme-ab".into(),
            request_id: Some("req-1".into()),
            remote_ip: Some("203.0.113.77".into()),
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 Version/17.5 Safari/605.1.15"
                    .into(),
            ),
            referrer: Some("https://mail.example.org/inbox?id=42".into()),
        }
    }

    #[test]
    fn test_build_click_event_is_privacy_bounded() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let req = request();
        let event = build_click_event("link-1", &req, now);

        assert_eq!(event.clicked_at, now.timestamp());
        assert_eq!(event.referrer_host.as_deref(), Some("mail.example.org"));
        assert_eq!((event.device_type.as_str(), event.ua_family.as_str()), ("desktop", "safari"));
        assert_eq!(event.os_family, "macos");

        let raw_ip = req.remote_ip.as_deref().unwrap();
        let raw_ua = req.user_agent.as_deref().unwrap();
        for field in [
            event.ip_hash.as_deref(),
            event.unique_fingerprint_hash.as_deref(),
            event.referrer_host.as_deref(),
            Some(event.device_type.as_str()),
            Some(event.ua_family.as_str()),
            Some(event.os_family.as_str()),
        ]
        .into_iter()
        .flatten()
        {
            assert!(!field.contains(raw_ip));
            assert!(!field.contains(raw_ua));
        }
    }

    #[test]
    fn test_same_network_same_day_shares_fingerprint() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 3, 1, 22, 0, 0).unwrap();
        let mut other = request();
        other.remote_ip = Some("203.0.113.200".into());

        let a = build_click_event("l", &request(), now);
        let b = build_click_event("l", &other, later);
        assert_eq!(a.ip_hash, b.ip_hash);
        assert_eq!(a.unique_fingerprint_hash, b.unique_fingerprint_hash);
    }

    #[test]
    fn test_missing_signals() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let req = RedirectRequest {
            token: "acme-ab".into(),
            remote_ip: Some("garbage".into()),
            ..Default::default()
        };
        let event = build_click_event("l", &req, now);
        assert_eq!(event.ip_hash, None);
        assert_eq!(event.unique_fingerprint_hash, None);
        assert_eq!(event.referrer_host, None);
        assert_eq!(event.ua_family, classifier::UNKNOWN);
    }
}
