//! Readiness checker
//!
//! Decides whether the public base URL used in tracer links is configured,
//! internet-reachable and answering `GET {base}/health`. Results are cached
//! per base URL; `force` skips the cache. The last success time per base URL
//! is kept separately and survives later failures.

use std::net::IpAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use moka::future::Cache;
use serde::Serialize;
use tracing::{debug, info, warn};
use ureq::Agent;
use url::{Host, Url};

use crate::config::TracerConfig;
use crate::utils::{is_private_or_local, normalize_base_url};

const READINESS_CACHE_MAX_CAPACITY: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessStatus {
    Unconfigured,
    Unavailable,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessReport {
    pub status: ReadinessStatus,
    pub can_enable: bool,
    pub public_base_url: Option<String>,
    pub health_url: Option<String>,
    /// unix 秒
    pub checked_at: i64,
    pub last_success_at: Option<i64>,
    pub reason: Option<String>,
}

/// Why a health probe failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    Timeout,
    Status(u16),
    Network(String),
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, health_url: &str, timeout: Duration) -> Result<(), ProbeError>;
}

/// 全局 HTTP Agent（ureq 的 Agent 是 Send + Sync）
static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent(timeout: Duration) -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into()
    })
}

/// ureq-based probe, run on the blocking pool
pub struct UreqProbe;

impl UreqProbe {
    fn probe_sync(url: &str, timeout: Duration) -> Result<(), ProbeError> {
        match get_agent(timeout).get(url).call() {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(ProbeError::Status(resp.status().as_u16())),
            Err(ureq::Error::StatusCode(code)) => Err(ProbeError::Status(code)),
            Err(ureq::Error::Timeout(_)) => Err(ProbeError::Timeout),
            Err(e) => Err(ProbeError::Network(e.to_string())),
        }
    }
}

#[async_trait]
impl HealthProbe for UreqProbe {
    async fn probe(&self, health_url: &str, timeout: Duration) -> Result<(), ProbeError> {
        let url = health_url.to_string();
        let task = tokio::task::spawn_blocking(move || Self::probe_sync(&url, timeout));

        // agent 的超时只在首次创建时生效，这里再加一层硬超时
        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(ProbeError::Network(format!("probe task failed: {}", e))),
            Err(_) => Err(ProbeError::Timeout),
        }
    }
}

/// Operator override wins; otherwise the request origin
pub fn resolve_public_base_url(
    configured: Option<&str>,
    request_origin: Option<&str>,
) -> Option<String> {
    configured
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| request_origin.map(str::trim).filter(|s| !s.is_empty()))
        .map(str::to_string)
}

/// `Some(reason)` when `url` cannot be reached from the internet
pub fn reachability_problem(url: &Url) -> Option<String> {
    let reason = |host: &str, what: &str| {
        Some(format!(
            "Public base URL must be internet-reachable: host '{}' {}",
            host, what
        ))
    };

    match url.host() {
        None => reason("", "is missing"),
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            if domain == "localhost" || domain.ends_with(".localhost") {
                reason(&domain, "is a loopback name")
            } else if domain.ends_with(".local") {
                reason(&domain, "is a link-local mDNS name")
            } else if !domain.contains('.') {
                reason(&domain, "is not a fully qualified domain")
            } else {
                None
            }
        }
        Some(Host::Ipv4(ip)) => is_private_or_local(&IpAddr::V4(ip))
            .then(|| reason(&ip.to_string(), "is a private, loopback or link-local address"))
            .flatten(),
        Some(Host::Ipv6(ip)) => is_private_or_local(&IpAddr::V6(ip))
            .then(|| reason(&ip.to_string(), "is a loopback, link-local or unique-local address"))
            .flatten(),
    }
}

pub struct ReadinessChecker {
    probe: Arc<dyn HealthProbe>,
    configured_base_url: Option<String>,
    timeout: Duration,
    cache: Cache<String, ReadinessReport>,
    last_success: DashMap<String, i64>,
}

impl ReadinessChecker {
    pub fn new(probe: Arc<dyn HealthProbe>, config: &TracerConfig) -> Self {
        Self::with_settings(
            probe,
            config.public_base_url.clone(),
            Duration::from_secs(config.readiness_cache_ttl_secs),
            Duration::from_secs(config.health_check_timeout_secs),
        )
    }

    pub fn with_settings(
        probe: Arc<dyn HealthProbe>,
        configured_base_url: Option<String>,
        cache_ttl: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            probe,
            configured_base_url,
            timeout,
            cache: Cache::builder()
                .time_to_live(cache_ttl)
                .max_capacity(READINESS_CACHE_MAX_CAPACITY)
                .build(),
            last_success: DashMap::new(),
        }
    }

    /// Public base URL for tracer links, if any can be resolved
    pub fn public_base_url(&self, request_origin: Option<&str>) -> Option<String> {
        resolve_public_base_url(self.configured_base_url.as_deref(), request_origin)
    }

    /// Never fails: every problem becomes a status plus a reason
    pub async fn check(&self, request_origin: Option<&str>, force: bool) -> ReadinessReport {
        let now = Utc::now().timestamp();

        let Some(candidate) = self.public_base_url(request_origin) else {
            return ReadinessReport {
                status: ReadinessStatus::Unconfigured,
                can_enable: false,
                public_base_url: None,
                health_url: None,
                checked_at: now,
                last_success_at: None,
                reason: Some(
                    "No public base URL: set tracer.public_base_url (TL__TRACER__PUBLIC_BASE_URL) or call from the public origin"
                        .to_string(),
                ),
            };
        };

        let base_url = match normalize_base_url(&candidate) {
            Ok(url) => url,
            Err(e) => {
                return self.unavailable(
                    candidate,
                    None,
                    now,
                    format!("Public base URL is invalid: {}", e),
                );
            }
        };

        if !force && let Some(mut cached) = self.cache.get(&base_url).await {
            debug!("Readiness cache hit for {}", base_url);
            cached.last_success_at = self.last_success_at(&base_url);
            return cached;
        }

        let report = self.evaluate(&base_url, now).await;
        self.cache.insert(base_url, report.clone()).await;
        report
    }

    async fn evaluate(&self, base_url: &str, now: i64) -> ReadinessReport {
        let health_url = format!("{}/health", base_url);

        if let Some(reason) = Url::parse(base_url)
            .ok()
            .as_ref()
            .and_then(reachability_problem)
        {
            return self.unavailable(base_url.to_string(), Some(health_url), now, reason);
        }

        match self.probe.probe(&health_url, self.timeout).await {
            Ok(()) => {
                self.last_success.insert(base_url.to_string(), now);
                info!("Readiness check passed for {}", base_url);
                ReadinessReport {
                    status: ReadinessStatus::Ready,
                    can_enable: true,
                    public_base_url: Some(base_url.to_string()),
                    health_url: Some(health_url),
                    checked_at: now,
                    last_success_at: Some(now),
                    reason: None,
                }
            }
            Err(err) => {
                let reason = match err {
                    ProbeError::Timeout => format!(
                        "Health check timed out after {}s: {}",
                        self.timeout.as_secs(),
                        health_url
                    ),
                    ProbeError::Status(code) => {
                        format!("Health check returned HTTP {}: {}", code, health_url)
                    }
                    ProbeError::Network(msg) => {
                        format!("Health check failed: {} ({})", health_url, msg)
                    }
                };
                warn!("Readiness check failed for {}: {}", base_url, reason);
                self.unavailable(base_url.to_string(), Some(health_url), now, reason)
            }
        }
    }

    fn unavailable(
        &self,
        base_url: String,
        health_url: Option<String>,
        now: i64,
        reason: String,
    ) -> ReadinessReport {
        ReadinessReport {
            status: ReadinessStatus::Unavailable,
            can_enable: false,
            last_success_at: self.last_success_at(&base_url),
            public_base_url: Some(base_url),
            health_url,
            checked_at: now,
            reason: Some(reason),
        }
    }

    fn last_success_at(&self, base_url: &str) -> Option<i64> {
        self.last_success.get(base_url).map(|entry| *entry.value())
    }
}
