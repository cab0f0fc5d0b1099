//! Readiness checker tests
//!
//! Uses a scripted `HealthProbe` so no real network traffic is needed.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracerlink::services::{HealthProbe, ProbeError, ReadinessChecker, ReadinessStatus, UreqProbe};

// =============================================================================
// Test Setup
// =============================================================================

/// Returns whatever `next` currently holds and counts calls
struct ScriptedProbe {
    next: Mutex<Result<(), ProbeError>>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    fn new(result: Result<(), ProbeError>) -> Arc<Self> {
        Arc::new(Self {
            next: Mutex::new(result),
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        })
    }

    fn set(&self, result: Result<(), ProbeError>) {
        *self.next.lock().unwrap() = result;
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthProbe for ScriptedProbe {
    async fn probe(&self, health_url: &str, _timeout: Duration) -> Result<(), ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(health_url.to_string());
        self.next.lock().unwrap().clone()
    }
}

fn checker(probe: Arc<ScriptedProbe>, configured: Option<&str>) -> ReadinessChecker {
    ReadinessChecker::with_settings(
        probe,
        configured.map(str::to_string),
        Duration::from_secs(300),
        Duration::from_secs(5),
    )
}

// =============================================================================
// Status decisions
// =============================================================================

#[cfg(test)]
mod status_tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_without_override_or_origin() {
        let probe = ScriptedProbe::new(Ok(()));
        let report = checker(probe.clone(), None).check(None, false).await;

        assert_eq!(report.status, ReadinessStatus::Unconfigured);
        assert!(!report.can_enable);
        assert!(report.public_base_url.is_none());
        assert!(report.health_url.is_none());
        assert!(report.reason.is_some());
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_ready_from_request_origin() {
        let probe = ScriptedProbe::new(Ok(()));
        let report = checker(probe.clone(), None)
            .check(Some("https://cv.example.com/"), false)
            .await;

        assert_eq!(report.status, ReadinessStatus::Ready);
        assert!(report.can_enable);
        assert_eq!(report.public_base_url.as_deref(), Some("https://cv.example.com"));
        assert_eq!(report.health_url.as_deref(), Some("https://cv.example.com/health"));
        assert_eq!(report.last_success_at, Some(report.checked_at));
        assert!(report.reason.is_none());
        assert_eq!(
            probe.urls.lock().unwrap().as_slice(),
            ["https://cv.example.com/health".to_string()]
        );
    }

    #[tokio::test]
    async fn test_override_wins_over_origin() {
        let probe = ScriptedProbe::new(Ok(()));
        let report = checker(probe, Some("https://links.example.net"))
            .check(Some("http://10.0.0.8:8080"), false)
            .await;

        assert_eq!(report.status, ReadinessStatus::Ready);
        assert_eq!(report.public_base_url.as_deref(), Some("https://links.example.net"));
    }

    #[tokio::test]
    async fn test_local_hosts_unavailable_without_probe() {
        let probe = ScriptedProbe::new(Ok(()));
        let checker = checker(probe.clone(), None);

        for origin in [
            "http://localhost:3000",
            "http://127.0.0.1:8080",
            "http://192.168.1.20",
            "http://[::1]:8080",
            "http://resume-box.local",
        ] {
            let report = checker.check(Some(origin), true).await;
            assert_eq!(report.status, ReadinessStatus::Unavailable, "{}", origin);
            assert!(!report.can_enable);
            assert!(
                report.reason.as_deref().unwrap().contains("internet-reachable"),
                "{}",
                origin
            );
        }
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_unavailable() {
        let probe = ScriptedProbe::new(Ok(()));
        let report = checker(probe.clone(), Some("not a url")).check(None, false).await;

        assert_eq!(report.status, ReadinessStatus::Unavailable);
        assert!(report.reason.as_deref().unwrap().contains("invalid"));
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_timeout_and_status_failures_are_distinguished() {
        let probe = ScriptedProbe::new(Err(ProbeError::Timeout));
        let checker = checker(probe.clone(), Some("https://cv.example.com"));

        let report = checker.check(None, true).await;
        assert_eq!(report.status, ReadinessStatus::Unavailable);
        assert!(report.reason.as_deref().unwrap().contains("timed out"));

        probe.set(Err(ProbeError::Status(503)));
        let report = checker.check(None, true).await;
        let reason = report.reason.unwrap();
        assert!(reason.contains("503"), "{}", reason);
        assert!(!reason.contains("timed out"));

        probe.set(Err(ProbeError::Network("connection refused".into())));
        let report = checker.check(None, true).await;
        assert!(report.reason.unwrap().contains("connection refused"));
    }
}

// =============================================================================
// Caching
// =============================================================================

#[cfg(test)]
mod cache_tests {
    use super::*;

    #[tokio::test]
    async fn test_results_are_cached_until_forced() {
        let probe = ScriptedProbe::new(Ok(()));
        let checker = checker(probe.clone(), Some("https://cv.example.com"));

        let first = checker.check(None, false).await;
        let second = checker.check(None, false).await;
        assert_eq!(probe.calls(), 1);
        assert_eq!(first.checked_at, second.checked_at);

        checker.check(None, true).await;
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_is_per_base_url() {
        let probe = ScriptedProbe::new(Ok(()));
        let checker = checker(probe.clone(), None);

        checker.check(Some("https://a.example.com"), false).await;
        checker.check(Some("https://b.example.com"), false).await;
        checker.check(Some("https://a.example.com/"), false).await;
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test]
    async fn test_expired_cache_probes_again() {
        let probe = ScriptedProbe::new(Ok(()));
        let checker = ReadinessChecker::with_settings(
            probe.clone(),
            Some("https://cv.example.com".to_string()),
            Duration::from_millis(50),
            Duration::from_secs(5),
        );

        checker.check(None, false).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        checker.check(None, false).await;
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test]
    async fn test_last_success_survives_failure() {
        let probe = ScriptedProbe::new(Ok(()));
        let checker = checker(probe.clone(), Some("https://cv.example.com"));

        let ready = checker.check(None, false).await;
        let success_at = ready.last_success_at.expect("success recorded");

        probe.set(Err(ProbeError::Status(500)));
        let failed = checker.check(None, true).await;
        assert_eq!(failed.status, ReadinessStatus::Unavailable);
        assert_eq!(failed.last_success_at, Some(success_at));

        // 缓存命中的失败结果仍带着上次成功时间
        let cached = checker.check(None, false).await;
        assert_eq!(cached.status, ReadinessStatus::Unavailable);
        assert_eq!(cached.last_success_at, Some(success_at));
    }
}

// =============================================================================
// Real probe
// =============================================================================

#[cfg(test)]
mod ureq_probe_tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_port_fails() {
        let result = UreqProbe
            .probe("http://127.0.0.1:1/health", Duration::from_secs(2))
            .await;
        assert!(result.is_err());
    }
}
