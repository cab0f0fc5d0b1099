//! Analytics tests
//!
//! Builds a small click history through the redirect resolver and checks the
//! totals, daily series, rankings, per-job breakdown and the HTTP endpoints.

use std::sync::Arc;
use std::time::Duration;

use actix_web::test::{self, TestRequest};
use actix_web::{App, http::StatusCode};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tempfile::TempDir;
use tracerlink::config::TracerConfig;
use tracerlink::errors::TracerError;
use tracerlink::runtime::lifetime::startup::StartupContext;
use tracerlink::services::{
    AnalyticsQuery, AnalyticsService, HealthProbe, JobDirectory, JobRecord, MemoryJobDirectory,
    ProbeError, RedirectRequest, RedirectResolver,
};
use tracerlink::storage::backend::retry::RetryConfig;
use tracerlink::storage::{AnalyticsFilter, IssueOptions, NewTracerLink, SeaOrmStorage, TracerLink};
use tracerlink::utils::destination_url_hash;

const SAFARI: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15";
const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Mobile Safari/537.36";
const LINKEDIN_PREVIEW: &str = "LinkedInBot/1.0 (compatible; Mozilla/5.0; Apache-HttpClient +http://www.linkedin.com)";

// =============================================================================
// Test Setup
// =============================================================================

struct NeverProbe;

#[async_trait]
impl HealthProbe for NeverProbe {
    async fn probe(&self, _health_url: &str, _timeout: Duration) -> Result<(), ProbeError> {
        Err(ProbeError::Network("not used".into()))
    }
}

struct Fixture {
    storage: Arc<SeaOrmStorage>,
    jobs: Arc<dyn JobDirectory>,
    portfolio: TracerLink,
    github: TracerLink,
    other_job: TracerLink,
    _temp: TempDir,
}

fn day1() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap()
}

fn day2() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap()
}

fn job(id: &str, title: &str, employer: &str) -> JobRecord {
    JobRecord {
        id: id.to_string(),
        title: title.to_string(),
        employer: employer.to_string(),
        tracer_links_enabled: true,
    }
}

async fn issue(
    storage: &SeaOrmStorage,
    job_id: &str,
    source_path: &str,
    destination: &str,
) -> TracerLink {
    storage
        .get_or_create_link(
            &NewTracerLink {
                job_id: job_id.to_string(),
                source_path: source_path.to_string(),
                source_label: source_path.to_string(),
                destination_url: destination.to_string(),
                destination_url_hash: destination_url_hash(destination),
                slug_prefix_seed: Some("Acme".to_string()),
            },
            &IssueOptions::default(),
        )
        .await
        .expect("Failed to issue link")
}

async fn click(
    resolver: &RedirectResolver,
    token: &str,
    ip: &str,
    user_agent: &str,
    at: DateTime<Utc>,
) {
    let request = RedirectRequest {
        token: token.to_string(),
        request_id: None,
        remote_ip: Some(ip.to_string()),
        user_agent: Some(user_agent.to_string()),
        referrer: None,
    };
    resolver
        .resolve_at(&request, at)
        .await
        .unwrap()
        .expect("click should resolve");
}

/// job-1: portfolio 3 次人类点击（2 个独立访客）+ 1 次 bot，github 零点击
/// job-2: 第二天 1 次人类点击
async fn create_fixture() -> Fixture {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("analytics.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite", RetryConfig::default())
            .await
            .expect("Failed to create storage"),
    );

    let jobs: Arc<dyn JobDirectory> = Arc::new(MemoryJobDirectory::with_jobs([
        job("job-1", "Backend Engineer", "Acme"),
        job("job-2", "SRE", "Globex"),
    ]));

    let portfolio = issue(&storage, "job-1", "basics.url.href", "https://jane.example.com").await;
    let github = issue(
        &storage,
        "job-1",
        "sections.profiles.items[0].url.href",
        "https://github.com/jane",
    )
    .await;
    let other_job = issue(&storage, "job-2", "basics.url.href", "https://jane.example.com").await;

    let resolver = RedirectResolver::new(storage.clone());
    let hour = chrono::Duration::hours(1);
    click(&resolver, &portfolio.token, "203.0.113.10", SAFARI, day1() + hour).await;
    click(&resolver, &portfolio.token, "203.0.113.99", SAFARI, day1() + hour * 2).await;
    click(&resolver, &portfolio.token, "198.51.100.7", CHROME_ANDROID, day1() + hour * 3).await;
    click(&resolver, &portfolio.token, "192.0.2.50", LINKEDIN_PREVIEW, day1() + hour * 4).await;
    click(&resolver, &other_job.token, "203.0.113.10", SAFARI, day2() + hour).await;

    Fixture {
        storage,
        jobs,
        portfolio,
        github,
        other_job,
        _temp: temp_dir,
    }
}

fn service(fixture: &Fixture) -> AnalyticsService {
    AnalyticsService::new(fixture.storage.clone(), fixture.jobs.clone())
}

fn with_bots() -> AnalyticsFilter {
    AnalyticsFilter {
        include_bots: true,
        ..Default::default()
    }
}

// =============================================================================
// Aggregation
// =============================================================================

#[cfg(test)]
mod aggregation_tests {
    use super::*;

    #[tokio::test]
    async fn test_totals_exclude_bots_by_default() {
        let fixture = create_fixture().await;
        let totals = service(&fixture).totals(&AnalyticsFilter::default()).await.unwrap();

        assert_eq!(totals.clicks, 4);
        assert_eq!(totals.unique_opens, 3);
        assert_eq!(totals.bot_clicks, 0);
        assert_eq!(totals.human_clicks, 4);
    }

    #[tokio::test]
    async fn test_totals_with_bots() {
        let fixture = create_fixture().await;
        let totals = service(&fixture).totals(&with_bots()).await.unwrap();

        assert_eq!(totals.clicks, 5);
        assert_eq!(totals.unique_opens, 4);
        assert_eq!(totals.bot_clicks, 1);
        assert_eq!(totals.human_clicks, 4);
    }

    #[tokio::test]
    async fn test_time_series_buckets_by_utc_day() {
        let fixture = create_fixture().await;
        let series = service(&fixture)
            .time_series(&AnalyticsFilter::default())
            .await
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].day, "2026-03-02");
        assert_eq!(series[0].day_start, day1().timestamp());
        assert_eq!(series[0].metrics.clicks, 3);
        assert_eq!(series[0].metrics.unique_opens, 2);
        assert_eq!(series[1].day, "2026-03-03");
        assert_eq!(series[1].metrics.clicks, 1);
    }

    #[tokio::test]
    async fn test_time_window_is_inclusive() {
        let fixture = create_fixture().await;
        let at = day2() + chrono::Duration::hours(1);
        let filter = AnalyticsFilter {
            from: Some(at.timestamp()),
            to: Some(at.timestamp()),
            ..Default::default()
        };

        let totals = service(&fixture).totals(&filter).await.unwrap();
        assert_eq!(totals.clicks, 1);
    }

    #[tokio::test]
    async fn test_top_jobs_ranked_and_enriched() {
        let fixture = create_fixture().await;
        let top = service(&fixture)
            .top_jobs(&AnalyticsFilter::default())
            .await
            .unwrap();

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].job_id, "job-1");
        assert_eq!(top[0].metrics.clicks, 3);
        assert_eq!(top[0].title.as_deref(), Some("Backend Engineer"));
        assert_eq!(top[0].employer.as_deref(), Some("Acme"));
        assert_eq!(top[1].job_id, "job-2");
        assert_eq!(
            top[1].last_click_at,
            Some((day2() + chrono::Duration::hours(1)).timestamp())
        );
    }

    #[tokio::test]
    async fn test_top_links_respects_limit_and_job() {
        let fixture = create_fixture().await;
        let svc = service(&fixture);

        let top = svc
            .top_links(&AnalyticsFilter {
                limit: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].token, fixture.portfolio.token);
        assert_eq!(top[0].title.as_deref(), Some("Backend Engineer"));
        assert_eq!(top[0].employer.as_deref(), Some("Acme"));

        let job2 = svc.top_links(&AnalyticsFilter::for_job("job-2")).await.unwrap();
        assert_eq!(job2.len(), 1);
        assert_eq!(job2[0].token, fixture.other_job.token);
        assert_eq!(job2[0].title.as_deref(), Some("SRE"));
        assert_eq!(job2[0].employer.as_deref(), Some("Globex"));
    }

    #[tokio::test]
    async fn test_overview_returns_all_shapes() {
        let fixture = create_fixture().await;
        let overview = service(&fixture).overview(&with_bots()).await.unwrap();

        assert_eq!(overview.totals.clicks, 5);
        assert_eq!(overview.time_series.len(), 2);
        assert_eq!(overview.top_jobs.len(), 2);
        // 零点击链接不会出现在排行里
        assert_eq!(overview.top_links.len(), 2);
    }

    #[tokio::test]
    async fn test_job_breakdown_keeps_zero_click_links() {
        let fixture = create_fixture().await;
        let analytics = service(&fixture)
            .job_analytics("job-1", &AnalyticsFilter::default())
            .await
            .unwrap();

        assert_eq!(analytics.job.title, "Backend Engineer");
        assert_eq!(analytics.totals.clicks, 3);
        assert_eq!(analytics.links.len(), 2);
        assert_eq!(analytics.links[0].token, fixture.portfolio.token);
        assert_eq!(analytics.links[0].metrics.clicks, 3);
        assert_eq!(analytics.links[1].token, fixture.github.token);
        assert_eq!(analytics.links[1].metrics.clicks, 0);
        assert_eq!(analytics.links[1].last_click_at, None);
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let fixture = create_fixture().await;
        let err = service(&fixture)
            .job_analytics("job-404", &AnalyticsFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TracerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_query_validation() {
        let err = AnalyticsQuery {
            from: Some(20),
            to: Some(10),
            ..Default::default()
        }
        .into_filter()
        .unwrap_err();
        assert!(matches!(err, TracerError::Validation(_)));
    }
}

// =============================================================================
// HTTP endpoints
// =============================================================================

#[cfg(test)]
mod endpoint_tests {
    use super::*;

    fn context(fixture: &Fixture) -> StartupContext {
        StartupContext::assemble(
            fixture.storage.clone(),
            fixture.jobs.clone(),
            Arc::new(NeverProbe),
            &TracerConfig::default(),
        )
    }

    #[actix_web::test]
    async fn test_overview_endpoint() {
        let fixture = create_fixture().await;
        let ctx = context(&fixture);
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::get()
            .uri("/api/tracer-links/analytics?includeBots=true&limit=5")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["code"], 0);
        assert_eq!(body["data"]["totals"]["clicks"], 5);
        assert_eq!(body["data"]["totals"]["botClicks"], 1);
        assert_eq!(body["data"]["timeSeries"][0]["day"], "2026-03-02");
        assert_eq!(body["data"]["topJobs"][0]["jobId"], "job-1");
    }

    #[actix_web::test]
    async fn test_invalid_filters_are_client_errors() {
        let fixture = create_fixture().await;
        let ctx = context(&fixture);
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        for uri in [
            "/api/tracer-links/analytics?from=200&to=100",
            "/api/tracer-links/analytics?limit=0",
            "/api/tracer-links/analytics?limit=501",
            "/api/tracer-links/analytics?limit=abc",
            "/api/tracer-links/analytics?from=yesterday",
            "/api/tracer-links/analytics?includeBots=yes",
            "/api/tracer-links/jobs/job-1/analytics?to=soon",
        ] {
            let req = TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["code"], 6002, "{}", uri);
            assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
        }
    }

    #[actix_web::test]
    async fn test_job_endpoint() {
        let fixture = create_fixture().await;
        let ctx = context(&fixture);
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::get()
            .uri("/api/tracer-links/jobs/job-1/analytics")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["job"]["id"], "job-1");
        assert_eq!(body["data"]["links"].as_array().unwrap().len(), 2);

        let req = TestRequest::get()
            .uri("/api/tracer-links/jobs/job-404/analytics")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
