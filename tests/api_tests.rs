//! Tracer link management API tests
//!
//! Rewrite, link toggling and readiness endpoints under `/api/tracer-links`.

use std::sync::Arc;
use std::time::Duration;

use actix_web::test::{self, TestRequest};
use actix_web::{App, http::StatusCode};
use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;
use tracerlink::config::TracerConfig;
use tracerlink::runtime::lifetime::startup::StartupContext;
use tracerlink::services::{HealthProbe, JobDirectory, JobRecord, MemoryJobDirectory, ProbeError};
use tracerlink::storage::SeaOrmStorage;
use tracerlink::storage::backend::retry::RetryConfig;

// =============================================================================
// Test Setup
// =============================================================================

struct HealthyProbe;

#[async_trait]
impl HealthProbe for HealthyProbe {
    async fn probe(&self, _health_url: &str, _timeout: Duration) -> Result<(), ProbeError> {
        Ok(())
    }
}

async fn create_test_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("api.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::new(&db_url, "sqlite", RetryConfig::default())
        .await
        .expect("Failed to create storage");
    (Arc::new(storage), temp_dir)
}

fn context(storage: Arc<SeaOrmStorage>, public_base_url: Option<&str>) -> StartupContext {
    let jobs: Arc<dyn JobDirectory> = Arc::new(MemoryJobDirectory::with_jobs([
        JobRecord {
            id: "job-1".to_string(),
            title: "Platform Engineer".to_string(),
            employer: "Initech".to_string(),
            tracer_links_enabled: true,
        },
        JobRecord {
            id: "job-off".to_string(),
            title: "Data Analyst".to_string(),
            employer: "Globex".to_string(),
            tracer_links_enabled: false,
        },
    ]));
    let tracer = TracerConfig {
        public_base_url: public_base_url.map(str::to_string),
        ..Default::default()
    };
    StartupContext::assemble(storage, jobs, Arc::new(HealthyProbe), &tracer)
}

fn resume() -> Value {
    json!({
        "basics": {
            "name": "Sam Lee",
            "url": { "href": "https://sam.example.com", "label": "" }
        },
        "sections": {
            "profiles": {
                "items": [
                    { "network": "GitHub", "url": { "href": "https://github.com/sam", "label": "GitHub" } }
                ]
            }
        }
    })
}

// =============================================================================
// Rewrite
// =============================================================================

#[cfg(test)]
mod rewrite_endpoint_tests {
    use super::*;

    #[actix_web::test]
    async fn test_rewrite_with_configured_base_url() {
        let (storage, _temp) = create_test_storage().await;
        let ctx = context(storage.clone(), Some("https://cv.example.com"));
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/api/tracer-links/jobs/job-1/rewrite")
            .set_json(resume())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 0);
        let data = &body["data"];
        assert_eq!(data["jobId"], "job-1");
        assert_eq!(data["publicBaseUrl"], "https://cv.example.com");
        assert_eq!(data["links"].as_array().unwrap().len(), 2);

        let href = data["document"]["basics"]["url"]["href"].as_str().unwrap();
        assert!(href.starts_with("https://cv.example.com/cv/initech-"), "{}", href);
        assert_eq!(data["document"]["basics"]["name"], "Sam Lee");

        assert_eq!(storage.list_job_links("job-1").await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_rewrite_falls_back_to_host_header() {
        let (storage, _temp) = create_test_storage().await;
        let ctx = context(storage, None);
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/api/tracer-links/jobs/job-1/rewrite")
            .insert_header(("Host", "resume.example.org"))
            .set_json(resume())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["publicBaseUrl"], "http://resume.example.org");
        let links = body["data"]["links"].as_array().unwrap();
        for link in links {
            let token = link["token"].as_str().unwrap();
            assert_eq!(
                link["tracerUrl"].as_str().unwrap(),
                format!("http://resume.example.org/cv/{}", token)
            );
        }
    }

    #[actix_web::test]
    async fn test_rewrite_disabled_job_returns_document_unchanged() {
        let (storage, _temp) = create_test_storage().await;
        let ctx = context(storage.clone(), Some("https://cv.example.com"));
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/api/tracer-links/jobs/job-off/rewrite")
            .set_json(resume())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["document"], resume());
        assert!(body["data"]["links"].as_array().unwrap().is_empty());
        assert!(storage.list_job_links("job-off").await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_rewrite_unknown_job() {
        let (storage, _temp) = create_test_storage().await;
        let ctx = context(storage, Some("https://cv.example.com"));
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/api/tracer-links/jobs/nope/rewrite")
            .set_json(resume())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 3001);
    }

    #[actix_web::test]
    async fn test_rewrite_without_any_base_url() {
        let (storage, _temp) = create_test_storage().await;
        let ctx = context(storage, None);
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/api/tracer-links/jobs/job-1/rewrite")
            .set_json(resume())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 3002);
    }
}

// =============================================================================
// Link toggle
// =============================================================================

#[cfg(test)]
mod link_endpoint_tests {
    use super::*;

    #[actix_web::test]
    async fn test_patch_toggles_link() {
        let (storage, _temp) = create_test_storage().await;
        let ctx = context(storage.clone(), Some("https://cv.example.com"));
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/api/tracer-links/jobs/job-1/rewrite")
            .set_json(resume())
            .to_request();
        let _: Value = test::call_and_read_body_json(&app, req).await;
        let link = storage.list_job_links("job-1").await.unwrap().remove(0);

        let req = TestRequest::patch()
            .uri(&format!("/api/tracer-links/links/{}", link.id))
            .set_json(json!({ "isActive": false }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["isActive"], false);
        assert_eq!(body["data"]["token"], link.token.as_str());

        // 停用后重定向 404
        let req = TestRequest::get()
            .uri(&format!("/cv/{}", link.token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = TestRequest::patch()
            .uri(&format!("/api/tracer-links/links/{}", link.id))
            .set_json(json!({ "isActive": true }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["isActive"], true);

        let req = TestRequest::get()
            .uri(&format!("/cv/{}", link.token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    #[actix_web::test]
    async fn test_patch_unknown_link() {
        let (storage, _temp) = create_test_storage().await;
        let ctx = context(storage, None);
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::patch()
            .uri("/api/tracer-links/links/does-not-exist")
            .set_json(json!({ "isActive": false }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 3000);
    }
}

// =============================================================================
// Readiness
// =============================================================================

#[cfg(test)]
mod readiness_endpoint_tests {
    use super::*;

    #[actix_web::test]
    async fn test_readiness_ready() {
        let (storage, _temp) = create_test_storage().await;
        let ctx = context(storage, Some("https://cv.example.com"));
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::get()
            .uri("/api/tracer-links/readiness?force=true")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        let data = &body["data"];
        assert_eq!(data["status"], "ready");
        assert_eq!(data["canEnable"], true);
        assert_eq!(data["healthUrl"], "https://cv.example.com/health");
    }

    #[actix_web::test]
    async fn test_readiness_unconfigured_is_still_200() {
        let (storage, _temp) = create_test_storage().await;
        let ctx = context(storage, None);
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::get()
            .uri("/api/tracer-links/readiness")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], "unconfigured");
        assert_eq!(body["data"]["canEnable"], false);
    }

    #[actix_web::test]
    async fn test_readiness_local_origin_unavailable() {
        let (storage, _temp) = create_test_storage().await;
        let ctx = context(storage, None);
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::get()
            .uri("/api/tracer-links/readiness")
            .insert_header(("Host", "localhost:8080"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["status"], "unavailable");
        assert_eq!(body["data"]["publicBaseUrl"], "http://localhost:8080");
    }
}
