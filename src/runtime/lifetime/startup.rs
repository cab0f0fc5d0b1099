use actix_web::web;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::services::tracer::query_error_handler;
use crate::api::services::{health_routes, redirect_routes, tracer_api_routes};
use crate::config::{StaticConfig, TracerConfig};
use crate::services::{
    AnalyticsService, HealthProbe, JobDirectory, MemoryJobDirectory, ReadinessChecker,
    RedirectResolver, TracerLinkService, UreqProbe,
};
use crate::storage::{IssueOptions, SeaOrmStorage, StorageFactory};

/// 服务器运行所需的全部共享组件
#[derive(Clone)]
pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub jobs: Arc<dyn JobDirectory>,
    pub resolver: Arc<RedirectResolver>,
    pub tracer_links: Arc<TracerLinkService>,
    pub analytics: Arc<AnalyticsService>,
    pub readiness: Arc<ReadinessChecker>,
    /// handler 读取 trust_proxy 等设置
    pub settings: Arc<TracerConfig>,
}

impl StartupContext {
    /// 用已有的存储与职位目录组装服务
    pub fn assemble(
        storage: Arc<SeaOrmStorage>,
        jobs: Arc<dyn JobDirectory>,
        probe: Arc<dyn HealthProbe>,
        tracer: &TracerConfig,
    ) -> Self {
        Self {
            resolver: Arc::new(RedirectResolver::new(storage.clone())),
            tracer_links: Arc::new(TracerLinkService::new(
                storage.clone(),
                IssueOptions::from(tracer),
            )),
            analytics: Arc::new(AnalyticsService::new(storage.clone(), jobs.clone())),
            readiness: Arc::new(ReadinessChecker::new(probe, tracer)),
            settings: Arc::new(tracer.clone()),
            storage,
            jobs,
        }
    }

    /// 注册共享状态与全部路由
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.storage.clone()))
            .app_data(web::Data::new(self.jobs.clone()))
            .app_data(web::Data::new(self.resolver.clone()))
            .app_data(web::Data::new(self.tracer_links.clone()))
            .app_data(web::Data::new(self.analytics.clone()))
            .app_data(web::Data::new(self.readiness.clone()))
            .app_data(web::Data::new(self.settings.clone()))
            .app_data(web::JsonConfig::default().limit(1024 * 1024))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .service(health_routes())
            .service(tracer_api_routes())
            .service(redirect_routes());
    }
}

/// 加载职位目录：有种子文件就读，没有就是空目录
pub fn load_job_directory(config: &StaticConfig) -> Result<Arc<dyn JobDirectory>> {
    let directory = match config.jobs.seed_file.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => MemoryJobDirectory::from_file(path)
            .with_context(|| format!("Failed to load job seed file {}", path))?,
        None => {
            warn!("No jobs.seed_file configured, job directory starts empty");
            MemoryJobDirectory::new()
        }
    };
    Ok(Arc::new(directory))
}

/// 准备服务器启动的上下文
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = crate::config::get_config();

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().storage_type
    );

    let jobs = load_job_directory(&config)?;

    match config.tracer.public_base_url.as_deref() {
        Some(url) => info!("Public base URL override: {}", url),
        None => warn!("tracer.public_base_url not set, falling back to request origin"),
    }
    if config.tracer.trust_proxy {
        warn!("trust_proxy enabled: X-Forwarded-* headers will be honoured");
    }

    let context = StartupContext::assemble(storage, jobs, Arc::new(UreqProbe), &config.tracer);

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(context)
}
