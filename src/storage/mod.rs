use std::sync::Arc;

use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::{
    AnalyticsFilter, ClickEvent, ClickMetrics, IssueOptions, JobClickSummary, JobLinkBreakdown,
    LinkClickSummary, NewClickEvent, NewTracerLink, TimeSeriesPoint, TracerLink,
};

pub struct StorageFactory;

impl StorageFactory {
    /// 按全局配置创建存储
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let database_url = &config.database.database_url;

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;
        let retry_config = backend::retry::RetryConfig::from(&config.database);

        let storage = SeaOrmStorage::new(database_url, &backend_type, retry_config).await?;
        Ok(Arc::new(storage))
    }
}
