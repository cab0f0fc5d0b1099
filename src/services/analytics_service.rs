//! Analytics service layer
//!
//! Validates the shared filter set and runs the read-side query shapes.
//! The overview either returns all four shapes or fails as a whole.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{Result, TracerError};
use crate::services::job_directory::{JobDirectory, JobRecord};
use crate::storage::models::{DEFAULT_ANALYTICS_LIMIT, MAX_ANALYTICS_LIMIT};
use crate::storage::{
    AnalyticsFilter, ClickMetrics, JobClickSummary, JobLinkBreakdown, LinkClickSummary,
    SeaOrmStorage, TimeSeriesPoint,
};

/// Raw filter as received from a caller
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub job_id: Option<String>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub include_bots: Option<bool>,
    pub limit: Option<u64>,
}

impl AnalyticsQuery {
    /// 校验并转换为存储层过滤条件
    pub fn into_filter(self) -> Result<AnalyticsFilter> {
        let limit = self.limit.unwrap_or(DEFAULT_ANALYTICS_LIMIT);
        if !(1..=MAX_ANALYTICS_LIMIT).contains(&limit) {
            return Err(TracerError::validation(format!(
                "limit: must be between 1 and {}, got {}",
                MAX_ANALYTICS_LIMIT, limit
            )));
        }

        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(TracerError::validation(format!(
                "from: must not be after to ({} > {})",
                from, to
            )));
        }

        let job_id = self
            .job_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Ok(AnalyticsFilter {
            job_id,
            from: self.from,
            to: self.to,
            include_bots: self.include_bots.unwrap_or(false),
            limit,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub totals: ClickMetrics,
    pub time_series: Vec<TimeSeriesPoint>,
    pub top_jobs: Vec<JobClickSummary>,
    pub top_links: Vec<LinkClickSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAnalytics {
    pub job: JobRecord,
    pub totals: ClickMetrics,
    pub time_series: Vec<TimeSeriesPoint>,
    pub links: Vec<JobLinkBreakdown>,
}

/// Analytics 服务
pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
    jobs: Arc<dyn JobDirectory>,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>, jobs: Arc<dyn JobDirectory>) -> Self {
        Self { storage, jobs }
    }

    pub async fn totals(&self, filter: &AnalyticsFilter) -> Result<ClickMetrics> {
        self.storage.analytics_totals(filter).await
    }

    pub async fn time_series(&self, filter: &AnalyticsFilter) -> Result<Vec<TimeSeriesPoint>> {
        self.storage.analytics_time_series(filter).await
    }

    /// 热门职位，附带职位标题与公司
    pub async fn top_jobs(&self, filter: &AnalyticsFilter) -> Result<Vec<JobClickSummary>> {
        let mut rows = self.storage.analytics_top_jobs(filter).await?;
        for row in &mut rows {
            if let Some(job) = self.jobs.find_job(&row.job_id).await? {
                row.title = Some(job.title);
                row.employer = Some(job.employer);
            }
        }
        Ok(rows)
    }

    /// 热门链接，同样补齐所属职位的展示字段
    pub async fn top_links(&self, filter: &AnalyticsFilter) -> Result<Vec<LinkClickSummary>> {
        let mut rows = self.storage.analytics_top_links(filter).await?;
        let mut seen: HashMap<String, Option<JobRecord>> = HashMap::new();
        for row in &mut rows {
            let job = match seen.get(&row.job_id) {
                Some(job) => job.clone(),
                None => {
                    let job = self.jobs.find_job(&row.job_id).await?;
                    seen.insert(row.job_id.clone(), job.clone());
                    job
                }
            };
            if let Some(job) = job {
                row.title = Some(job.title);
                row.employer = Some(job.employer);
            }
        }
        Ok(rows)
    }

    /// 四种查询并发执行，任一失败则整体失败
    pub async fn overview(&self, filter: &AnalyticsFilter) -> Result<AnalyticsOverview> {
        let (totals, time_series, top_jobs, top_links) = futures_util::try_join!(
            self.totals(filter),
            self.time_series(filter),
            self.top_jobs(filter),
            self.top_links(filter),
        )?;

        debug!(
            "Analytics overview: {} clicks, {} days, {} jobs, {} links",
            totals.clicks,
            time_series.len(),
            top_jobs.len(),
            top_links.len()
        );

        Ok(AnalyticsOverview {
            totals,
            time_series,
            top_jobs,
            top_links,
        })
    }

    /// 单个职位的分析；职位不存在时返回 NotFound
    pub async fn job_analytics(&self, job_id: &str, filter: &AnalyticsFilter) -> Result<JobAnalytics> {
        let job = self
            .jobs
            .find_job(job_id)
            .await?
            .ok_or_else(|| TracerError::not_found(format!("Job not found: {}", job_id)))?;

        let scoped = AnalyticsFilter {
            job_id: Some(job.id.clone()),
            ..filter.clone()
        };

        let (totals, time_series, links) = futures_util::try_join!(
            self.storage.analytics_totals(&scoped),
            self.storage.analytics_time_series(&scoped),
            self.storage.analytics_job_breakdown(&job.id, &scoped),
        )?;

        info!(
            "Job analytics for {}: {} clicks across {} links",
            job.id,
            totals.clicks,
            links.len()
        );

        Ok(JobAnalytics {
            job,
            totals,
            time_series,
            links,
        })
    }
}
