//! Analytics 相关的数据库查询
//!
//! 所有查询都以 tracer_click_events INNER JOIN tracer_links 为基础，
//! 过滤条件（job、时间窗口、是否包含 bot）统一由 `base_query` 施加。
//! 每日分桶用 `clicked_at - clicked_at % 86400`，三种数据库通用。

use std::collections::HashMap;

use chrono::DateTime;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select, sea_query::Expr,
};

use super::SeaOrmStorage;
use super::retry;
use crate::errors::Result;
use crate::storage::{
    AnalyticsFilter, ClickMetrics, JobClickSummary, JobLinkBreakdown, LinkClickSummary,
    TimeSeriesPoint,
};

use migration::entities::{tracer_click_event, tracer_link};

const UNIQUE_OPENS_SQL: &str = "COUNT(DISTINCT tracer_click_events.unique_fingerprint_hash)";
const BOT_CLICKS_SQL: &str = "COUNT(CASE WHEN tracer_click_events.is_likely_bot THEN 1 END)";
const LAST_CLICK_SQL: &str = "MAX(tracer_click_events.clicked_at)";
const DAY_START_SQL: &str =
    "(tracer_click_events.clicked_at - (tracer_click_events.clicked_at % 86400))";

// ============ 查询结果类型 ============

#[derive(Debug, FromQueryResult)]
pub struct MetricsRow {
    pub clicks: i64,
    pub unique_opens: i64,
    pub bot_clicks: i64,
}

#[derive(Debug, FromQueryResult)]
pub struct DailyMetricsRow {
    pub day_start: i64,
    pub clicks: i64,
    pub unique_opens: i64,
    pub bot_clicks: i64,
}

#[derive(Debug, FromQueryResult)]
pub struct JobMetricsRow {
    pub job_id: String,
    pub clicks: i64,
    pub unique_opens: i64,
    pub bot_clicks: i64,
    pub last_click_at: Option<i64>,
}

#[derive(Debug, FromQueryResult)]
pub struct LinkMetricsRow {
    pub tracer_link_id: String,
    pub token: String,
    pub job_id: String,
    pub source_path: String,
    pub source_label: String,
    pub destination_url: String,
    pub clicks: i64,
    pub unique_opens: i64,
    pub bot_clicks: i64,
    pub last_click_at: Option<i64>,
}

impl MetricsRow {
    fn metrics(&self) -> ClickMetrics {
        ClickMetrics::from_counts(self.clicks, self.unique_opens, self.bot_clicks)
    }
}

/// unix 秒 -> `YYYY-MM-DD`（UTC）
pub fn day_label(day_start: i64) -> String {
    DateTime::from_timestamp(day_start, 0)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// events ⋈ links + 过滤条件
fn base_query(filter: &AnalyticsFilter) -> Select<tracer_click_event::Entity> {
    let mut query = tracer_click_event::Entity::find()
        .select_only()
        .join(
            JoinType::InnerJoin,
            tracer_click_event::Relation::TracerLink.def(),
        );

    if let Some(job_id) = &filter.job_id {
        query = query.filter(tracer_link::Column::JobId.eq(job_id.as_str()));
    }
    if let Some(from) = filter.from {
        query = query.filter(tracer_click_event::Column::ClickedAt.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(tracer_click_event::Column::ClickedAt.lte(to));
    }
    if !filter.include_bots {
        query = query.filter(tracer_click_event::Column::IsLikelyBot.eq(false));
    }
    query
}

/// 追加 clicks / unique_opens / bot_clicks 三列
fn with_metrics(query: Select<tracer_click_event::Entity>) -> Select<tracer_click_event::Entity> {
    query
        .column_as(tracer_click_event::Column::Id.count(), "clicks")
        .column_as(Expr::cust(UNIQUE_OPENS_SQL), "unique_opens")
        .column_as(Expr::cust(BOT_CLICKS_SQL), "bot_clicks")
}

fn with_ranking(
    query: Select<tracer_click_event::Entity>,
    limit: u64,
) -> Select<tracer_click_event::Entity> {
    query
        .column_as(Expr::cust(LAST_CLICK_SQL), "last_click_at")
        .order_by_desc(Expr::cust("clicks"))
        .order_by_desc(Expr::cust("last_click_at"))
        .limit(limit)
}

// ============ SeaOrmStorage Analytics 方法 ============

impl SeaOrmStorage {
    /// 过滤后事件集合上的总体指标
    pub async fn analytics_totals(&self, filter: &AnalyticsFilter) -> Result<ClickMetrics> {
        let db = &self.db;
        let row = retry::with_retry("analytics_totals", self.retry_config, || {
            with_metrics(base_query(filter))
                .into_model::<MetricsRow>()
                .one(db)
        })
        .await?;

        Ok(row.map(|r| r.metrics()).unwrap_or_default())
    }

    /// 按 UTC 日分组，升序
    pub async fn analytics_time_series(
        &self,
        filter: &AnalyticsFilter,
    ) -> Result<Vec<TimeSeriesPoint>> {
        let db = &self.db;
        let rows = retry::with_retry("analytics_time_series", self.retry_config, || {
            with_metrics(base_query(filter))
                .column_as(Expr::cust(DAY_START_SQL), "day_start")
                .group_by(Expr::cust(DAY_START_SQL))
                .order_by_asc(Expr::cust("day_start"))
                .into_model::<DailyMetricsRow>()
                .all(db)
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TimeSeriesPoint {
                day: day_label(r.day_start),
                day_start: r.day_start,
                metrics: ClickMetrics::from_counts(r.clicks, r.unique_opens, r.bot_clicks),
            })
            .collect())
    }

    /// 点击最多的职位（title / employer 由上层补齐）
    pub async fn analytics_top_jobs(&self, filter: &AnalyticsFilter) -> Result<Vec<JobClickSummary>> {
        let db = &self.db;
        let rows = retry::with_retry("analytics_top_jobs", self.retry_config, || {
            with_ranking(
                with_metrics(base_query(filter))
                    .column_as(tracer_link::Column::JobId, "job_id")
                    .group_by(tracer_link::Column::JobId),
                filter.limit,
            )
            .into_model::<JobMetricsRow>()
            .all(db)
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| JobClickSummary {
                job_id: r.job_id,
                title: None,
                employer: None,
                metrics: ClickMetrics::from_counts(r.clicks, r.unique_opens, r.bot_clicks),
                last_click_at: r.last_click_at,
            })
            .collect())
    }

    /// 点击最多的链接
    pub async fn analytics_top_links(
        &self,
        filter: &AnalyticsFilter,
    ) -> Result<Vec<LinkClickSummary>> {
        let rows = self.link_metrics(filter, Some(filter.limit)).await?;

        Ok(rows
            .into_iter()
            .map(|r| LinkClickSummary {
                metrics: ClickMetrics::from_counts(r.clicks, r.unique_opens, r.bot_clicks),
                tracer_link_id: r.tracer_link_id,
                token: r.token,
                job_id: r.job_id,
                title: None,
                employer: None,
                source_path: r.source_path,
                source_label: r.source_label,
                destination_url: r.destination_url,
                last_click_at: r.last_click_at,
            })
            .collect())
    }

    /// 单个职位的全部链接，零点击链接也保留
    pub async fn analytics_job_breakdown(
        &self,
        job_id: &str,
        filter: &AnalyticsFilter,
    ) -> Result<Vec<JobLinkBreakdown>> {
        let links = self.list_job_links(job_id).await?;

        let scoped = AnalyticsFilter {
            job_id: Some(job_id.to_string()),
            ..filter.clone()
        };
        let mut metrics: HashMap<String, LinkMetricsRow> = self
            .link_metrics(&scoped, None)
            .await?
            .into_iter()
            .map(|r| (r.tracer_link_id.clone(), r))
            .collect();

        let mut breakdown: Vec<JobLinkBreakdown> = links
            .into_iter()
            .map(|link| {
                let row = metrics.remove(&link.id);
                JobLinkBreakdown {
                    metrics: row
                        .as_ref()
                        .map(|r| ClickMetrics::from_counts(r.clicks, r.unique_opens, r.bot_clicks))
                        .unwrap_or_default(),
                    last_click_at: row.and_then(|r| r.last_click_at),
                    tracer_link_id: link.id,
                    token: link.token,
                    source_path: link.source_path,
                    source_label: link.source_label,
                    destination_url: link.destination_url,
                    is_active: link.is_active,
                    updated_at: link.updated_at,
                }
            })
            .collect();

        breakdown.sort_by(|a, b| {
            b.metrics
                .clicks
                .cmp(&a.metrics.clicks)
                .then_with(|| b.last_click_at.cmp(&a.last_click_at))
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        Ok(breakdown)
    }

    async fn link_metrics(
        &self,
        filter: &AnalyticsFilter,
        limit: Option<u64>,
    ) -> Result<Vec<LinkMetricsRow>> {
        let db = &self.db;
        let rows = retry::with_retry("analytics_link_metrics", self.retry_config, || {
            let query = with_metrics(base_query(filter))
                .column_as(tracer_link::Column::Id, "tracer_link_id")
                .column_as(tracer_link::Column::Token, "token")
                .column_as(tracer_link::Column::JobId, "job_id")
                .column_as(tracer_link::Column::SourcePath, "source_path")
                .column_as(tracer_link::Column::SourceLabel, "source_label")
                .column_as(tracer_link::Column::DestinationUrl, "destination_url")
                .group_by(tracer_link::Column::Id)
                .group_by(tracer_link::Column::Token)
                .group_by(tracer_link::Column::JobId)
                .group_by(tracer_link::Column::SourcePath)
                .group_by(tracer_link::Column::SourceLabel)
                .group_by(tracer_link::Column::DestinationUrl);

            let query = match limit {
                Some(limit) => with_ranking(query, limit),
                None => query.column_as(Expr::cust(LAST_CLICK_SQL), "last_click_at"),
            };
            query.into_model::<LinkMetricsRow>().all(db)
        })
        .await?;

        Ok(rows)
    }
}
