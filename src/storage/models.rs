use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// (job, source path, destination) -> public token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracerLink {
    pub id: String,
    pub token: String,
    pub job_id: String,
    pub source_path: String,
    pub source_label: String,
    pub destination_url: String,
    pub destination_url_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// get-or-create 的输入
#[derive(Debug, Clone)]
pub struct NewTracerLink {
    pub job_id: String,
    pub source_path: String,
    pub source_label: String,
    pub destination_url: String,
    pub destination_url_hash: String,
    /// 通常为公司名，为空时使用默认 slug
    pub slug_prefix_seed: Option<String>,
}

/// Token 发放参数
#[derive(Debug, Clone)]
pub struct IssueOptions {
    pub max_attempts: u32,
    pub default_slug: String,
}

impl Default for IssueOptions {
    fn default() -> Self {
        Self {
            max_attempts: 800,
            default_slug: "resume".to_string(),
        }
    }
}

impl From<&crate::config::TracerConfig> for IssueOptions {
    fn from(config: &crate::config::TracerConfig) -> Self {
        Self {
            max_attempts: config.token_max_attempts,
            default_slug: config.default_slug.clone(),
        }
    }
}

/// 待写入的点击事件（已泛化 / 哈希）
#[derive(Debug, Clone)]
pub struct NewClickEvent {
    pub tracer_link_id: String,
    pub clicked_at: i64,
    pub request_id: Option<String>,
    pub is_likely_bot: bool,
    pub device_type: String,
    pub ua_family: String,
    pub os_family: String,
    pub referrer_host: Option<String>,
    pub ip_hash: Option<String>,
    pub unique_fingerprint_hash: Option<String>,
}

/// 已持久化的点击事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub id: i64,
    pub tracer_link_id: String,
    pub clicked_at: i64,
    pub request_id: Option<String>,
    pub is_likely_bot: bool,
    pub device_type: String,
    pub ua_family: String,
    pub os_family: String,
    pub referrer_host: Option<String>,
    pub ip_hash: Option<String>,
    pub unique_fingerprint_hash: Option<String>,
}

/// Analytics 查询过滤条件
///
/// `from` / `to` 为闭区间 unix 秒
#[derive(Debug, Clone)]
pub struct AnalyticsFilter {
    pub job_id: Option<String>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub include_bots: bool,
    pub limit: u64,
}

pub const DEFAULT_ANALYTICS_LIMIT: u64 = 20;
pub const MAX_ANALYTICS_LIMIT: u64 = 500;

impl Default for AnalyticsFilter {
    fn default() -> Self {
        Self {
            job_id: None,
            from: None,
            to: None,
            include_bots: false,
            limit: DEFAULT_ANALYTICS_LIMIT,
        }
    }
}

impl AnalyticsFilter {
    pub fn for_job(job_id: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id.into()),
            ..Default::default()
        }
    }
}

/// 四个基础指标
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickMetrics {
    pub clicks: u64,
    pub unique_opens: u64,
    pub bot_clicks: u64,
    pub human_clicks: u64,
}

impl ClickMetrics {
    pub fn from_counts(clicks: i64, unique_opens: i64, bot_clicks: i64) -> Self {
        let clicks = clicks.max(0) as u64;
        let bot_clicks = bot_clicks.max(0) as u64;
        Self {
            clicks,
            unique_opens: unique_opens.max(0) as u64,
            bot_clicks,
            human_clicks: clicks.saturating_sub(bot_clicks),
        }
    }
}

/// 按 UTC 日聚合的数据点
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    /// `YYYY-MM-DD`
    pub day: String,
    /// 当日 00:00 UTC 的 unix 秒
    pub day_start: i64,
    #[serde(flatten)]
    pub metrics: ClickMetrics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobClickSummary {
    pub job_id: String,
    pub title: Option<String>,
    pub employer: Option<String>,
    #[serde(flatten)]
    pub metrics: ClickMetrics,
    pub last_click_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkClickSummary {
    pub tracer_link_id: String,
    pub token: String,
    pub job_id: String,
    /// 由 JobDirectory 补齐
    pub title: Option<String>,
    pub employer: Option<String>,
    pub source_path: String,
    pub source_label: String,
    pub destination_url: String,
    #[serde(flatten)]
    pub metrics: ClickMetrics,
    pub last_click_at: Option<i64>,
}

/// 单个职位下的链接明细（包括零点击链接）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobLinkBreakdown {
    pub tracer_link_id: String,
    pub token: String,
    pub source_path: String,
    pub source_label: String,
    pub destination_url: String,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub metrics: ClickMetrics,
    pub last_click_at: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
}
