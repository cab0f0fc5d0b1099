//! 数据库错误分类与重试
//!
//! - Transient：连接中断、死锁、SQLite BUSY/LOCKED，指数退避后重试
//! - UniqueViolation：唯一约束冲突，交给调用方按业务语义处理（换 token / 重新查询）
//! - Fatal：其余错误，直接返回

use std::future::Future;
use std::time::Duration;

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// 数据库错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient,
    UniqueViolation,
    Fatal,
}

// MySQL 1213/1205, PostgreSQL 40001/40P01, SQLite 5/6
const TRANSIENT_CODES: &[&str] = &["1213", "1205", "40001", "40P01", "5", "6"];

const TRANSIENT_MESSAGES: &[&str] = &[
    "deadlock",
    "lock wait timeout",
    "database is locked",
    "database table is locked",
    "serialization failure",
];

pub fn classify(err: &DbErr) -> ErrorClass {
    if is_unique_violation(err) {
        return ErrorClass::UniqueViolation;
    }

    let transient = match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime) | DbErr::Query(runtime) => is_transient_runtime(runtime),
        _ => false,
    };

    if transient {
        ErrorClass::Transient
    } else {
        ErrorClass::Fatal
    }
}

fn is_transient_runtime(err: &RuntimeErr) -> bool {
    let message = match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            if let Some(code) = sqlx_err
                .as_database_error()
                .and_then(|db_err| db_err.code())
            {
                let code: &str = &code;
                return TRANSIENT_CODES.contains(&code);
            }
            sqlx_err.to_string()
        }
        RuntimeErr::Internal(msg) => msg.clone(),
        #[allow(unreachable_patterns)]
        _ => return false,
    };

    let message = message.to_lowercase();
    TRANSIENT_MESSAGES.iter().any(|m| message.contains(m))
}

/// 是否为唯一约束冲突
pub fn is_unique_violation(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    // sql_err 无法识别 Internal 错误，回退到消息匹配
    let message = err.to_string().to_lowercase();
    message.contains("unique constraint failed") || message.contains("duplicate entry")
}

pub fn is_retryable_error(err: &DbErr) -> bool {
    classify(err) == ErrorClass::Transient
}

/// 重试配置
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl From<&DatabaseConfig> for RetryConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }
}

/// 对 Transient 错误做指数退避重试，其余错误原样返回
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{} succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if classify(&err) != ErrorClass::Transient || attempt >= config.max_retries {
            return Err(err);
        }

        attempt += 1;
        let delay = backoff_delay(attempt, &config);
        warn!(
            "{} failed ({}/{}), retrying in {}ms: {}",
            operation_name,
            attempt,
            config.max_retries + 1,
            delay,
            err
        );
        sleep(Duration::from_millis(delay)).await;
    }
}

/// base * 2^(attempt-1)，上限 max，再加 0-25% 抖动
fn backoff_delay(attempt: u32, config: &RetryConfig) -> u64 {
    let exp = config
        .base_delay_ms
        .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp.min(config.max_delay_ms);
    capped.saturating_add(rand::random_range(0..=capped / 4))
}
