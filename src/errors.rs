use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum TracerError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    FileOperation(String),
    Config(String),
    TokenSpaceExhausted(String),
}

impl TracerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            TracerError::DatabaseConfig(_) => "E001",
            TracerError::DatabaseConnection(_) => "E002",
            TracerError::DatabaseOperation(_) => "E003",
            TracerError::Validation(_) => "E004",
            TracerError::NotFound(_) => "E005",
            TracerError::Serialization(_) => "E006",
            TracerError::FileOperation(_) => "E007",
            TracerError::Config(_) => "E008",
            TracerError::TokenSpaceExhausted(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            TracerError::DatabaseConfig(_) => "Database Configuration Error",
            TracerError::DatabaseConnection(_) => "Database Connection Error",
            TracerError::DatabaseOperation(_) => "Database Operation Error",
            TracerError::Validation(_) => "Validation Error",
            TracerError::NotFound(_) => "Resource Not Found",
            TracerError::Serialization(_) => "Serialization Error",
            TracerError::FileOperation(_) => "File Operation Error",
            TracerError::Config(_) => "Configuration Error",
            TracerError::TokenSpaceExhausted(_) => "Token Space Exhausted",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            TracerError::DatabaseConfig(msg)
            | TracerError::DatabaseConnection(msg)
            | TracerError::DatabaseOperation(msg)
            | TracerError::Validation(msg)
            | TracerError::NotFound(msg)
            | TracerError::Serialization(msg)
            | TracerError::FileOperation(msg)
            | TracerError::Config(msg)
            | TracerError::TokenSpaceExhausted(msg) => msg,
        }
    }

    /// HTTP status the API layer reports for this error
    pub fn http_status(&self) -> StatusCode {
        match self {
            TracerError::Validation(_) => StatusCode::BAD_REQUEST,
            TracerError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for TracerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TracerError {}

// 便捷的构造函数
impl TracerError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        TracerError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        TracerError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        TracerError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        TracerError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        TracerError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        TracerError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        TracerError::FileOperation(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        TracerError::Config(msg.into())
    }

    pub fn token_space_exhausted<T: Into<String>>(msg: T) -> Self {
        TracerError::TokenSpaceExhausted(msg.into())
    }
}

impl From<sea_orm::DbErr> for TracerError {
    fn from(err: sea_orm::DbErr) -> Self {
        TracerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for TracerError {
    fn from(err: std::io::Error) -> Self {
        TracerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for TracerError {
    fn from(err: serde_json::Error) -> Self {
        TracerError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TracerError>;
