use std::sync::Arc;
use thiserror::Error;

/// 命令行外壳中可能出现的错误。
///
/// 解析、整理和定位本身不会失败，这里只覆盖文件读写、配置和输出序列化。
#[derive(Debug, Error, Clone)]
pub enum AppError {
    #[error("IO 错误: {0}")]
    Io(Arc<std::io::Error>),

    #[error("配置文件错误: {0}")]
    Ini(Arc<ini::Error>),

    #[error("JSON 序列化错误: {0}")]
    Json(Arc<serde_json::Error>),

    #[error("错误: {0}")]
    Custom(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<ini::Error> for AppError {
    fn from(err: ini::Error) -> Self {
        Self::Ini(Arc::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(Arc::new(err))
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
