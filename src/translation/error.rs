//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use std::time::Duration;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// 接口返回非成功状态
    #[error("API错误: {message}")]
    Api { status: u16, message: String },

    /// 网络错误
    #[error("网络错误: {0}")]
    Network(String),

    /// 单次请求超时
    #[error("API请求超时（{}秒）", .0.as_secs())]
    Timeout(Duration),

    /// 响应格式无法识别
    #[error("响应格式无效: {0}")]
    InvalidResponse(String),

    /// 严格模式下分段数量与批次单元数量不一致
    #[error("分段数量不匹配: 期望 {expected} 段，实际 {actual} 段")]
    SegmentMismatch { expected: usize, actual: usize },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 用户取消
    #[error("翻译已取消")]
    Cancelled,
}

impl TranslationError {
    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::Api { .. } => ErrorCategory::Service,
            TranslationError::Network(_) => ErrorCategory::Network,
            TranslationError::Timeout(_) => ErrorCategory::Timeout,
            TranslationError::InvalidResponse(_) => ErrorCategory::Parsing,
            TranslationError::SegmentMismatch { .. } => ErrorCategory::Processing,
            TranslationError::Config(_) => ErrorCategory::Configuration,
            TranslationError::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// 是否为接口返回的错误（需要提示用户检查配置）
    pub fn is_api_error(&self) -> bool {
        matches!(self, TranslationError::Api { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TranslationError::Cancelled)
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Service,
    Timeout,
    Parsing,
    Processing,
    Cancelled,
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            TranslationError::InvalidResponse(error.to_string())
        } else {
            TranslationError::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::InvalidResponse(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::Config(format!("TOML解析错误: {}", error))
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;
