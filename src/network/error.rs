//! 页面获取错误

use std::time::Duration;

use thiserror::Error;

/// 页面获取错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// URL 格式错误或不是 http/https
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// 目标返回非成功状态码
    #[error("Request failed with status code {status}")]
    Status { status: u16 },

    #[error("网络错误: {0}")]
    Network(String),

    /// 超时与 HTTP 错误区分开
    #[error("请求超时（{}秒）", .after.as_secs())]
    Timeout { after: Duration },

    /// 代理返回的内容无法识别
    #[error("响应无效: {0}")]
    InvalidResponse(String),

    #[error("Empty content received")]
    EmptyContent,

    #[error("重定向次数过多（超过 {0} 次）")]
    TooManyRedirects(usize),

    #[error("页面获取已取消")]
    Cancelled,
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    /// 错误名称，随 Web 接口的错误响应返回
    pub fn name(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl(_) => "InvalidUrlError",
            FetchError::Timeout { .. } => "TimeoutError",
            FetchError::Cancelled => "CancelledError",
            _ => "FetchError",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            FetchError::InvalidResponse(error.to_string())
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_distinct_from_http_errors() {
        let timeout = FetchError::Timeout {
            after: Duration::from_secs(15),
        };
        let status = FetchError::Status { status: 504 };

        assert!(timeout.is_timeout());
        assert!(!status.is_timeout());
        assert_eq!(timeout.name(), "TimeoutError");
        assert_eq!(status.name(), "FetchError");
        assert_eq!(status.to_string(), "Request failed with status code 504");
    }
}
