//! # 网络模块
//!
//! 页面获取：
//!
//! - `fetcher` - 按顺序尝试多种获取方式的页面获取器
//! - `strategies` - 直连、JSON 包装代理、原样代理三种获取方式
//! - `error` - 获取错误类型

pub mod error;
pub mod fetcher;
pub mod strategies;

// Re-export commonly used items for convenience
pub use error::{FetchError, FetchResult};
pub use fetcher::{FetcherConfig, PageFetcher};
pub use strategies::{AllOriginsStrategy, CorsProxyStrategy, DirectStrategy, FetchStrategy};
