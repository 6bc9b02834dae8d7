//! # 工具模块
//!
//! 这个模块包含各种工具函数和实用程序：
//!
//! - URL校验、解析和相对地址解析
//! - 代理查询参数的百分号编码
//!
//! # 模块组织
//!
//! - `url` - URL处理工具函数

pub mod url;

// Re-export commonly used items for convenience
pub use url::{encode_uri_component, is_url_and_has_protocol, parse_http_url, resolve_url, Url};
