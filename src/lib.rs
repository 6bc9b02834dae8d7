//! # Page Translator Library
//!
//! 获取网页，把可翻译的文本分批交给 LLM 翻译接口，再按原有结构回填译文，用于原文和译文的并排展示。
//!
//! ## 模块组织
//!
//! - `network` - 多种获取方式依次尝试的页面获取器
//! - `parsers` - 文档结构模型、HTML 解析和序列化
//! - `translation` - 文本收集、批次翻译和译文回填
//! - `core` - 翻译流程编排、运行状态和取消
//! - `env` - 类型安全的环境变量
//! - `logging` - 日志初始化
//! - `utils` - 工具函数
//! - `web` - Web服务器功能（可选）

pub mod core;
pub mod env;
pub mod logging;
pub mod network;
pub mod parsers;
pub mod translation;
pub mod utils;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used items for convenience
pub use self::core::{
    ActiveRun, Pipeline, PipelineError, PipelineEvent, PipelineOutput, PipelineState, RunController,
    RunHandle,
};
pub use network::{FetchError, FetcherConfig, PageFetcher};
pub use parsers::{parse_html, render_for_display, serialize_node, Node, NodeKind};
pub use translation::{TranslationConfig, TranslationEngine, TranslationError};
