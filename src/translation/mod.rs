//! 翻译模块
//!
//! - **pipeline**: 文本收集、批次切分和译文回填
//! - **core**: 翻译引擎和 chat completion 后端
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use page_translator::parsers::parse_html;
//! use page_translator::translation::{
//!     extract_units, reassemble, OpenAiCompatibleClient, TranslationConfig, TranslationEngine,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TranslationConfig::load()?;
//! let backend = Arc::new(OpenAiCompatibleClient::new(&config)?);
//! let engine = TranslationEngine::new(config, backend);
//!
//! let mut original = parse_html("<body><p>Hello</p></body>");
//! let units = extract_units(&mut original);
//! let results = engine.translate(&units, &CancellationToken::new()).await?;
//! let translated = reassemble(&original, &results);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;

pub use config::TranslationConfig;
pub use self::core::{
    ChatCompletion, ChatMessage, ChatRequest, OpenAiCompatibleClient, TranslatedText,
    TranslationEngine,
};
pub use error::{ErrorCategory, TranslationError, TranslationResult};
pub use pipeline::{extract_units, reassemble, Batch, BatchManager, TranslationUnit};
