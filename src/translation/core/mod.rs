//! 翻译系统核心模块
//!
//! - **服务层** (`service.rs`): chat completion 后端接口及 OpenAI 兼容实现
//! - **引擎层** (`engine.rs`): 批次串行调度、取消、超时和分段对应
//!
//! ```text
//! TranslationEngine (engine.rs)
//!     ├── BatchManager (pipeline/batch.rs)
//!     └── dyn ChatCompletion (service.rs)
//!             └── OpenAiCompatibleClient
//! ```

pub mod engine;
pub mod service;

pub use engine::{EngineStats, TranslatedText, TranslationEngine};
pub use service::{ChatCompletion, ChatMessage, ChatRequest, OpenAiCompatibleClient};
