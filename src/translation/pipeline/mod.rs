//! 翻译管道模块
//!
//! 文本收集、批次切分和译文回填

pub mod batch;
pub mod collector;
pub mod reassembler;

// 重新导出主要类型
pub use batch::{Batch, BatchManager};
pub use collector::{extract_units, TextCollector, TranslationUnit};
pub use reassembler::reassemble;
