//! 翻译批次管理器模块
//!
//! 将翻译单元按原始顺序切分为固定大小的连续批次，最后一个批次可以更小。
//!
//! ```rust
//! use page_translator::translation::pipeline::{BatchManager, TranslationUnit};
//!
//! let units: Vec<TranslationUnit> = (0..23)
//!     .map(|id| TranslationUnit { id, text: format!("text {id}") })
//!     .collect();
//! let batches = BatchManager::new(10).create_batches(&units);
//! assert_eq!(batches.len(), 3);
//! assert_eq!(batches[2].units.len(), 3);
//! ```

use crate::translation::config::constants;

use super::collector::TranslationUnit;

/// 翻译批次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 批次序号，从 0 开始
    pub id: usize,
    pub units: Vec<TranslationUnit>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// 用固定分隔符拼接批次内的文本
    pub fn joined_text(&self) -> String {
        self.units
            .iter()
            .map(|unit| unit.text.as_str())
            .collect::<Vec<_>>()
            .join(constants::SEGMENT_JOINER)
    }

    pub fn char_count(&self) -> usize {
        self.units.iter().map(|unit| unit.text.chars().count()).sum()
    }
}

/// 批次管理器
#[derive(Debug, Clone, Copy)]
pub struct BatchManager {
    batch_size: usize,
}

impl Default for BatchManager {
    fn default() -> Self {
        Self::new(constants::DEFAULT_BATCH_SIZE)
    }
}

impl BatchManager {
    /// 批次大小为 0 时按 1 处理
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn create_batches(&self, units: &[TranslationUnit]) -> Vec<Batch> {
        let batches: Vec<Batch> = units
            .chunks(self.batch_size)
            .enumerate()
            .map(|(id, chunk)| Batch {
                id,
                units: chunk.to_vec(),
            })
            .collect();

        tracing::debug!(
            "{} 个翻译单元分为 {} 个批次（每批最多 {} 个）",
            units.len(),
            batches.len(),
            self.batch_size
        );
        batches
    }
}
