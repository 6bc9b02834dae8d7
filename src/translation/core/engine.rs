//! 翻译引擎核心实现
//!
//! 负责把翻译单元分批发送给 chat completion 后端，并把返回的分段按位置对应回原文。
//!
//! ## 工作流程
//! 1. 按配置的批次大小切分翻译单元
//! 2. 逐个批次串行处理：发送前检查取消令牌，下一批次在上一批次完成后才发出
//! 3. 批次内文本用 `"\n\n---\n\n"` 拼接，嵌入提示词模板
//! 4. 响应按 `"---"` 拆分、去除空白，第 j 段对应批次内第 j 个单元
//! 5. 全部批次完成后按编号升序返回
//!
//! 任何一个批次失败都会终止整个翻译，已经完成的批次结果被丢弃。
//!
//! ## 使用示例
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use page_translator::translation::{
//!     OpenAiCompatibleClient, TranslationConfig, TranslationEngine, TranslationUnit,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TranslationConfig::default();
//! let backend = Arc::new(OpenAiCompatibleClient::new(&config)?);
//! let engine = TranslationEngine::new(config, backend);
//!
//! let units = vec![TranslationUnit { id: 0, text: "Hello".into() }];
//! let results = engine.translate(&units, &CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::translation::{
    config::{constants, TranslationConfig},
    core::service::{ChatCompletion, ChatMessage, ChatRequest},
    error::{TranslationError, TranslationResult},
    pipeline::{Batch, BatchManager, TranslationUnit},
};

/// 一条翻译结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedText {
    pub id: usize,
    pub original: String,
    pub translated: String,
}

/// 翻译引擎
pub struct TranslationEngine {
    config: TranslationConfig,
    backend: Arc<dyn ChatCompletion>,
    batches: BatchManager,
    stats: EngineStats,
}

impl TranslationEngine {
    pub fn new(config: TranslationConfig, backend: Arc<dyn ChatCompletion>) -> Self {
        let batches = BatchManager::new(config.batch_size);
        Self {
            config,
            backend,
            batches,
            stats: EngineStats::default(),
        }
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// 翻译全部单元，返回按编号升序排列的结果
    ///
    /// 取消令牌在每个批次发送前检查，请求进行中被取消时请求立即中止。
    pub async fn translate(
        &self,
        units: &[TranslationUnit],
        token: &CancellationToken,
    ) -> TranslationResult<Vec<TranslatedText>> {
        let batches = self.batches.create_batches(units);
        tracing::info!("开始翻译: {} 个单元，{} 个批次", units.len(), batches.len());

        let mut results = Vec::with_capacity(units.len());
        for batch in &batches {
            if token.is_cancelled() {
                tracing::info!("翻译在批次 {}/{} 之前被取消", batch.id + 1, batches.len());
                return Err(TranslationError::Cancelled);
            }

            tracing::debug!(
                "处理批次 {}/{}: {} 个单元，{} 字符",
                batch.id + 1,
                batches.len(),
                batch.len(),
                batch.char_count()
            );

            let reply = self.request_batch(batch, token).await?;
            let paired = self.pair_segments(batch, &reply)?;

            self.stats.batches_sent.fetch_add(1, Ordering::Relaxed);
            self.stats.units_translated.fetch_add(paired.len(), Ordering::Relaxed);
            results.extend(paired);
        }

        results.sort_by_key(|result| result.id);
        tracing::info!("翻译完成: {}/{} 个单元获得译文", results.len(), units.len());
        Ok(results)
    }

    async fn request_batch(
        &self,
        batch: &Batch,
        token: &CancellationToken,
    ) -> TranslationResult<String> {
        let request = self.build_request(batch);
        let timeout = self.config.batch_timeout();

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::info!("批次 {} 请求进行中被取消", batch.id + 1);
                Err(TranslationError::Cancelled)
            }
            outcome = tokio::time::timeout(timeout, self.backend.complete(request)) => match outcome {
                Ok(reply) => reply,
                Err(_) => {
                    tracing::warn!("批次 {} 请求超时（{}秒）", batch.id + 1, timeout.as_secs());
                    Err(TranslationError::Timeout(timeout))
                }
            },
        }
    }

    /// 构造批次的请求体
    pub fn build_request(&self, batch: &Batch) -> ChatRequest {
        ChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![
                ChatMessage::system(self.system_instruction()),
                ChatMessage::user(self.build_prompt(batch)),
            ],
            temperature: self.config.temperature,
        }
    }

    pub fn system_instruction(&self) -> String {
        format!(
            "You are a professional translator that translates {} to {}.",
            self.config.source_lang, self.config.target_lang
        )
    }

    /// 提示词模板
    pub fn build_prompt(&self, batch: &Batch) -> String {
        format!(
            "You are an excellent translator. Translate the following {source} text into natural {target}.\n\
             Keep HTML tags and special symbols exactly as they are.\n\
             Do not translate the contents of code blocks; output them unchanged.\n\
             Each text is separated by \"{delimiter}\". Return the translations separated by the same delimiter.\n\n\
             {texts}\n",
            source = self.config.source_lang,
            target = self.config.target_lang,
            delimiter = constants::SEGMENT_DELIMITER,
            texts = batch.joined_text(),
        )
    }

    /// 把响应分段按位置对应到批次内的单元
    ///
    /// 分段少于单元时，末尾的单元没有结果；多出的分段被丢弃。
    /// 开启 `strict_segments` 时数量不一致直接返回错误。
    pub fn pair_segments(&self, batch: &Batch, reply: &str) -> TranslationResult<Vec<TranslatedText>> {
        let segments: Vec<&str> = reply
            .split(constants::SEGMENT_DELIMITER)
            .map(str::trim)
            .collect();

        if segments.len() != batch.len() {
            if self.config.strict_segments {
                return Err(TranslationError::SegmentMismatch {
                    expected: batch.len(),
                    actual: segments.len(),
                });
            }
            tracing::warn!(
                "批次 {} 分段数量不匹配: 期望 {}，实际 {}",
                batch.id + 1,
                batch.len(),
                segments.len()
            );
        }

        Ok(batch
            .units
            .iter()
            .zip(segments)
            .map(|(unit, segment)| TranslatedText {
                id: unit.id,
                original: unit.text.clone(),
                translated: segment.to_string(),
            })
            .collect())
    }
}

/// 引擎统计
#[derive(Debug, Default)]
pub struct EngineStats {
    batches_sent: AtomicUsize,
    units_translated: AtomicUsize,
}

impl EngineStats {
    pub fn batches_sent(&self) -> usize {
        self.batches_sent.load(Ordering::Relaxed)
    }

    pub fn units_translated(&self) -> usize {
        self.units_translated.load(Ordering::Relaxed)
    }
}
