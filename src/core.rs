//! 翻译流程编排
//!
//! 一次运行依次经过 获取 → 解析 → 抽取 → 翻译 → 回填，
//! 每次状态变化都会记录日志并通过事件通道通知渲染端。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::network::{FetchError, PageFetcher};
use crate::parsers::html::{parse_html, render_for_display, Node};
use crate::translation::{extract_units, reassemble, TranslationEngine, TranslationError};
use crate::utils::url::parse_http_url;

/// 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Idle,
    Fetching,
    Parsing,
    Extracting,
    Translating,
    Reassembling,
    Done,
    Cancelled,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Done | PipelineState::Cancelled | PipelineState::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Fetching => "fetching",
            PipelineState::Parsing => "parsing",
            PipelineState::Extracting => "extracting",
            PipelineState::Translating => "translating",
            PipelineState::Reassembling => "reassembling",
            PipelineState::Done => "done",
            PipelineState::Cancelled => "cancelled",
            PipelineState::Failed => "failed",
        }
    }
}

/// 运行失败的原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("页面获取失败: {0}")]
    Fetch(FetchError),

    #[error("翻译失败: {0}")]
    Translation(TranslationError),

    /// 用户取消，不作为错误展示
    #[error("翻译已取消")]
    Cancelled,

    #[error("没有可翻译的内容")]
    EmptyContent,
}

impl PipelineError {
    /// 稳定的错误类型标识
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidUrl(_) => "invalid_url",
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Translation(_) => "translation",
            PipelineError::Cancelled => "cancelled",
            PipelineError::EmptyContent => "empty_content",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }

    /// 面向用户的提示
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Cancelled => "翻译已取消。".to_string(),
            PipelineError::InvalidUrl(url) => {
                format!("请输入有效的 URL（以 http:// 或 https:// 开头）: {}", url)
            }
            PipelineError::EmptyContent => "页面中没有找到可翻译的内容。".to_string(),
            PipelineError::Translation(e) if e.is_api_error() => {
                format!("{}\n请检查接口地址、模型名称和 API 密钥设置。", e)
            }
            other => format!("处理失败: {}", other),
        }
    }
}

impl From<FetchError> for PipelineError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::InvalidUrl(url) => PipelineError::InvalidUrl(url),
            FetchError::Cancelled => PipelineError::Cancelled,
            other => PipelineError::Fetch(other),
        }
    }
}

impl From<TranslationError> for PipelineError {
    fn from(error: TranslationError) -> Self {
        match error {
            TranslationError::Cancelled => PipelineError::Cancelled,
            other => PipelineError::Translation(other),
        }
    }
}

/// 发给渲染端的事件
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StateChanged(PipelineState),
    /// 抽取完成后的原始文档树
    OriginalReady(Node),
    TranslatedReady(Node),
    Finished(PipelineState),
}

/// 一次成功运行的结果
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub url: Url,
    pub original: Node,
    pub translated: Node,
    /// 抽取到的翻译单元数量
    pub units: usize,
    /// 获得译文的单元数量
    pub translated_units: usize,
}

impl PipelineOutput {
    /// 用于展示的原文 HTML
    pub fn original_html(&self) -> String {
        render_for_display(&self.original, Some(&self.url))
    }

    pub fn translated_html(&self) -> String {
        render_for_display(&self.translated, Some(&self.url))
    }
}

/// 翻译流程
///
/// `run` 需要 `&mut self`，同一个实例上的运行不会交错。
/// 需要并发运行时为每次运行创建新的实例，由 [`RunController`] 保证只有一个在进行。
pub struct Pipeline {
    fetcher: Arc<PageFetcher>,
    engine: TranslationEngine,
    events: Option<UnboundedSender<PipelineEvent>>,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(fetcher: Arc<PageFetcher>, engine: TranslationEngine) -> Self {
        Self {
            fetcher,
            engine,
            events: None,
            state: PipelineState::Idle,
        }
    }

    pub fn with_events(mut self, events: UnboundedSender<PipelineEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// 执行一次完整的运行
    pub async fn run(
        &mut self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<PipelineOutput, PipelineError> {
        let result = self.execute(url, token).await;

        let terminal = match &result {
            Ok(output) => {
                tracing::info!(
                    "翻译流程完成: {}（{}/{} 个单元）",
                    output.url,
                    output.translated_units,
                    output.units
                );
                PipelineState::Done
            }
            Err(e) if e.is_cancelled() => {
                tracing::info!("翻译流程已取消: {}", url);
                PipelineState::Cancelled
            }
            Err(e) => {
                tracing::error!("翻译流程失败 ({}): {}", e.kind(), e);
                PipelineState::Failed
            }
        };

        self.transition(terminal);
        self.emit(PipelineEvent::Finished(terminal));
        result
    }

    async fn execute(
        &mut self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<PipelineOutput, PipelineError> {
        self.transition(PipelineState::Fetching);
        let page_url =
            parse_http_url(url).ok_or_else(|| PipelineError::InvalidUrl(url.to_string()))?;
        let markup = self.fetcher.fetch(page_url.as_str(), token).await?;
        if token.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        self.transition(PipelineState::Parsing);
        let mut original = parse_html(&markup);

        self.transition(PipelineState::Extracting);
        let units = extract_units(&mut original);
        self.emit(PipelineEvent::OriginalReady(original.clone()));
        if units.is_empty() {
            return Err(PipelineError::EmptyContent);
        }

        self.transition(PipelineState::Translating);
        let results = self.engine.translate(&units, token).await?;

        self.transition(PipelineState::Reassembling);
        let translated = reassemble(&original, &results);
        self.emit(PipelineEvent::TranslatedReady(translated.clone()));

        Ok(PipelineOutput {
            url: page_url,
            original,
            translated,
            units: units.len(),
            translated_units: results.len(),
        })
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::info!("状态变化: {} -> {}", self.state.as_str(), next.as_str());
        self.state = next;
        self.emit(PipelineEvent::StateChanged(next));
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(events) = &self.events {
            // 接收端已关闭时忽略
            let _ = events.send(event);
        }
    }
}

/// 当前运行的句柄
#[derive(Debug, Clone)]
pub struct RunHandle {
    pub id: u64,
    pub url: String,
    pub token: CancellationToken,
}

/// 保证同一时间最多只有一个运行在进行
///
/// 开始新运行时会先取消正在进行的运行。
#[derive(Debug, Default)]
pub struct RunController {
    next_id: AtomicU64,
    current: Mutex<Option<RunHandle>>,
}

impl RunController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, url: &str) -> RunHandle {
        let handle = RunHandle {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            url: url.to_string(),
            token: CancellationToken::new(),
        };

        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.replace(handle.clone()) {
            tracing::info!("新的运行开始，取消之前的运行: {}", previous.url);
            previous.token.cancel();
        }
        handle
    }

    /// 取消当前运行，没有运行时返回 false
    pub fn cancel(&self) -> bool {
        match self.current.lock().unwrap_or_else(|e| e.into_inner()).take() {
            Some(handle) => {
                tracing::info!("取消运行: {}", handle.url);
                handle.token.cancel();
                true
            }
            None => false,
        }
    }

    /// 开始新运行，返回的守卫在离开作用域时清除句柄
    pub fn begin(&self, url: &str) -> ActiveRun<'_> {
        ActiveRun {
            handle: self.start(url),
            runs: self,
        }
    }

    /// 运行结束后清除句柄；已经被新运行替换时不做任何事
    pub fn finish(&self, handle: &RunHandle) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if current.as_ref().map(|h| h.id) == Some(handle.id) {
            *current = None;
        }
    }

    pub fn current_url(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|h| h.url.clone())
    }
}

/// 正在进行的运行，drop 时调用 [`RunController::finish`]
///
/// 请求处理被中途丢弃时句柄也会被清除。
pub struct ActiveRun<'a> {
    handle: RunHandle,
    runs: &'a RunController,
}

impl ActiveRun<'_> {
    pub fn token(&self) -> &CancellationToken {
        &self.handle.token
    }

    pub fn id(&self) -> u64 {
        self.handle.id
    }
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        self.runs.finish(&self.handle);
    }
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Prints an error message to stderr
pub fn print_error_message(msg: &str, color: bool) {
    if color {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}

/// Prints an info message to stderr
pub fn print_info_message(msg: &str) {
    eprintln!("{msg}");
}
