// 集成测试公共模块
//
// 提供测试辅助工具和共享功能

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use page_translator::network::{FetchError, FetchResult, FetchStrategy, PageFetcher};
use page_translator::translation::{
    ChatCompletion, ChatRequest, TranslationConfig, TranslationResult, TranslationUnit,
};
use page_translator::utils::Url;

/// 一次后端调用的记录
#[derive(Debug, Clone)]
pub struct CallRecord {
    pub request: ChatRequest,
    pub started: Instant,
    pub finished: Instant,
}

impl CallRecord {
    pub fn prompt(&self) -> &str {
        &self.request.messages[1].content
    }
}

/// 按顺序返回预设回复的翻译后端，并记录每次调用的时间
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<TranslationResult<String>>>,
    calls: Mutex<Vec<CallRecord>>,
    delay: Duration,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl ScriptedCompletion {
    pub fn new(replies: Vec<TranslationResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
            delay: Duration::from_millis(0),
            cancel_after: None,
        }
    }

    pub fn ok(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    /// 每次调用都等待一段时间再返回
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// 第 n 次调用返回前取消令牌
    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedCompletion {
    async fn complete(&self, request: ChatRequest) -> TranslationResult<String> {
        let started = Instant::now();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()));

        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(CallRecord {
                request,
                started,
                finished: Instant::now(),
            });
            calls.len()
        };

        if let Some((after, token)) = &self.cancel_after {
            if count == *after {
                token.cancel();
            }
        }

        reply
    }
}

/// 返回固定结果的获取方式
pub struct StubStrategy {
    name: String,
    outcome: FetchResult<String>,
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl StubStrategy {
    pub fn ok(name: &str, html: &str) -> Self {
        Self::new(name, Ok(html.to_string()))
    }

    pub fn failing(name: &str, error: FetchError) -> Self {
        Self::new(name, Err(error))
    }

    fn new(name: &str, outcome: FetchResult<String>) -> Self {
        Self {
            name: name.to_string(),
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
            delay: Duration::from_millis(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl FetchStrategy for StubStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn fetch(&self, _url: &Url) -> FetchResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

/// 只有一个获取方式、总是返回给定页面的获取器
pub fn fetcher_serving(html: &str) -> Arc<PageFetcher> {
    Arc::new(PageFetcher::with_strategies(
        vec![Box::new(StubStrategy::ok("stub", html))],
        Duration::from_secs(10),
    ))
}

/// HTML 测试样例
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    pub fn scenario_page() -> &'static str {
        "<body><p>Hello</p><pre>code</pre><p>World</p></body>"
    }

    pub fn article_page() -> &'static str {
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Test Page</title>
    <style>body { color: red; }</style>
</head>
<body>
    <!-- navigation -->
    <nav><a href="/">Home</a> <a href="/docs" title="Docs">Docs</a></nav>
    <h1 id="top">Welcome to Test</h1>
    <p>This is a <strong>test</strong> paragraph.</p>
    <pre><code>fn main() { println!("hi"); }</code></pre>
    <ul>
        <li>First item</li>
        <li>Second item</li>
    </ul>
    <img src="/logo.png" alt="logo">
    <script>console.log("x < y");</script>
    <p>Last words</p>
</body>
</html>"#
    }

    pub fn code_only_page() -> &'static str {
        "<html><body><pre>let x = 1;</pre><script>run()</script>\n  \n</body></html>"
    }
}

/// 测试数据生成
pub struct TestDataGenerator;

impl TestDataGenerator {
    pub fn units(count: usize) -> Vec<TranslationUnit> {
        (0..count)
            .map(|id| TranslationUnit {
                id,
                text: format!("Sentence {}", id),
            })
            .collect()
    }

    /// 把给定单元全部“翻译”后用分隔符拼接的回复
    pub fn reply_for(units: &[TranslationUnit]) -> String {
        units
            .iter()
            .map(|unit| format!("訳 {}", unit.text))
            .collect::<Vec<_>>()
            .join("\n---\n")
    }

    /// 按批次大小为全部单元生成回复
    pub fn replies_for(units: &[TranslationUnit], batch_size: usize) -> Vec<String> {
        units.chunks(batch_size).map(Self::reply_for).collect()
    }
}

/// 测试用的翻译配置
pub fn test_config() -> TranslationConfig {
    TranslationConfig {
        base_url: "http://127.0.0.1:9/v1".to_string(),
        model_name: "test-model".to_string(),
        api_key: "test-key".to_string(),
        batch_timeout_secs: 5,
        ..TranslationConfig::default()
    }
}
