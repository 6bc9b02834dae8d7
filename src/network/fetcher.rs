//! 页面获取器
//!
//! 按顺序尝试各个获取方式，第一个成功的结果即为页面内容。
//! 每个方式都有独立的超时；整条链路另有一个整体超时。
//! 所有方式都失败时只返回最后一个方式的错误，之前的错误只记录日志。

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::utils::url::parse_http_url;

use super::error::{FetchError, FetchResult};
use super::strategies::{
    build_client, AllOriginsStrategy, CorsProxyStrategy, DirectStrategy, FetchStrategy,
};

pub const DEFAULT_ALLORIGINS_ENDPOINT: &str = "https://api.allorigins.win/get";
pub const DEFAULT_CORSPROXY_ENDPOINT: &str = "https://corsproxy.io/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// 获取器配置
#[derive(Debug, Clone, PartialEq)]
pub struct FetcherConfig {
    pub direct_timeout: Duration,
    pub proxy_timeout: Duration,
    /// 整条获取链路的超时
    pub overall_timeout: Duration,
    pub max_redirects: usize,
    pub allorigins_endpoint: String,
    pub corsproxy_endpoint: String,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            direct_timeout: Duration::from_secs(15),
            proxy_timeout: Duration::from_secs(15),
            overall_timeout: Duration::from_secs(60),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            allorigins_endpoint: DEFAULT_ALLORIGINS_ENDPOINT.to_string(),
            corsproxy_endpoint: DEFAULT_CORSPROXY_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    /// 默认配置叠加环境变量
    pub fn from_env() -> Self {
        use crate::env::{fetch, override_value};

        let mut config = Self::default();
        if let Some(timeout) = override_value::<_, fetch::DirectTimeout>() {
            config.direct_timeout = timeout;
        }
        if let Some(timeout) = override_value::<_, fetch::ProxyTimeout>() {
            config.proxy_timeout = timeout;
        }
        if let Some(timeout) = override_value::<_, fetch::OverallTimeout>() {
            config.overall_timeout = timeout;
        }
        if let Some(endpoint) = override_value::<_, fetch::AllOriginsEndpoint>() {
            config.allorigins_endpoint = endpoint;
        }
        if let Some(endpoint) = override_value::<_, fetch::CorsProxyEndpoint>() {
            config.corsproxy_endpoint = endpoint;
        }
        if let Some(user_agent) = override_value::<_, fetch::UserAgent>() {
            config.user_agent = user_agent;
        }
        config
    }
}

/// 页面获取器
pub struct PageFetcher {
    strategies: Vec<Box<dyn FetchStrategy>>,
    overall_timeout: Duration,
}

impl PageFetcher {
    /// 按默认顺序创建三种获取方式：直连、JSON 包装代理、原样代理
    pub fn new(config: &FetcherConfig) -> FetchResult<Self> {
        let client = build_client(&config.user_agent)?;

        let strategies: Vec<Box<dyn FetchStrategy>> = vec![
            Box::new(DirectStrategy::new(
                client.clone(),
                config.direct_timeout,
                config.max_redirects,
            )),
            Box::new(AllOriginsStrategy::new(
                client.clone(),
                config.allorigins_endpoint.clone(),
                config.proxy_timeout,
            )),
            Box::new(CorsProxyStrategy::new(
                client,
                config.corsproxy_endpoint.clone(),
                config.proxy_timeout,
            )),
        ];

        Ok(Self::with_strategies(strategies, config.overall_timeout))
    }

    /// 使用自定义的获取方式列表
    pub fn with_strategies(strategies: Vec<Box<dyn FetchStrategy>>, overall_timeout: Duration) -> Self {
        Self {
            strategies,
            overall_timeout,
        }
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// 获取页面内容
    ///
    /// URL 不是合法的 http/https 绝对地址时，在任何网络请求之前返回 `InvalidUrl`。
    pub async fn fetch(&self, url: &str, token: &CancellationToken) -> FetchResult<String> {
        let target = parse_http_url(url).ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;
        tracing::info!("获取页面: {}", target);

        match tokio::time::timeout(self.overall_timeout, self.try_strategies(&target, token)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("页面获取超时（{}秒）", self.overall_timeout.as_secs());
                Err(FetchError::Timeout {
                    after: self.overall_timeout,
                })
            }
        }
    }

    async fn try_strategies(
        &self,
        target: &url::Url,
        token: &CancellationToken,
    ) -> FetchResult<String> {
        let total = self.strategies.len();
        let mut last_error = None;

        for (index, strategy) in self.strategies.iter().enumerate() {
            if token.is_cancelled() {
                return Err(FetchError::Cancelled);
            }

            tracing::info!("尝试获取方式 {}/{}: {}", index + 1, total, strategy.name());
            let timeout = strategy.timeout();
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::info!("页面获取被取消");
                    return Err(FetchError::Cancelled);
                }
                attempt = tokio::time::timeout(timeout, strategy.fetch(target)) => match attempt {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout { after: timeout }),
                },
            };

            match outcome {
                Ok(content) if content.is_empty() => {
                    tracing::warn!("获取方式 {} 返回空内容", index + 1);
                    last_error = Some(FetchError::EmptyContent);
                }
                Ok(content) => {
                    tracing::info!(
                        "获取方式 {} ({}) 成功，内容长度: {}",
                        index + 1,
                        strategy.name(),
                        content.len()
                    );
                    return Ok(content);
                }
                Err(e) => {
                    tracing::warn!("获取方式 {} ({}) 失败: {}", index + 1, strategy.name(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| FetchError::Network("没有可用的获取方式".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed {
        outcome: FetchResult<String>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl FetchStrategy for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        async fn fetch(&self, _url: &url::Url) -> FetchResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn fixed(outcome: FetchResult<String>, calls: &Arc<AtomicUsize>) -> Box<dyn FetchStrategy> {
        Box::new(Fixed {
            outcome,
            calls: calls.clone(),
        })
    }

    #[tokio::test]
    async fn invalid_url_fails_before_any_strategy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = PageFetcher::with_strategies(
            vec![fixed(Ok("<html></html>".into()), &calls)],
            Duration::from_secs(5),
        );

        for bad in ["not a url", "ftp://example.com/file", "/relative"] {
            let err = fetcher.fetch(bad, &CancellationToken::new()).await.unwrap_err();
            assert!(matches!(err, FetchError::InvalidUrl(_)), "{bad}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_content_falls_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = PageFetcher::with_strategies(
            vec![fixed(Ok(String::new()), &calls), fixed(Ok("<p>ok</p>".into()), &calls)],
            Duration::from_secs(5),
        );

        let html = fetcher
            .fetch("https://example.com", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(html, "<p>ok</p>");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn all_failures_surface_last_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = PageFetcher::with_strategies(
            vec![
                fixed(Err(FetchError::Network("refused".into())), &calls),
                fixed(Err(FetchError::Status { status: 403 }), &calls),
                fixed(Err(FetchError::Status { status: 502 }), &calls),
            ],
            Duration::from_secs(5),
        );

        let err = fetcher
            .fetch("https://example.com", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Status { status: 502 });
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cancelled_token_stops_the_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = PageFetcher::with_strategies(
            vec![fixed(Ok("x".into()), &calls)],
            Duration::from_secs(5),
        );
        let token = CancellationToken::new();
        token.cancel();

        let err = fetcher.fetch("https://example.com", &token).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn default_chain_order() {
        let fetcher = PageFetcher::new(&FetcherConfig::default()).unwrap();
        assert_eq!(fetcher.strategy_names(), vec!["direct", "allorigins", "corsproxy"]);
    }
}
