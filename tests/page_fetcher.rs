//! 页面获取集成测试
//!
//! 用 wiremock 模拟目标站点和两种代理

use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use page_translator::network::fetcher::DEFAULT_USER_AGENT;
use page_translator::network::strategies::build_client;
use page_translator::network::{
    DirectStrategy, FetchError, FetchStrategy, FetcherConfig, PageFetcher,
};
use page_translator::utils::Url;

const PAGE: &str = "<html><body><p>Hello</p></body></html>";

fn config_for(server: &MockServer) -> FetcherConfig {
    FetcherConfig {
        direct_timeout: Duration::from_secs(2),
        proxy_timeout: Duration::from_secs(2),
        overall_timeout: Duration::from_secs(10),
        allorigins_endpoint: format!("{}/get", server.uri()),
        corsproxy_endpoint: format!("{}/raw", server.uri()),
        ..FetcherConfig::default()
    }
}

fn direct_only(timeout: Duration, max_redirects: usize) -> PageFetcher {
    let client = build_client(DEFAULT_USER_AGENT).unwrap();
    PageFetcher::with_strategies(
        vec![Box::new(DirectStrategy::new(client, timeout, max_redirects))],
        Duration::from_secs(10),
    )
}

/// 直连成功时不访问代理，并带上浏览器请求头
#[tokio::test]
async fn test_direct_fetch_with_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .and(header("accept-language", "en-US,en;q=0.5"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/get"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(&config_for(&server)).unwrap();
    let html = fetcher
        .fetch(&format!("{}/page", server.uri()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(html, PAGE);
}

/// 直连失败后使用 JSON 包装代理的 contents 字段
#[tokio::test]
async fn test_falls_back_to_json_proxy() {
    let server = MockServer::start().await;
    let target = format!("{}/page", server.uri());

    Mock::given(path("/page"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/get"))
        .and(query_param("url", target.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "contents": PAGE })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(&config_for(&server)).unwrap();
    let html = fetcher.fetch(&target, &CancellationToken::new()).await.unwrap();

    assert_eq!(html, PAGE);
}

/// JSON 代理缺少内容时继续尝试原样代理
#[tokio::test]
async fn test_falls_back_to_raw_proxy() {
    let server = MockServer::start().await;
    let target = format!("{}/page", server.uri());

    Mock::given(path("/page"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "contents": null })))
        .mount(&server)
        .await;
    Mock::given(path("/raw"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(&config_for(&server)).unwrap();
    let html = fetcher.fetch(&target, &CancellationToken::new()).await.unwrap();

    assert_eq!(html, PAGE);
    let requests = server.received_requests().await.unwrap();
    let raw = requests
        .iter()
        .find(|r| r.url.path() == "/raw")
        .expect("raw proxy request");
    assert!(raw.url.query().unwrap_or_default().starts_with("http%3A%2F%2F"));
}

/// 全部失败时返回最后一个方式的错误
#[tokio::test]
async fn test_all_strategies_fail_with_last_error() {
    let server = MockServer::start().await;

    Mock::given(path("/page"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": { "http_code": 404 } })))
        .mount(&server)
        .await;
    Mock::given(path("/raw"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(&config_for(&server)).unwrap();
    let err = fetcher
        .fetch(&format!("{}/page", server.uri()), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err, FetchError::Status { status: 502 });
    assert_eq!(err.to_string(), "Request failed with status code 502");
}

/// 相对 Location 按当前地址解析
#[tokio::test]
async fn test_direct_follows_redirects() {
    let server = MockServer::start().await;
    Mock::given(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    Mock::given(path("/new"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "final"))
        .mount(&server)
        .await;
    Mock::given(path("/final"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let html = direct_only(Duration::from_secs(2), 10)
        .fetch(&format!("{}/old", server.uri()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(html, PAGE);
}

/// 重定向超过上限时失败
#[tokio::test]
async fn test_redirect_loop_is_capped() {
    let server = MockServer::start().await;
    Mock::given(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .mount(&server)
        .await;

    let err = direct_only(Duration::from_secs(2), 3)
        .fetch(&format!("{}/loop", server.uri()), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err, FetchError::TooManyRedirects(3));
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

/// 按 Content-Type 的字符集解码
#[tokio::test]
async fn test_decodes_declared_charset() {
    let server = MockServer::start().await;
    let (body, _, _) = encoding_rs::SHIFT_JIS.encode("<p>こんにちは</p>");
    Mock::given(path("/sjis"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=Shift_JIS")
                .set_body_bytes(body.into_owned()),
        )
        .mount(&server)
        .await;

    let client = build_client(DEFAULT_USER_AGENT).unwrap();
    let strategy = DirectStrategy::new(client, Duration::from_secs(2), 10);
    let url = Url::parse(&format!("{}/sjis", server.uri())).unwrap();

    assert_eq!(strategy.fetch(&url).await.unwrap(), "<p>こんにちは</p>");
}

/// 超时与 HTTP 错误是不同的错误
#[tokio::test]
async fn test_timeout_is_distinct_from_http_error() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PAGE)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = direct_only(Duration::from_millis(300), 10);
    let token = CancellationToken::new();

    let slow = fetcher
        .fetch(&format!("{}/slow", server.uri()), &token)
        .await
        .unwrap_err();
    assert_eq!(
        slow,
        FetchError::Timeout {
            after: Duration::from_millis(300)
        }
    );

    let broken = fetcher
        .fetch(&format!("{}/broken", server.uri()), &token)
        .await
        .unwrap_err();
    assert_eq!(broken, FetchError::Status { status: 503 });
    assert!(!broken.is_timeout());
}

/// 非 http(s) 地址不发出任何请求
#[tokio::test]
async fn test_invalid_url_makes_no_request() {
    let server = MockServer::start().await;
    let fetcher = PageFetcher::new(&config_for(&server)).unwrap();

    let err = fetcher
        .fetch("mailto:someone@example.com", &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.name(), "InvalidUrlError");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[test]
fn test_default_strategy_order() {
    let fetcher = PageFetcher::new(&FetcherConfig::default()).unwrap();
    assert_eq!(
        fetcher.strategy_names(),
        vec!["direct", "allorigins", "corsproxy"]
    );
}
