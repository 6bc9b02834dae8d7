//! 页面获取方式
//!
//! 三种获取方式按固定顺序尝试：
//!
//! 1. [`DirectStrategy`]：直接请求目标站点，手动跟随重定向
//! 2. [`AllOriginsStrategy`]：通过返回 `{"contents": ...}` 的 JSON 包装代理
//! 3. [`CorsProxyStrategy`]：通过原样返回页面内容的代理

use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::{header, redirect, Client, Response, StatusCode};
use serde_json::Value;

use crate::utils::url::{encode_uri_component, Url};

use super::error::{FetchError, FetchResult};

/// 一种页面获取方式
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// 用于日志的名称
    fn name(&self) -> &str;

    /// 单次尝试的超时时间
    fn timeout(&self) -> Duration;

    /// 获取页面内容，超时和取消由调用方处理
    async fn fetch(&self, url: &Url) -> FetchResult<String>;
}

/// 创建获取方式使用的 HTTP 客户端，重定向由调用方处理
pub fn build_client(user_agent: &str) -> FetchResult<Client> {
    Client::builder()
        .user_agent(user_agent)
        .redirect(redirect::Policy::none())
        .build()
        .map_err(|e| FetchError::Network(format!("无法创建HTTP客户端: {}", e)))
}

/// 直接请求
pub struct DirectStrategy {
    client: Client,
    timeout: Duration,
    max_redirects: usize,
}

impl DirectStrategy {
    pub fn new(client: Client, timeout: Duration, max_redirects: usize) -> Self {
        Self {
            client,
            timeout,
            max_redirects,
        }
    }
}

#[async_trait]
impl FetchStrategy for DirectStrategy {
    fn name(&self) -> &str {
        "direct"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, url: &Url) -> FetchResult<String> {
        let mut current = url.clone();

        for _ in 0..=self.max_redirects {
            tracing::debug!("直接请求: {}", current);
            let response = self
                .client
                .get(current.clone())
                .header(
                    header::ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
                )
                .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
                .header(header::CACHE_CONTROL, "max-age=0")
                .header(header::UPGRADE_INSECURE_REQUESTS, "1")
                .send()
                .await?;

            let status = response.status();
            tracing::debug!("响应状态: {}", status);

            if status.is_redirection() {
                if let Some(location) = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|value| value.to_str().ok())
                {
                    current = current
                        .join(location)
                        .map_err(|e| FetchError::InvalidUrl(format!("{} ({})", location, e)))?;
                    tracing::debug!("重定向到: {}", current);
                    continue;
                }
            }

            if status != StatusCode::OK {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                });
            }

            return decode_body(response).await;
        }

        Err(FetchError::TooManyRedirects(self.max_redirects))
    }
}

/// 按 Content-Type 中的字符集解码响应体，无法识别时按 UTF-8 处理
async fn decode_body(response: Response) -> FetchResult<String> {
    let encoding = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(charset_from_content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let bytes = response.bytes().await?;
    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        tracing::warn!("按 {} 解码时遇到无效字节", encoding.name());
    }
    Ok(text.into_owned())
}

/// 从 Content-Type 中取出 charset 参数
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

/// JSON 包装代理：`{endpoint}?url=<encoded>`，返回 `{"contents": "..."}`
pub struct AllOriginsStrategy {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl AllOriginsStrategy {
    pub fn new(client: Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn proxy_url(&self, url: &Url) -> String {
        format!("{}?url={}", self.endpoint, encode_uri_component(url.as_str()))
    }
}

#[async_trait]
impl FetchStrategy for AllOriginsStrategy {
    fn name(&self) -> &str {
        "allorigins"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, url: &Url) -> FetchResult<String> {
        let proxy_url = self.proxy_url(url);
        tracing::debug!("通过 JSON 代理请求: {}", proxy_url);

        let response = self.client.get(&proxy_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let data: Value = response.json().await?;
        data.get("contents")
            .and_then(Value::as_str)
            .filter(|contents| !contents.is_empty())
            .map(str::to_string)
            .ok_or_else(|| FetchError::InvalidResponse("代理响应缺少 contents 字段".to_string()))
    }
}

/// 原样返回代理：`{endpoint}?<encoded>`
pub struct CorsProxyStrategy {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl CorsProxyStrategy {
    pub fn new(client: Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn proxy_url(&self, url: &Url) -> String {
        format!("{}?{}", self.endpoint, encode_uri_component(url.as_str()))
    }
}

#[async_trait]
impl FetchStrategy for CorsProxyStrategy {
    fn name(&self) -> &str {
        "corsproxy"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, url: &Url) -> FetchResult<String> {
        let proxy_url = self.proxy_url(url);
        tracing::debug!("通过原样代理请求: {}", proxy_url);

        let response = self.client.get(&proxy_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
