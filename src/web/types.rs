//! Web 模块的数据类型定义

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::RunController;
use crate::network::PageFetcher;
use crate::translation::{ChatCompletion, OpenAiCompatibleClient, TranslationConfig};

/// 应用状态
pub struct AppState {
    pub fetcher: Arc<PageFetcher>,
    /// 服务端的翻译配置，请求可以覆盖其中的接口设置
    pub translation: TranslationConfig,
    /// 固定的翻译后端；为空时按每次请求的配置创建
    pub backend: Option<Arc<dyn ChatCompletion>>,
    pub http_client: reqwest::Client,
    pub runs: RunController,
}

impl AppState {
    pub fn new(fetcher: Arc<PageFetcher>, translation: TranslationConfig) -> Self {
        Self {
            fetcher,
            translation,
            backend: None,
            http_client: reqwest::Client::new(),
            runs: RunController::new(),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn ChatCompletion>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// 本次运行使用的翻译后端
    pub fn backend_for(&self, config: &TranslationConfig) -> Arc<dyn ChatCompletion> {
        match &self.backend {
            Some(backend) => backend.clone(),
            None => Arc::new(OpenAiCompatibleClient::with_client(
                self.http_client.clone(),
                config,
            )),
        }
    }
}

/// 页面获取查询参数
#[derive(Debug, Deserialize)]
pub struct FetchPageQuery {
    pub url: Option<String>,
}

/// 页面获取响应
#[derive(Debug, Serialize)]
pub struct FetchPageResponse {
    pub html: String,
}

/// 翻译请求
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub url: String,
    pub base_url: Option<String>,
    pub model_name: Option<String>,
    pub api_key: Option<String>,
}

/// 翻译响应
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub status: &'static str,
    pub url: String,
    pub original_html: String,
    pub translated_html: String,
    /// 抽取到的翻译单元数量
    pub units: usize,
    /// 获得译文的单元数量
    pub translated: usize,
}

/// 取消响应
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}
