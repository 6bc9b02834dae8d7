//! 翻译配置管理模块
//!
//! 配置来源按顺序叠加：默认值 → 配置文件（TOML）→ 环境变量

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译配置常量
pub mod constants {
    use std::time::Duration;

    pub const DEFAULT_BASE_URL: &str = "http://host.docker.internal:1234/v1";
    pub const DEFAULT_MODEL_NAME: &str = "light-r1-32b";
    pub const DEFAULT_API_KEY: &str = "lm-studio";
    pub const DEFAULT_SOURCE_LANG: &str = "English";
    pub const DEFAULT_TARGET_LANG: &str = "Japanese";

    pub const DEFAULT_BATCH_SIZE: usize = 10;
    pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;

    /// 批次内文本之间的分隔符
    pub const SEGMENT_JOINER: &str = "\n\n---\n\n";
    /// 拆分响应时使用的分隔标记
    pub const SEGMENT_DELIMITER: &str = "---";

    pub const CONFIG_PATHS: &[&str] = &[
        "page-translator.toml",
        "translation-config.toml",
        ".page-translator.toml",
        "/etc/page-translator/config.toml",
    ];
}

/// 翻译配置
#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// 接口根地址，请求发送到 `{base_url}/chat/completions`
    pub base_url: String,
    pub model_name: String,
    pub api_key: String,

    pub source_lang: String,
    pub target_lang: String,

    // 批次配置
    pub batch_size: usize,
    pub batch_timeout_secs: u64,
    pub temperature: f32,

    /// 响应分段数量与批次不一致时直接失败，而不是按位置配对
    pub strict_segments: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            model_name: constants::DEFAULT_MODEL_NAME.to_string(),
            api_key: constants::DEFAULT_API_KEY.to_string(),
            source_lang: constants::DEFAULT_SOURCE_LANG.to_string(),
            target_lang: constants::DEFAULT_TARGET_LANG.to_string(),
            batch_size: constants::DEFAULT_BATCH_SIZE,
            batch_timeout_secs: constants::DEFAULT_BATCH_TIMEOUT.as_secs(),
            temperature: constants::DEFAULT_TEMPERATURE,
            strict_segments: false,
        }
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .field("api_key", &"[redacted]")
            .field("source_lang", &self.source_lang)
            .field("target_lang", &self.target_lang)
            .field("batch_size", &self.batch_size)
            .field("batch_timeout_secs", &self.batch_timeout_secs)
            .field("temperature", &self.temperature)
            .field("strict_segments", &self.strict_segments)
            .finish()
    }
}

impl TranslationConfig {
    /// 加载配置：默认值 → 第一个存在的配置文件 → 环境变量，最后校验
    pub fn load() -> TranslationResult<Self> {
        let mut config = match constants::CONFIG_PATHS
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
        {
            Some(path) => Self::from_file(path)?,
            None => {
                tracing::debug!("未找到配置文件，使用默认配置");
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 从指定文件加载配置，并应用环境变量覆盖
    pub fn load_from(path: &Path) -> TranslationResult<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 只解析配置文件，不做覆盖和校验
    pub fn from_file(path: &Path) -> TranslationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::Config(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;
        let config: TranslationConfig = toml::from_str(&content)?;
        tracing::info!("已加载配置文件: {}", path.display());
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(TranslationError::Config("接口地址不能为空".to_string()));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(TranslationError::Config(format!(
                "接口地址必须以 http:// 或 https:// 开头: {}",
                self.base_url
            )));
        }

        if self.model_name.trim().is_empty() {
            return Err(TranslationError::Config("模型名称不能为空".to_string()));
        }

        if self.batch_size == 0 {
            return Err(TranslationError::Config("批次大小不能为0".to_string()));
        }

        if self.batch_timeout_secs == 0 {
            return Err(TranslationError::Config("批次超时时间不能为0".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{override_value, translation};

        if let Some(base_url) = override_value::<_, translation::BaseUrl>() {
            self.base_url = base_url;
            tracing::info!("环境变量覆盖接口地址: {}", self.base_url);
        }

        if let Some(model_name) = override_value::<_, translation::ModelName>() {
            self.model_name = model_name;
        }

        if let Some(api_key) = override_value::<_, translation::ApiKey>() {
            self.api_key = api_key;
        }

        if let Some(source_lang) = override_value::<_, translation::SourceLang>() {
            self.source_lang = source_lang;
        }

        if let Some(target_lang) = override_value::<_, translation::TargetLang>() {
            self.target_lang = target_lang;
        }

        if let Some(batch_size) = override_value::<_, translation::BatchSize>() {
            self.batch_size = batch_size;
        }

        if let Some(batch_timeout) = override_value::<_, translation::BatchTimeout>() {
            self.batch_timeout_secs = batch_timeout.as_secs();
        }

        if let Some(strict) = override_value::<_, translation::StrictSegments>() {
            self.strict_segments = strict;
        }
    }

    /// 请求级覆盖（Web 接口和命令行参数使用）
    pub fn with_overrides(
        mut self,
        base_url: Option<&str>,
        model_name: Option<&str>,
        api_key: Option<&str>,
    ) -> Self {
        if let Some(url) = base_url.filter(|s| !s.trim().is_empty()) {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = model_name.filter(|s| !s.trim().is_empty()) {
            self.model_name = model.to_string();
        }
        if let Some(key) = api_key.filter(|s| !s.is_empty()) {
            self.api_key = key.to_string();
        }
        self
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }

    /// 完整的 chat completions 地址
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
