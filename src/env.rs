//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，翻译配置、抓取配置和 Web 配置都从这里读取覆盖值

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 仅在变量被显式设置时返回解析结果，用于覆盖文件配置
    fn lookup() -> Option<EnvResult<T>> {
        env::var(Self::NAME).ok().map(|value| Self::parse(&value))
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 读取显式设置的覆盖值，非法值记录警告后忽略
pub fn override_value<T, V: EnvVar<T>>() -> Option<T> {
    match V::lookup()? {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("忽略无效的环境变量: {}", e);
            None
        }
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "PAGE_TRANSLATOR_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// 补全接口根地址
    pub struct BaseUrl;
    impl EnvVar<String> for BaseUrl {
        const NAME: &'static str = "PAGE_TRANSLATOR_BASE_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str =
            "Root URL of the OpenAI-compatible API (the /chat/completions suffix is appended)";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.trim_end_matches('/').to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// 模型名称
    pub struct ModelName;
    impl EnvVar<String> for ModelName {
        const NAME: &'static str = "PAGE_TRANSLATOR_MODEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Model name sent with every completion request";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }

    /// API 密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "PAGE_TRANSLATOR_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Bearer token for the completion endpoint";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }

    /// 源语言
    pub struct SourceLang;
    impl EnvVar<String> for SourceLang {
        const NAME: &'static str = "PAGE_TRANSLATOR_SOURCE_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Source language name used in the prompt";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }

    /// 目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "PAGE_TRANSLATOR_TARGET_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Target language name used in the prompt";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }

    /// 每批文本单元数
    pub struct BatchSize;
    impl EnvVar<usize> for BatchSize {
        const NAME: &'static str = "PAGE_TRANSLATOR_BATCH_SIZE";
        const DEFAULT: Option<usize> = Some(10);
        const DESCRIPTION: &'static str = "Maximum text units per translation request";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 100)
        }
    }

    /// 批次超时
    pub struct BatchTimeout;
    impl EnvVar<Duration> for BatchTimeout {
        const NAME: &'static str = "PAGE_TRANSLATOR_BATCH_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30));
        const DESCRIPTION: &'static str = "Timeout of one translation request in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 300)
        }
    }

    /// 分段数量不一致时是否报错
    pub struct StrictSegments;
    impl EnvVar<bool> for StrictSegments {
        const NAME: &'static str = "PAGE_TRANSLATOR_STRICT_SEGMENTS";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str =
            "Fail a batch when the reply segment count differs from the unit count";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// 页面抓取相关环境变量
pub mod fetch {
    use super::*;

    /// 直连超时
    pub struct DirectTimeout;
    impl EnvVar<Duration> for DirectTimeout {
        const NAME: &'static str = "PAGE_TRANSLATOR_FETCH_DIRECT_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(15));
        const DESCRIPTION: &'static str = "Timeout of the direct retrieval strategy in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 300)
        }
    }

    /// 代理超时
    pub struct ProxyTimeout;
    impl EnvVar<Duration> for ProxyTimeout {
        const NAME: &'static str = "PAGE_TRANSLATOR_FETCH_PROXY_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(15));
        const DESCRIPTION: &'static str = "Timeout of each proxy retrieval strategy in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 300)
        }
    }

    /// 整体抓取超时
    pub struct OverallTimeout;
    impl EnvVar<Duration> for OverallTimeout {
        const NAME: &'static str = "PAGE_TRANSLATOR_FETCH_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(60));
        const DESCRIPTION: &'static str = "Overall timeout of the whole retrieval chain in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 600)
        }
    }

    /// JSON 包装代理地址
    pub struct AllOriginsEndpoint;
    impl EnvVar<String> for AllOriginsEndpoint {
        const NAME: &'static str = "PAGE_TRANSLATOR_ALLORIGINS_ENDPOINT";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str =
            "JSON-wrapping fetch proxy (receives ?url=, answers {\"contents\": ...})";

        fn parse(value: &str) -> EnvResult<String> {
            parse_http(value, Self::NAME)
        }
    }

    /// 原样返回代理地址
    pub struct CorsProxyEndpoint;
    impl EnvVar<String> for CorsProxyEndpoint {
        const NAME: &'static str = "PAGE_TRANSLATOR_CORSPROXY_ENDPOINT";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Raw fetch proxy (receives ?<encoded url>, answers markup)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_http(value, Self::NAME)
        }
    }

    /// 直连请求的 User-Agent
    pub struct UserAgent;
    impl EnvVar<String> for UserAgent {
        const NAME: &'static str = "PAGE_TRANSLATOR_USER_AGENT";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "User-Agent header of direct requests";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }
}

/// Web服务器相关环境变量
pub mod web {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "PAGE_TRANSLATOR_WEB_BIND_ADDRESS";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("0.0.0.0".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Web server bind address";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }

    /// 端口
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "PAGE_TRANSLATOR_WEB_PORT";
        const DEFAULT: Option<u16> = Some(50901);
        const DESCRIPTION: &'static str = "Web server port";

        fn parse(value: &str) -> EnvResult<u16> {
            let port: u16 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (1-65535)".to_string(),
            })?;

            if port == 0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Port cannot be 0".to_string(),
                });
            }

            Ok(port)
        }
    }

    /// 静态文件目录
    pub struct StaticDir;
    impl EnvVar<String> for StaticDir {
        const NAME: &'static str = "PAGE_TRANSLATOR_WEB_STATIC_DIR";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("static".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Directory with the client assets (empty disables it)";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_seconds(value: &str, var_name: &str, max: u64) -> EnvResult<Duration> {
    let seconds: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number of seconds".to_string(),
    })?;

    if seconds == 0 {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Timeout must be greater than 0".to_string(),
        });
    }

    if seconds > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Timeout too long (max {} seconds)", max),
        });
    }

    Ok(Duration::from_secs(seconds))
}

fn parse_non_empty(value: &str, var_name: &str) -> EnvResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Value cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn parse_http(value: &str, var_name: &str) -> EnvResult<String> {
    let url = value.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Err(EnvError {
            variable: var_name.to_string(),
            message: "URL must start with http:// or https://".to_string(),
        })
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    fn line(docs: &mut String, name: &str, description: &str, default: String) {
        docs.push_str(&format!("- `{}`: {} (default: {})\n", name, description, default));
    }

    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    line(&mut docs, core::LogLevel::NAME, core::LogLevel::DESCRIPTION, "info".into());
    line(&mut docs, core::NoColor::NAME, core::NoColor::DESCRIPTION, "unset".into());

    docs.push_str("\n## Translation Configuration\n\n");
    line(
        &mut docs,
        translation::BaseUrl::NAME,
        translation::BaseUrl::DESCRIPTION,
        crate::translation::config::constants::DEFAULT_BASE_URL.into(),
    );
    line(
        &mut docs,
        translation::ModelName::NAME,
        translation::ModelName::DESCRIPTION,
        crate::translation::config::constants::DEFAULT_MODEL_NAME.into(),
    );
    line(&mut docs, translation::ApiKey::NAME, translation::ApiKey::DESCRIPTION, "[redacted]".into());
    line(
        &mut docs,
        translation::SourceLang::NAME,
        translation::SourceLang::DESCRIPTION,
        crate::translation::config::constants::DEFAULT_SOURCE_LANG.into(),
    );
    line(
        &mut docs,
        translation::TargetLang::NAME,
        translation::TargetLang::DESCRIPTION,
        crate::translation::config::constants::DEFAULT_TARGET_LANG.into(),
    );
    line(
        &mut docs,
        translation::BatchSize::NAME,
        translation::BatchSize::DESCRIPTION,
        format!("{:?}", translation::BatchSize::DEFAULT),
    );
    line(
        &mut docs,
        translation::BatchTimeout::NAME,
        translation::BatchTimeout::DESCRIPTION,
        format!("{:?}", translation::BatchTimeout::DEFAULT),
    );
    line(
        &mut docs,
        translation::StrictSegments::NAME,
        translation::StrictSegments::DESCRIPTION,
        format!("{:?}", translation::StrictSegments::DEFAULT),
    );

    docs.push_str("\n## Fetch Configuration\n\n");
    line(
        &mut docs,
        fetch::DirectTimeout::NAME,
        fetch::DirectTimeout::DESCRIPTION,
        format!("{:?}", fetch::DirectTimeout::DEFAULT),
    );
    line(
        &mut docs,
        fetch::ProxyTimeout::NAME,
        fetch::ProxyTimeout::DESCRIPTION,
        format!("{:?}", fetch::ProxyTimeout::DEFAULT),
    );
    line(
        &mut docs,
        fetch::OverallTimeout::NAME,
        fetch::OverallTimeout::DESCRIPTION,
        format!("{:?}", fetch::OverallTimeout::DEFAULT),
    );
    line(
        &mut docs,
        fetch::AllOriginsEndpoint::NAME,
        fetch::AllOriginsEndpoint::DESCRIPTION,
        crate::network::fetcher::DEFAULT_ALLORIGINS_ENDPOINT.into(),
    );
    line(
        &mut docs,
        fetch::CorsProxyEndpoint::NAME,
        fetch::CorsProxyEndpoint::DESCRIPTION,
        crate::network::fetcher::DEFAULT_CORSPROXY_ENDPOINT.into(),
    );
    line(&mut docs, fetch::UserAgent::NAME, fetch::UserAgent::DESCRIPTION, "desktop Chrome".into());

    docs.push_str("\n## Web Server Configuration\n\n");
    line(&mut docs, web::BindAddress::NAME, web::BindAddress::DESCRIPTION, "0.0.0.0".into());
    line(&mut docs, web::Port::NAME, web::Port::DESCRIPTION, format!("{:?}", web::Port::DEFAULT));
    line(&mut docs, web::StaticDir::NAME, web::StaticDir::DESCRIPTION, "static".into());

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert_eq!(core::LogLevel::parse("warn").unwrap(), "warn");
        assert!(core::LogLevel::parse("loud").is_err());
    }

    #[test]
    fn test_boolean_parsing() {
        assert!(translation::StrictSegments::parse("true").unwrap());
        assert!(translation::StrictSegments::parse("1").unwrap());
        assert!(translation::StrictSegments::parse("YES").unwrap());
        assert!(translation::StrictSegments::parse("on").unwrap());

        assert!(!translation::StrictSegments::parse("false").unwrap());
        assert!(!translation::StrictSegments::parse("0").unwrap());
        assert!(!translation::StrictSegments::parse("NO").unwrap());
        assert!(!translation::StrictSegments::parse("off").unwrap());

        assert!(translation::StrictSegments::parse("maybe").is_err());
    }

    #[test]
    fn test_url_validation() {
        assert_eq!(
            translation::BaseUrl::parse("http://localhost:1234/v1/").unwrap(),
            "http://localhost:1234/v1"
        );
        assert!(translation::BaseUrl::parse("https://api.example.com").is_ok());

        assert!(translation::BaseUrl::parse("ftp://example.com").is_err());
        assert!(fetch::AllOriginsEndpoint::parse("not-a-url").is_err());
    }

    #[test]
    fn test_numeric_validation() {
        assert_eq!(translation::BatchSize::parse("10").unwrap(), 10);
        assert!(translation::BatchSize::parse("0").is_err());
        assert!(translation::BatchSize::parse("1000").is_err());
        assert!(translation::BatchSize::parse("ten").is_err());

        assert_eq!(
            fetch::DirectTimeout::parse("15").unwrap(),
            Duration::from_secs(15)
        );
        assert!(fetch::DirectTimeout::parse("0").is_err());
        assert!(web::Port::parse("0").is_err());
        assert_eq!(web::Port::parse("50901").unwrap(), 50901);
    }

    #[test]
    fn test_lookup_distinguishes_unset() {
        env::remove_var("PAGE_TRANSLATOR_TEST_UNSET_PROBE");
        struct Probe;
        impl EnvVar<usize> for Probe {
            const NAME: &'static str = "PAGE_TRANSLATOR_TEST_UNSET_PROBE";
            const DEFAULT: Option<usize> = Some(7);
            const DESCRIPTION: &'static str = "probe";

            fn parse(value: &str) -> EnvResult<usize> {
                parse_positive_usize(value, Self::NAME, 1, 100)
            }
        }

        assert!(Probe::lookup().is_none());
        assert_eq!(Probe::get().unwrap(), 7);
        assert_eq!(override_value::<usize, Probe>(), None);

        env::set_var("PAGE_TRANSLATOR_TEST_UNSET_PROBE", "42");
        assert_eq!(override_value::<usize, Probe>(), Some(42));

        env::set_var("PAGE_TRANSLATOR_TEST_UNSET_PROBE", "bogus");
        assert_eq!(override_value::<usize, Probe>(), None);

        env::remove_var("PAGE_TRANSLATOR_TEST_UNSET_PROBE");
    }

    #[test]
    fn test_env_docs_mention_every_group() {
        let docs = generate_env_docs();
        assert!(docs.contains("PAGE_TRANSLATOR_BASE_URL"));
        assert!(docs.contains("PAGE_TRANSLATOR_FETCH_TIMEOUT"));
        assert!(docs.contains("PAGE_TRANSLATOR_WEB_PORT"));
        assert!(!docs.contains("lm-studio"));
    }
}
