//! 翻译服务接口
//!
//! [`ChatCompletion`] 抽象了一次 chat completion 调用，翻译引擎只依赖这个 trait。
//! [`OpenAiCompatibleClient`] 是基于 reqwest 的实现，请求 `{base_url}/chat/completions`，
//! 兼容 LM Studio、OpenAI 等提供 OpenAI 格式接口的服务。

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::translation::config::TranslationConfig;
use crate::translation::error::{TranslationError, TranslationResult};

/// 对话消息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// chat completion 请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// chat completion 后端
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// 发送请求并返回第一个候选的文本内容
    async fn complete(&self, request: ChatRequest) -> TranslationResult<String>;
}

/// OpenAI 兼容接口客户端
pub struct OpenAiCompatibleClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &TranslationConfig) -> TranslationResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| TranslationError::Config(format!("无法创建HTTP客户端: {}", e)))?;

        Ok(Self::with_client(client, config))
    }

    /// 使用已有的 reqwest 客户端
    pub fn with_client(client: Client, config: &TranslationConfig) -> Self {
        Self {
            client,
            endpoint: config.completions_url(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatCompletion for OpenAiCompatibleClient {
    async fn complete(&self, request: ChatRequest) -> TranslationResult<String> {
        tracing::debug!("发送翻译请求: {} (模型 {})", self.endpoint, request.model);

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("翻译接口响应: {} ({} 字节)", status, body.len());

        if !status.is_success() {
            let message = api_error_message(status, &body);
            tracing::error!("翻译接口返回错误 {}: {}", status.as_u16(), message);
            return Err(TranslationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        extract_content(&body)
    }
}

/// 从错误响应中取出提示信息
///
/// 支持 `{"error": {"message": "..."}}` 和 `{"error": "..."}` 两种格式，
/// 都没有时使用状态码的标准描述。
pub fn api_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            let error = value.get("error")?;
            error
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| error.as_str())
                .map(str::to_string)
        })
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_u16().to_string())
        })
}

/// 读取 `choices[0].message.content`
pub fn extract_content(body: &str) -> TranslationResult<String> {
    let value: Value = serde_json::from_str(body)?;
    value
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TranslationError::InvalidResponse("Unexpected API response format".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_from_object_envelope() {
        let body = r#"{"error":{"message":"Invalid API key","type":"auth"}}"#;
        assert_eq!(api_error_message(StatusCode::UNAUTHORIZED, body), "Invalid API key");
    }

    #[test]
    fn error_message_from_string_envelope() {
        let body = r#"{"error":"model not loaded"}"#;
        assert_eq!(api_error_message(StatusCode::BAD_REQUEST, body), "model not loaded");
    }

    #[test]
    fn error_message_falls_back_to_status_text() {
        assert_eq!(
            api_error_message(StatusCode::SERVICE_UNAVAILABLE, "<html>down</html>"),
            "Service Unavailable"
        );
        assert_eq!(
            api_error_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail":"x"}"#),
            "Internal Server Error"
        );
    }

    #[test]
    fn content_is_read_from_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"こんにちは"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "こんにちは");
    }

    #[test]
    fn missing_choices_is_invalid_response() {
        let err = extract_content(r#"{"object":"chat.completion"}"#).unwrap_err();
        assert!(matches!(err, TranslationError::InvalidResponse(_)));

        let err = extract_content("not json").unwrap_err();
        assert!(matches!(err, TranslationError::InvalidResponse(_)));
    }

    #[test]
    fn request_serializes_in_chat_format() {
        let request = ChatRequest {
            model: "m".into(),
            messages: vec![ChatMessage::system("s"), ChatMessage::user("u")],
            temperature: 0.3,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "u");
        assert!((json["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }
}
