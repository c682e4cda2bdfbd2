//! Anthropic Messages API 客户端
//!
//! 使用 `reqwest` 直接调用 `/v1/messages`，返回第一个内容块的文本。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::CompletionBackend;
use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};

/// API 版本请求头
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Anthropic 客户端
pub struct AnthropicClient {
    client: reqwest::Client,
    endpoint: String,
    model_name: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// 创建新的 Anthropic 客户端
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/messages", config.llm_api_base_url.trim_end_matches('/')),
            model_name: config.llm_model_name.clone(),
            max_tokens: config.llm_max_tokens,
        })
    }
}

#[async_trait]
impl CompletionBackend for AnthropicClient {
    async fn complete(&self, api_key: &str, system: &str, user: &str) -> ServiceResult<String> {
        debug!("调用 Anthropic API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user.len());

        let request = MessagesRequest {
            model: &self.model_name,
            max_tokens: self.max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Anthropic API 请求失败: {}", e);
                ServiceError::transport(format!("Anthropic API 请求失败: {}", e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::transport(format!("读取 Anthropic 响应失败: {}", e)))?;

        if !status.is_success() {
            warn!("Anthropic API 返回错误状态 {}", status);
            return Err(ServiceError::upstream(status.as_u16(), body));
        }

        debug!("Anthropic API 调用成功");
        extract_text(&body)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// 从成功响应中取出 `content[0].text`
fn extract_text(body: &str) -> ServiceResult<String> {
    let response: MessagesResponse = serde_json::from_str(body).map_err(|e| {
        ServiceError::upstream_format(format!("无法解析 Anthropic 响应结构: {}", e))
    })?;

    response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| ServiceError::upstream_format("Anthropic 响应中没有文本内容"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceErrorKind;

    #[test]
    fn test_extract_text_first_block() {
        let body = r#"{"id":"msg_1","content":[{"type":"text","text":"{\"isValid\":true}"}],"stop_reason":"end_turn"}"#;
        assert_eq!(extract_text(body).unwrap(), r#"{"isValid":true}"#);
    }

    #[test]
    fn test_extract_text_missing_payload() {
        let err = extract_text(r#"{"content":[]}"#).unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::UpstreamFormat);

        let err = extract_text(r#"{"content":[{"type":"tool_use","id":"t"}]}"#).unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::UpstreamFormat);

        let err = extract_text("<html>gateway</html>").unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::UpstreamFormat);
    }

    #[test]
    fn test_endpoint_from_base_url() {
        let config = Config {
            llm_api_base_url: "https://api.anthropic.com/v1/".to_string(),
            ..Config::default()
        };
        let client = AnthropicClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "https://api.anthropic.com/v1/messages");
        assert_eq!(client.max_tokens, 1024);
    }
}
