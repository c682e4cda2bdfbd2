//! 兼容 OpenAI 的 LLM 客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::CompletionBackend;
use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};

/// OpenAI 兼容客户端
///
/// 凭证在每次请求时传入，所以 `Client` 按请求创建。
pub struct OpenAiClient {
    api_base_url: String,
    model_name: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            api_base_url: config.llm_api_base_url.clone(),
            model_name: config.llm_model_name.clone(),
            max_tokens: config.llm_max_tokens,
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, api_key: &str, system: &str, user: &str) -> ServiceResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user.len());

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&self.api_base_url);
        let client = Client::with_config(openai_config);

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system)
            .build()
            .map_err(map_openai_error)?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user)
            .build()
            .map_err(map_openai_error)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(0.0)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(map_openai_error)?;

        let response = client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            map_openai_error(e)
        })?;

        debug!("LLM API 调用成功");

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| ServiceError::upstream_format("LLM 返回内容为空"))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// `async-openai` 不暴露上游状态码，API 错误统一按 502 处理
fn map_openai_error(err: OpenAIError) -> ServiceError {
    match err {
        OpenAIError::ApiError(api) => ServiceError::upstream(502, api.message),
        other => ServiceError::transport(format!("LLM API 调用失败: {}", other)),
    }
}
