//! 出站 HTTP 客户端
//!
//! - `AnthropicClient` / `OpenAiClient`：LLM 提供方，实现 [`CompletionBackend`]
//! - `RubricClient`：编排层调用评估服务 `POST /analyze-rubric`

pub mod anthropic_client;
pub mod openai_client;
pub mod rubric_client;

pub use anthropic_client::AnthropicClient;
pub use openai_client::OpenAiClient;
pub use rubric_client::RubricClient;

use async_trait::async_trait;

use crate::error::ServiceResult;

/// LLM 消息补全接口
///
/// 一次调用只发一个请求，不做重试。返回模型输出的单个文本字段。
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, api_key: &str, system: &str, user: &str) -> ServiceResult<String>;

    /// 模型名称（日志用）
    fn model_name(&self) -> &str;
}
