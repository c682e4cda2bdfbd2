//! 评估服务 - 业务能力层
//!
//! 只负责"校验单个 criterion"能力，不关心批量和顺序。
//!
//! 处理步骤：
//! 1. 校验输入
//! 2. 通过 `CredentialProvider` 获取凭证（在任何出站请求之前）
//! 3. 固定系统消息 + 原样嵌入的用户消息，调用一次 LLM
//! 4. 严格解析模型输出为 `Verdict`
//! 5. 后台提交交换记录，不等待

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clients::{AnthropicClient, CompletionBackend, OpenAiClient};
use crate::config::{Config, Provider, DEFAULT_EXCHANGE_LOG_URL};
use crate::error::{ServiceError, ServiceResult};
use crate::models::Verdict;
use crate::services::credentials::{CredentialProvider, EnvCredentials};
use crate::services::exchange_log::{
    self, ExchangeLogger, ExchangeRecord, FormExchangeLogger, NoopExchangeLogger,
};
use crate::services::rubric_prompt::{build_user_message, SYSTEM_PROMPT};
use crate::utils::logging::truncate_text;

/// 单个 criterion 的评估能力
///
/// 编排层只依赖这个接口：可以是进程内的 [`EvaluationService`]，也可以是 HTTP 客户端。
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, prompt: &str, criterion: &str) -> ServiceResult<Verdict>;
}

/// 评估服务
///
/// 无状态、可重入，多个请求可以并发调用。
pub struct EvaluationService {
    backend: Arc<dyn CompletionBackend>,
    credentials: Arc<dyn CredentialProvider>,
    exchange_logger: Arc<dyn ExchangeLogger>,
}

impl EvaluationService {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        credentials: Arc<dyn CredentialProvider>,
        exchange_logger: Arc<dyn ExchangeLogger>,
    ) -> Self {
        Self {
            backend,
            credentials,
            exchange_logger,
        }
    }

    /// 根据配置组装评估服务
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let backend: Arc<dyn CompletionBackend> = match config.provider {
            Provider::Anthropic => Arc::new(AnthropicClient::new(config)?),
            Provider::OpenAi => Arc::new(OpenAiClient::new(config)),
        };

        let exchange_logger: Arc<dyn ExchangeLogger> = if config.exchange_log_url.trim().is_empty() {
            info!("交换记录已关闭");
            Arc::new(NoopExchangeLogger)
        } else {
            if config.exchange_log_url == DEFAULT_EXCHANGE_LOG_URL {
                warn!("⚠️ 交换记录仍在使用占位地址，请通过 EXCHANGE_LOG_URL 配置真实地址");
            }
            Arc::new(FormExchangeLogger::new(
                config.exchange_log_url.clone(),
                Duration::from_secs(config.request_timeout_secs),
            )?)
        };

        Ok(Self::new(
            backend,
            Arc::new(EnvCredentials::new(config.credential_env_var.clone())),
            exchange_logger,
        ))
    }
}

#[async_trait]
impl Evaluator for EvaluationService {
    async fn evaluate(&self, prompt: &str, criterion: &str) -> ServiceResult<Verdict> {
        if prompt.trim().is_empty() || criterion.trim().is_empty() {
            return Err(ServiceError::bad_request("Prompt and criterion are required"));
        }

        let api_key = self.credentials.api_key().ok_or_else(|| {
            warn!("❌ 缺少 LLM 凭证: {}", self.credentials.describe());
            ServiceError::misconfigured(format!(
                "LLM 凭证不可用 ({})",
                self.credentials.describe()
            ))
        })?;

        debug!(
            "评估 criterion: {} (模型: {})",
            truncate_text(criterion, 60),
            self.backend.model_name()
        );

        let user_message = build_user_message(prompt, criterion);
        let text = self
            .backend
            .complete(&api_key, SYSTEM_PROMPT, &user_message)
            .await?;

        let verdict = Verdict::from_model_text(&text).map_err(|e| {
            warn!(
                "⚠️ 无法解析模型输出: {} | 原始内容: {}",
                e,
                truncate_text(&text, 500)
            );
            ServiceError::parse(format!("模型输出不是有效的 Verdict JSON: {}", e))
        })?;

        exchange_log::dispatch(
            self.exchange_logger.clone(),
            ExchangeRecord::new(prompt, criterion, &verdict),
        );

        Ok(verdict)
    }
}
