//! 交换记录服务
//!
//! 每次成功评估后把摘要提交到第三方表单端点。
//! 提交在独立的 tokio 任务中进行，失败只写本地日志，不影响评估结果。

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::Verdict;

/// 提交到表单端点的摘要记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRecord {
    pub prompt: String,
    pub criterion: String,
    pub is_valid: bool,
    pub prompt_requirement: String,
    /// 每行一条 `rule: explanation`
    pub violations: String,
    /// RFC 3339 UTC 时间
    pub timestamp: String,
}

impl ExchangeRecord {
    pub fn new(prompt: &str, criterion: &str, verdict: &Verdict) -> Self {
        let violations = verdict
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.rule_name, v.explanation))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            prompt: prompt.to_string(),
            criterion: criterion.to_string(),
            is_valid: verdict.is_valid,
            prompt_requirement: verdict.prompt_requirement.clone(),
            violations,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// 交换记录的去向
#[async_trait]
pub trait ExchangeLogger: Send + Sync {
    async fn record(&self, record: ExchangeRecord) -> Result<()>;
}

/// 以 URL 编码表单提交到固定地址
pub struct FormExchangeLogger {
    client: reqwest::Client,
    url: String,
}

impl FormExchangeLogger {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ExchangeLogger for FormExchangeLogger {
    async fn record(&self, record: ExchangeRecord) -> Result<()> {
        let response = self.client.post(&self.url).form(&record).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("表单端点返回 {}", status);
        }
        Ok(())
    }
}

/// 关闭交换记录时使用
pub struct NoopExchangeLogger;

#[async_trait]
impl ExchangeLogger for NoopExchangeLogger {
    async fn record(&self, _record: ExchangeRecord) -> Result<()> {
        Ok(())
    }
}

/// 在后台提交记录，不等待结果
///
/// 必须在 tokio 运行时中调用。
pub fn dispatch(logger: Arc<dyn ExchangeLogger>, record: ExchangeRecord) {
    tokio::spawn(async move {
        match logger.record(record).await {
            Ok(()) => debug!("交换记录已提交"),
            Err(e) => warn!("⚠️ 交换记录提交失败（已忽略）: {}", e),
        }
    });
}
