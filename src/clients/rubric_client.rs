//! 评估服务客户端
//!
//! 编排层通过它调用 `POST /analyze-rubric`。

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{AnalyzeRequest, Verdict};
use crate::services::Evaluator;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// 评估服务 HTTP 客户端
pub struct RubricClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RubricClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/analyze-rubric", config.service_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Evaluator for RubricClient {
    async fn evaluate(&self, prompt: &str, criterion: &str) -> ServiceResult<Verdict> {
        debug!("请求评估服务: {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalyzeRequest::new(prompt, criterion))
            .send()
            .await
            .map_err(|e| {
                warn!("评估服务请求失败: {}", e);
                ServiceError::transport(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }

        Verdict::from_model_text(&body)
            .map_err(|e| ServiceError::parse(format!("Malformed verdict from service: {}", e)))
    }
}

/// 服务端错误体为 `{"error": "..."}`，否则使用原始内容
fn error_from_body(status: u16, body: &str) -> ServiceError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.to_string());
    ServiceError::new(
        crate::error::ServiceErrorKind::Upstream {
            status,
            body: body.to_string(),
        },
        format!("{} ({})", message, status),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceErrorKind;

    #[test]
    fn test_error_from_json_body() {
        let err = error_from_body(
            429,
            r#"{"error":"Upstream API error (429): {\"type\":\"rate_limit_error\"}"}"#,
        );
        assert!(matches!(err.kind, ServiceErrorKind::Upstream { status: 429, .. }));
        assert!(err.to_string().contains("rate_limit_error"));
        assert!(err.to_string().ends_with("(429)"));
    }

    #[test]
    fn test_error_from_plain_body() {
        let err = error_from_body(502, "Bad Gateway");
        assert_eq!(err.to_string(), "Bad Gateway (502)");
    }

    #[test]
    fn test_endpoint() {
        let config = Config {
            service_url: "http://localhost:8080/".to_string(),
            ..Config::default()
        };
        let client = RubricClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "http://localhost:8080/analyze-rubric");
    }
}
