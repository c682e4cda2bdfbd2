//! 错误类型
//!
//! - `ServiceError`：评估服务（服务端）的错误，带有类型化的 `kind`
//! - `AnalysisInputError`：编排层在发起任何网络请求之前的输入校验错误
//! - `ConfigError`：配置加载错误

use thiserror::Error;

/// 评估服务错误种类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// 请求参数缺失或为空
    BadRequest,
    /// 部署配置错误（例如缺少 LLM 凭证）
    Misconfigured,
    /// LLM 提供方返回了非成功状态码
    Upstream { status: u16, body: String },
    /// 成功响应中缺少预期的文本字段
    UpstreamFormat,
    /// 模型返回的文本无法解析为 Verdict
    Parse,
    /// 网络层失败（无法连接、超时等）
    Transport,
}

/// 评估服务错误
///
/// `message` 面向日志，可能包含细节；对外响应应使用 [`ServiceError::public_message`]。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 创建参数错误
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::BadRequest, message)
    }

    /// 创建配置错误（不得包含凭证值）
    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Misconfigured, message)
    }

    /// 创建上游错误
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = format!("Upstream API error ({}): {}", status, body);
        Self::new(ServiceErrorKind::Upstream { status, body }, message)
    }

    pub fn upstream_format(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::UpstreamFormat, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Parse, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Transport, message)
    }

    /// 映射到 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match &self.kind {
            ServiceErrorKind::BadRequest => 400,
            ServiceErrorKind::Misconfigured => 500,
            ServiceErrorKind::Upstream { status, .. } => *status,
            ServiceErrorKind::UpstreamFormat | ServiceErrorKind::Parse => 500,
            ServiceErrorKind::Transport => 502,
        }
    }

    /// 可以返回给客户端的错误信息
    ///
    /// 配置错误和解析错误只返回通用信息，原始内容只在服务端日志中出现。
    pub fn public_message(&self) -> String {
        match &self.kind {
            ServiceErrorKind::BadRequest => self.message.clone(),
            ServiceErrorKind::Misconfigured => "Server configuration error".to_string(),
            ServiceErrorKind::Upstream { .. } => self.message.clone(),
            ServiceErrorKind::UpstreamFormat => {
                "Unexpected response format from language model".to_string()
            }
            ServiceErrorKind::Parse => "Failed to parse analysis result".to_string(),
            ServiceErrorKind::Transport => "Failed to reach language model provider".to_string(),
        }
    }
}

/// 编排层输入错误
///
/// 这些错误在本地处理，不会产生任何网络请求。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisInputError {
    #[error("Please enter both a prompt and criteria")]
    EmptyInput,
    #[error("No valid criteria found")]
    NoCriteria,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 不支持的 LLM 提供方
    #[error("不支持的 LLM 提供方: {0}")]
    UnknownProvider(String),
}

/// 评估服务结果类型
pub type ServiceResult<T> = Result<T, ServiceError>;
