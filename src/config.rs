use serde::Deserialize;
use std::str::FromStr;

use crate::error::ConfigError;

/// 默认的交换记录提交地址（第三方表单收集端点）
///
/// 这里只是占位地址，部署时必须用 `EXCHANGE_LOG_URL` 或配置文件中的
/// `exchange_log_url` 替换成真实的表单地址；设为空字符串则关闭交换记录。
/// 表单字段名与 `ExchangeRecord` 的字段名一致。
pub const DEFAULT_EXCHANGE_LOG_URL: &str =
    "https://docs.google.com/forms/d/e/rubric-check-exchange-log/formResponse";

/// 单次请求允许的最大输出 token 数
pub const MAX_OUTPUT_TOKENS: u32 = 1024;

/// LLM 提供方
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Anthropic Messages API
    Anthropic,
    /// 兼容 OpenAI 的 Chat Completions API
    OpenAi,
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAi),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// 程序配置
///
/// 注意：LLM 凭证本身不在这里，只记录读取凭证的环境变量名，
/// 每次请求时通过 `CredentialProvider` 读取。
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP 服务监听地址
    pub bind_addr: String,
    /// 编排层调用的评估服务地址
    pub service_url: String,
    // --- LLM 配置 ---
    pub provider: Provider,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_max_tokens: u32,
    /// 保存 LLM 凭证的环境变量名
    pub credential_env_var: String,
    /// 交换记录提交地址，为空表示关闭
    pub exchange_log_url: String,
    /// 出站请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            service_url: "http://127.0.0.1:3000".to_string(),
            provider: Provider::Anthropic,
            llm_api_base_url: "https://api.anthropic.com/v1".to_string(),
            llm_model_name: "claude-sonnet-4-5".to_string(),
            llm_max_tokens: MAX_OUTPUT_TOKENS,
            credential_env_var: "ANTHROPIC_API_KEY".to_string(),
            exchange_log_url: DEFAULT_EXCHANGE_LOG_URL.to_string(),
            request_timeout_secs: 60,
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件的内容，所有字段可选
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    bind_addr: Option<String>,
    service_url: Option<String>,
    provider: Option<Provider>,
    llm_api_base_url: Option<String>,
    llm_model_name: Option<String>,
    llm_max_tokens: Option<u32>,
    credential_env_var: Option<String>,
    exchange_log_url: Option<String>,
    request_timeout_secs: Option<u64>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 加载配置：默认值 → `RUBRIC_CHECK_CONFIG` 指向的 TOML 文件 → 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("RUBRIC_CHECK_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(&path)?,
            _ => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置，未出现的字段使用默认值
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })
    }

    fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        let default = Self::default();
        Ok(Self {
            bind_addr: file.bind_addr.unwrap_or(default.bind_addr),
            service_url: file.service_url.unwrap_or(default.service_url),
            provider: file.provider.unwrap_or(default.provider),
            llm_api_base_url: file.llm_api_base_url.unwrap_or(default.llm_api_base_url),
            llm_model_name: file.llm_model_name.unwrap_or(default.llm_model_name),
            llm_max_tokens: file
                .llm_max_tokens
                .unwrap_or(default.llm_max_tokens)
                .min(MAX_OUTPUT_TOKENS),
            credential_env_var: file.credential_env_var.unwrap_or(default.credential_env_var),
            exchange_log_url: file.exchange_log_url.unwrap_or(default.exchange_log_url),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(default.request_timeout_secs),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
        })
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: std::env::var("RUBRIC_BIND_ADDR").unwrap_or(self.bind_addr),
            service_url: std::env::var("RUBRIC_SERVICE_URL").unwrap_or(self.service_url),
            provider: match std::env::var("LLM_PROVIDER") {
                Ok(v) => v.parse()?,
                Err(_) => self.provider,
            },
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_max_tokens: parse_env("LLM_MAX_TOKENS", "u32")?
                .unwrap_or(self.llm_max_tokens)
                .min(MAX_OUTPUT_TOKENS),
            credential_env_var: std::env::var("LLM_CREDENTIAL_VAR")
                .unwrap_or(self.credential_env_var),
            exchange_log_url: std::env::var("EXCHANGE_LOG_URL").unwrap_or(self.exchange_log_url),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
        })
    }
}

/// 读取并解析环境变量；不存在时返回 `None`
fn parse_env<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => {
            let parsed = value.trim().parse::<T>();
            match parsed {
                Ok(v) => Ok(Some(v)),
                Err(_) => Err(ConfigError::EnvVarParseFailed {
                    var_name: var_name.to_string(),
                    value,
                    expected_type: expected_type.to_string(),
                }),
            }
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("anthropic".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert_eq!(" OpenAI ".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert!("gemini".parse::<Provider>().is_err());
    }

    #[test]
    fn test_toml_overrides_and_defaults() {
        let config = Config::from_toml_str(
            r#"
            provider = "openai"
            llm_model_name = "gpt-4o-mini"
            llm_max_tokens = 4096
            exchange_log_url = ""
            "#,
        )
        .unwrap();

        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.llm_model_name, "gpt-4o-mini");
        // 输出 token 上限固定为 1024
        assert_eq!(config.llm_max_tokens, MAX_OUTPUT_TOKENS);
        assert!(config.exchange_log_url.is_empty());
        assert_eq!(config.bind_addr, Config::default().bind_addr);
    }

    #[test]
    fn test_exchange_log_url_replaceable() {
        assert_eq!(Config::default().exchange_log_url, DEFAULT_EXCHANGE_LOG_URL);

        let config =
            Config::from_toml_str(r#"exchange_log_url = "https://forms.example.com/submit""#)
                .unwrap();
        assert_eq!(config.exchange_log_url, "https://forms.example.com/submit");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::from_toml_str("llm_max_tokens = \"many\"").is_err());
    }
}
