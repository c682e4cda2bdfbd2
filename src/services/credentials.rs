//! 凭证提供者
//!
//! 评估服务不直接读取全局环境变量，而是通过注入的 `CredentialProvider` 获取凭证，
//! 测试时可以替换为固定值。

/// LLM 凭证来源
pub trait CredentialProvider: Send + Sync {
    /// 当前可用的 API key；不存在或为空时返回 `None`
    fn api_key(&self) -> Option<String>;

    /// 凭证来源描述，用于日志（不包含凭证值）
    fn describe(&self) -> String;
}

/// 每次调用时从进程环境变量中读取凭证，不做缓存
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var_name: String,
}

impl EnvCredentials {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> Option<String> {
        std::env::var(&self.var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn describe(&self) -> String {
        format!("环境变量 {}", self.var_name)
    }
}

/// 固定凭证
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    api_key: Option<String>,
}

impl StaticCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }

    /// 没有凭证
    pub fn missing() -> Self {
        Self { api_key: None }
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> Option<String> {
        self.api_key.clone().filter(|v| !v.is_empty())
    }

    fn describe(&self) -> String {
        "固定凭证".to_string()
    }
}
