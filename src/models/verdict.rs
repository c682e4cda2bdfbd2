use serde::{Deserialize, Serialize};

/// 单条规则违反
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// 规则名称
    #[serde(rename = "rule")]
    pub rule_name: String,
    /// 违反原因
    pub explanation: String,
}

/// 单个评分标准的校验结论
///
/// 由评估服务对每个 criterion 产出一次，创建后不再修改。
/// 线上 JSON 字段名固定为 `isValid` / `promptRequirement` / `errors` / `suggestion` / `reasoning`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_valid: bool,
    /// 该 criterion 对应的 prompt 要求
    pub prompt_requirement: String,
    #[serde(rename = "errors", default)]
    pub violations: Vec<Violation>,
    /// 无效时给出的修改建议
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub reasoning: String,
}

impl Verdict {
    /// 解析模型返回的文本
    ///
    /// 不做任何修复：markdown 代码块、前后的说明文字、截断的 JSON 都会直接失败。
    pub fn from_model_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text.trim())
    }

    /// 违反的规则名列表
    pub fn rule_names(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.rule_name.as_str()).collect()
    }
}

/// `POST /analyze-rubric` 请求体
///
/// 字段在反序列化层是可选的，缺失字段由服务返回 400。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub criterion: Option<String>,
}

impl AnalyzeRequest {
    pub fn new(prompt: impl Into<String>, criterion: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            criterion: Some(criterion.into()),
        }
    }
}
