use serde::Serialize;

use super::verdict::Verdict;

/// 单个 criterion 在一次分析中的状态
///
/// 以在列表中的位置作为身份标识，没有持久 id。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionRecord {
    pub criterion_text: String,
    pub verdict: Option<Verdict>,
    pub is_expanded: bool,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl CriterionRecord {
    /// 分析开始时的初始状态
    pub fn pending(criterion_text: impl Into<String>) -> Self {
        Self {
            criterion_text: criterion_text.into(),
            verdict: None,
            is_expanded: false,
            is_loading: true,
            error_message: None,
        }
    }

    /// 是否已经得到结果（成功或失败）
    pub fn is_settled(&self) -> bool {
        !self.is_loading
    }

    pub fn is_failed(&self) -> bool {
        self.error_message.is_some()
    }
}
