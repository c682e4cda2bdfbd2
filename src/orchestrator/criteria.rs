//! 输入解析
//!
//! 把多行文本拆成 criterion 列表，并做发起分析前的校验。

use crate::error::AnalysisInputError;

/// 按行拆分，去掉首尾空白并丢弃空行
///
/// 保留原始顺序，不去重。
pub fn parse_criteria(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// 校验 prompt 和 criteria 输入，返回解析后的 criterion 列表
///
/// prompt 为空白或 criteria 完全为空是 `EmptyInput`；
/// criteria 有内容但只有空白行是 `NoCriteria`。
pub fn validate_input(prompt: &str, raw_criteria: &str) -> Result<Vec<String>, AnalysisInputError> {
    if prompt.trim().is_empty() || raw_criteria.is_empty() {
        return Err(AnalysisInputError::EmptyInput);
    }

    let criteria = parse_criteria(raw_criteria);
    if criteria.is_empty() {
        return Err(AnalysisInputError::NoCriteria);
    }

    Ok(criteria)
}
