//! 终端渲染
//!
//! 每条 criterion 一行；展开的行追加对应要求、违反的规则、建议和理由。
//! 失败的条目只显示错误标记，没有可展开的详情。

use std::fmt::Write;

use crate::models::CriterionRecord;
use crate::orchestrator::AnalysisRun;

/// 单行的状态标记
pub fn status_marker(record: &CriterionRecord) -> &'static str {
    if record.is_loading {
        "⏳"
    } else if record.is_failed() {
        "⚠️"
    } else {
        match &record.verdict {
            Some(v) if v.is_valid => "✅",
            Some(_) => "❌",
            None => "⚠️",
        }
    }
}

/// 渲染单条记录
pub fn render_record(index: usize, record: &CriterionRecord) -> String {
    let mut out = format!(
        "{} {}. {}",
        status_marker(record),
        index + 1,
        record.criterion_text
    );

    if let Some(error) = &record.error_message {
        let _ = write!(out, "\n     Error: {}", error);
        return out;
    }

    let Some(verdict) = record.verdict.as_ref().filter(|_| record.is_expanded) else {
        return out;
    };

    let _ = write!(out, "\n     Requirement: {}", verdict.prompt_requirement);
    for violation in &verdict.violations {
        let _ = write!(out, "\n     - {}: {}", violation.rule_name, violation.explanation);
    }
    if !verdict.suggestion.is_empty() {
        let _ = write!(out, "\n     Suggestion: {}", verdict.suggestion);
    }
    if !verdict.reasoning.is_empty() {
        let _ = write!(out, "\n     Reasoning: {}", verdict.reasoning);
    }
    out
}

/// 渲染整个分析
pub fn render_run(run: &AnalysisRun) -> String {
    if let Some(error) = &run.error {
        return format!("⚠️ {}", error);
    }

    let mut lines: Vec<String> = run
        .records
        .iter()
        .enumerate()
        .map(|(i, r)| render_record(i, r))
        .collect();

    let summary = run.summary();
    lines.push(format!(
        "\n{} valid, {} invalid, {} failed / {} total",
        summary.valid, summary.invalid, summary.failed, summary.total
    ));
    lines.join("\n")
}
