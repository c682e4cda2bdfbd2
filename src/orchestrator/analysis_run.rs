//! 分析编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **输入校验**：prompt 或 criteria 为空时直接给出错误，不发请求
//! 2. **初始化状态**：每个 criterion 一条 `CriterionRecord`，全部处于加载中
//! 3. **顺序调度**：按顺序逐条调用 `Evaluator`，上一条结束后才发下一条
//! 4. **增量更新**：每条结果（或失败）到达后只更新对应的记录
//! 5. **展开切换**：`toggle_expanded` 只翻转一条记录，与加载状态无关
//!
//! ## 状态机
//!
//! ```text
//! Idle ──analyze──▶ Running(0) ──▶ Running(1) ──▶ … ──▶ Done
//!                      ▲
//!        新的 analyze 使 generation + 1，旧循环的结果被丢弃并停止调度
//! ```
//!
//! 单条失败不会中断整个分析。

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{AnalysisInputError, ServiceResult};
use crate::models::{CriterionRecord, Verdict};
use crate::orchestrator::criteria::validate_input;
use crate::services::Evaluator;
use crate::utils::logging::{log_run_complete, log_run_start, truncate_text};

/// 分析阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "index")]
pub enum RunPhase {
    Idle,
    /// 正在等待第 index 条的结果
    Running(usize),
    Done,
}

/// 一次分析的全部可见状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRun {
    /// 单调递增的分析编号
    pub generation: u64,
    pub phase: RunPhase,
    pub records: Vec<CriterionRecord>,
    /// 整体错误（输入校验失败时的横幅消息）
    pub error: Option<String>,
}

impl AnalysisRun {
    fn idle() -> Self {
        Self {
            generation: 0,
            phase: RunPhase::Idle,
            records: Vec::new(),
            error: None,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self.phase, RunPhase::Running(_))
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_records(&self.records)
    }
}

/// 分析统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub failed: usize,
    /// 被新的分析取代而提前结束
    pub superseded: bool,
}

impl RunSummary {
    pub fn from_records(records: &[CriterionRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            match (&record.verdict, &record.error_message) {
                (_, Some(_)) => summary.failed += 1,
                (Some(v), None) if v.is_valid => summary.valid += 1,
                (Some(_), None) => summary.invalid += 1,
                (None, None) => {}
            }
        }
        summary
    }
}

/// 分析编排器
///
/// 克隆后共享同一份状态，可以在一个任务中运行分析、在另一个任务中读取快照或切换展开。
#[derive(Clone)]
pub struct Orchestrator {
    evaluator: Arc<dyn Evaluator>,
    state: Arc<Mutex<AnalysisRun>>,
}

impl Orchestrator {
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self {
            evaluator,
            state: Arc::new(Mutex::new(AnalysisRun::idle())),
        }
    }

    /// 运行一次完整分析
    ///
    /// 输入无效时清空记录、设置整体错误并返回 `Err`，不会发出任何请求。
    /// 否则逐条调用评估服务，直到全部完成或被新的分析取代。
    pub async fn analyze(
        &self,
        prompt: &str,
        raw_criteria: &str,
    ) -> Result<RunSummary, AnalysisInputError> {
        let criteria = match validate_input(prompt, raw_criteria) {
            Ok(criteria) => criteria,
            Err(e) => {
                warn!("⚠️ 输入无效: {}", e);
                let mut state = self.state.lock().await;
                state.generation += 1;
                state.phase = RunPhase::Idle;
                state.records.clear();
                state.error = Some(e.to_string());
                return Err(e);
            }
        };

        let generation = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.phase = RunPhase::Running(0);
            state.records = criteria.iter().map(CriterionRecord::pending).collect();
            state.error = None;
            state.generation
        };

        let total = criteria.len();
        log_run_start(generation, total);

        for (index, criterion) in criteria.iter().enumerate() {
            if !self.begin_item(generation, index).await {
                return Ok(self.superseded(generation));
            }

            info!(
                "[条目 {}/{}] 🔍 {}",
                index + 1,
                total,
                truncate_text(criterion, 80)
            );
            let outcome = self.evaluator.evaluate(prompt, criterion).await;

            if !self.apply(generation, index, outcome).await {
                return Ok(self.superseded(generation));
            }
        }

        let mut state = self.state.lock().await;
        if state.generation != generation {
            drop(state);
            return Ok(self.superseded(generation));
        }
        state.phase = RunPhase::Done;
        let summary = state.summary();
        log_run_complete(generation, summary.valid, summary.invalid, summary.failed);
        Ok(summary)
    }

    /// 翻转第 index 条的展开状态，返回新值；索引越界返回 `None`
    pub async fn toggle_expanded(&self, index: usize) -> Option<bool> {
        let mut state = self.state.lock().await;
        let record = state.records.get_mut(index)?;
        record.is_expanded = !record.is_expanded;
        Some(record.is_expanded)
    }

    /// 当前状态的快照
    pub async fn snapshot(&self) -> AnalysisRun {
        self.state.lock().await.clone()
    }

    /// 标记开始处理第 index 条；分析已被取代时返回 false
    async fn begin_item(&self, generation: u64, index: usize) -> bool {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            return false;
        }
        state.phase = RunPhase::Running(index);
        true
    }

    /// 写回第 index 条的结果；属于旧分析的结果直接丢弃并返回 false
    async fn apply(&self, generation: u64, index: usize, outcome: ServiceResult<Verdict>) -> bool {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(
                "丢弃过期结果: 分析 {} 条目 {} (当前分析 {})",
                generation, index, state.generation
            );
            return false;
        }

        let total = state.records.len();
        let Some(record) = state.records.get_mut(index) else {
            return false;
        };
        record.is_loading = false;
        match outcome {
            Ok(verdict) => {
                info!(
                    "[条目 {}/{}] {} {}",
                    index + 1,
                    total,
                    if verdict.is_valid { "✅ 有效" } else { "❌ 无效" },
                    verdict.rule_names().join(", ")
                );
                record.verdict = Some(verdict);
            }
            Err(e) => {
                warn!("[条目 {}/{}] ⚠️ 评估失败: {}", index + 1, total, e);
                record.error_message = Some(e.to_string());
            }
        }
        true
    }

    fn superseded(&self, generation: u64) -> RunSummary {
        info!("分析 {} 已被新的分析取代，停止调度", generation);
        RunSummary {
            superseded: true,
            ..Default::default()
        }
    }
}
