//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `criteria` - 输入解析
//! - 把多行文本拆成 criterion 列表
//! - 在发起请求前校验 prompt / criteria
//!
//! ### `analysis_run` - 分析编排器
//! - 持有 `AnalysisRun` 状态（记录列表 + 阶段 + 整体错误）
//! - 严格顺序地逐条调用 `Evaluator`
//! - 用 generation 丢弃被取代分析的结果
//!
//! ## 层次关系
//!
//! ```text
//! analysis_run (处理 Vec<criterion>)
//!     ↓
//! services::Evaluator (处理单个 criterion)
//!     ↓
//! clients (LLM 提供方 / 评估服务 HTTP)
//! ```

pub mod analysis_run;
pub mod criteria;

pub use analysis_run::{AnalysisRun, Orchestrator, RunPhase, RunSummary};
pub use criteria::{parse_criteria, validate_input};
