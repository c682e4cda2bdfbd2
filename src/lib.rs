//! # Rubric Check
//!
//! 用 LLM 校验评分标准（rubric criteria）是否符合编写规则的工具
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 所有出站 HTTP 调用
//! - `AnthropicClient` / `OpenAiClient` - LLM 提供方，实现 `CompletionBackend`
//! - `RubricClient` - 调用评估服务 `POST /analyze-rubric`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个 criterion
//! - `EvaluationService` - 校验能力（凭证检查 → LLM → 严格解析 → 后台记录）
//! - `ExchangeLogger` - 交换记录（fire-and-forget）
//! - `CredentialProvider` - 凭证来源
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/` - 一次分析 = 多条 criterion，严格顺序执行
//! - `Orchestrator` - 状态机 Idle → Running(i) → Done，按 generation 丢弃过期结果
//!
//! ### ④ 接口层
//! - `server/` - axum HTTP 服务
//! - `render` - 终端渲染

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod render;
pub mod server;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::{Config, Provider};
pub use error::{AnalysisInputError, ConfigError, ServiceError, ServiceErrorKind, ServiceResult};
pub use models::{AnalyzeRequest, CriterionRecord, Verdict, Violation};
pub use orchestrator::{AnalysisRun, Orchestrator, RunPhase, RunSummary};
pub use services::{EvaluationService, Evaluator};
