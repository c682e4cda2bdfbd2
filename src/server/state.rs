use std::sync::Arc;

use crate::services::Evaluator;

/// 各请求处理函数共享的状态
pub struct AppState {
    /// 评估服务（无状态，可并发调用）
    pub evaluator: Arc<dyn Evaluator>,
}
