//! 评估服务的 HTTP 接口
//!
//! Endpoints:
//! - GET  /health          - 服务状态
//! - POST /analyze-rubric  - 校验单个 criterion，返回 Verdict JSON
//!
//! 所有错误响应的格式为 `{"error": "..."}`。

mod handlers;
mod state;

use std::sync::Arc;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use self::handlers::{handle_analyze, handle_health, handle_not_found};
pub use self::state::AppState;
use crate::services::Evaluator;

/// 构造 JSON 错误响应
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({ "error": message })))
}

/// 构建路由
pub fn build_router(evaluator: Arc<dyn Evaluator>) -> Router {
    let state = Arc::new(AppState { evaluator });

    // 浏览器页面可能来自其他源
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/analyze-rubric", post(handle_analyze))
        .fallback(handle_not_found)
        .layer(cors)
        .with_state(state)
}

/// 启动 HTTP 服务，直到收到 Ctrl+C
pub async fn start_server(bind_addr: &str, evaluator: Arc<dyn Evaluator>) -> Result<()> {
    let app = build_router(evaluator);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("✓ 服务已监听 http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("服务已关闭");
    Ok(())
}

/// 等待 Ctrl+C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("收到关闭信号..."),
        Err(e) => error!("无法监听 Ctrl+C: {}", e),
    }
}
