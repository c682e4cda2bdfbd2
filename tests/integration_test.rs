use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use tokio_test::{assert_err, assert_ok};

use rubric_check::clients::{CompletionBackend, RubricClient};
use rubric_check::services::{EvaluationService, NoopExchangeLogger, StaticCredentials};
use rubric_check::{
    Config, Evaluator, Orchestrator, RunPhase, ServiceError, ServiceErrorKind, ServiceResult,
    Verdict,
};

const MOVIE_PROMPT: &str = "List movies by genre, bold each category.";

const MOVIE_VERDICT: &str = r#"{
  "isValid": false,
  "promptRequirement": "Bold each category",
  "errors": [
    {"rule": "Objective", "explanation": "\"clear\" is subjective and cannot be verified consistently."},
    {"rule": "Specific", "explanation": "Does not say how clarity would be checked."}
  ],
  "suggestion": "Each genre category name in the response is formatted in bold.",
  "reasoning": "Rewrites the check against the explicit bold-category instruction."
}"#;

/// 按调用顺序返回预设结果的 LLM 后端
struct ScriptedBackend {
    replies: std::sync::Mutex<Vec<ServiceResult<String>>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(replies: Vec<ServiceResult<String>>) -> Arc<Self> {
        let mut replies = replies;
        replies.reverse();
        Arc::new(Self {
            replies: std::sync::Mutex::new(replies),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, _api_key: &str, _system: &str, _user: &str) -> ServiceResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(ServiceError::transport("no scripted reply")))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn service(backend: Arc<ScriptedBackend>, credentials: StaticCredentials) -> Arc<EvaluationService> {
    Arc::new(EvaluationService::new(
        backend,
        Arc::new(credentials),
        Arc::new(NoopExchangeLogger),
    ))
}

#[tokio::test]
async fn test_movie_scenario_in_process() {
    let backend = ScriptedBackend::new(vec![Ok(MOVIE_VERDICT.to_string())]);
    let orchestrator = Orchestrator::new(service(backend, StaticCredentials::new("sk-test")));

    let summary = assert_ok!(
        orchestrator
            .analyze(MOVIE_PROMPT, "The response should be clear.")
            .await
    );
    assert_eq!(summary.invalid, 1);

    let run = orchestrator.snapshot().await;
    let verdict = run.records[0].verdict.as_ref().unwrap();
    assert!(!verdict.is_valid);
    assert!(!verdict.prompt_requirement.is_empty());
    assert!(verdict
        .rule_names()
        .iter()
        .any(|r| *r == "Objective" || *r == "Specific"));
    assert!(verdict.suggestion.to_lowercase().contains("bold"));
}

#[tokio::test]
async fn test_rate_limited_item_does_not_stop_run() {
    let backend = ScriptedBackend::new(vec![
        Ok(MOVIE_VERDICT.to_string()),
        Err(ServiceError::upstream(429, r#"{"type":"rate_limit_error"}"#)),
        Ok(MOVIE_VERDICT.to_string()),
    ]);
    let orchestrator =
        Orchestrator::new(service(backend.clone(), StaticCredentials::new("sk-test")));

    let summary = assert_ok!(orchestrator.analyze(MOVIE_PROMPT, "a\nb\nc").await);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 3);

    let run = orchestrator.snapshot().await;
    assert_eq!(run.phase, RunPhase::Done);
    assert!(run.records[0].verdict.is_some());
    assert!(run.records[1]
        .error_message
        .as_ref()
        .unwrap()
        .contains("rate_limit_error"));
    assert!(run.records[2].verdict.is_some());
}

#[tokio::test]
async fn test_missing_credential_marks_items_without_calls() {
    let backend = ScriptedBackend::new(vec![]);
    let orchestrator = Orchestrator::new(service(backend.clone(), StaticCredentials::missing()));

    let summary = assert_ok!(orchestrator.analyze(MOVIE_PROMPT, "a\nb").await);
    assert_eq!(summary.failed, 2);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

/// "slow" 开头的 criterion 会阻塞，直到 `release` 被通知
struct GatedEvaluator {
    started: mpsc::UnboundedSender<String>,
    release: Notify,
    calls: AtomicUsize,
}

#[async_trait]
impl Evaluator for GatedEvaluator {
    async fn evaluate(&self, _prompt: &str, criterion: &str) -> ServiceResult<Verdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.started.send(criterion.to_string());
        if criterion.starts_with("slow") {
            self.release.notified().await;
        }
        Ok(Verdict {
            is_valid: !criterion.starts_with("slow"),
            prompt_requirement: criterion.to_string(),
            violations: vec![],
            suggestion: String::new(),
            reasoning: String::new(),
        })
    }
}

#[tokio::test]
async fn test_superseded_run_is_discarded() {
    let (tx, mut started) = mpsc::unbounded_channel();
    let evaluator = Arc::new(GatedEvaluator {
        started: tx,
        release: Notify::new(),
        calls: AtomicUsize::new(0),
    });
    let orchestrator = Orchestrator::new(evaluator.clone());

    let first = orchestrator.clone();
    let first_run =
        tokio::spawn(async move { first.analyze("p", "slow one\nslow two\nslow three").await });

    assert_eq!(started.recv().await.unwrap(), "slow one");
    assert!(orchestrator.snapshot().await.is_in_progress());

    let summary = assert_ok!(orchestrator.analyze("p", "fast a\nfast b").await);
    assert_eq!(summary.valid, 2);
    let after_second = orchestrator.snapshot().await;

    // 放行旧分析中挂起的请求
    evaluator.release.notify_one();
    let first_summary = assert_ok!(tokio::time::timeout(Duration::from_secs(2), first_run)
        .await
        .unwrap()
        .unwrap());
    assert!(first_summary.superseded);

    // 旧结果没有写入，旧分析也没有继续调度
    assert_eq!(orchestrator.snapshot().await, after_second);
    assert_eq!(evaluator.calls.load(Ordering::SeqCst), 3);
    assert_eq!(after_second.records.len(), 2);
    assert_eq!(after_second.phase, RunPhase::Done);
}

#[tokio::test]
async fn test_rows_stay_pending_until_their_turn() {
    let (tx, mut started) = mpsc::unbounded_channel();
    let evaluator = Arc::new(GatedEvaluator {
        started: tx,
        release: Notify::new(),
        calls: AtomicUsize::new(0),
    });
    let orchestrator = Orchestrator::new(evaluator.clone());

    let runner = orchestrator.clone();
    let run = tokio::spawn(async move { runner.analyze("p", "slow one\nfast b\nfast c").await });

    assert_eq!(started.recv().await.unwrap(), "slow one");

    // 第一条挂起时，所有记录都还在加载中
    let pending = orchestrator.snapshot().await;
    assert_eq!(pending.phase, RunPhase::Running(0));
    assert_eq!(pending.records.len(), 3);
    assert!(pending
        .records
        .iter()
        .all(|r| r.is_loading && r.verdict.is_none() && r.error_message.is_none()));
    assert_eq!(evaluator.calls.load(Ordering::SeqCst), 1);

    // 运行中也可以切换展开状态
    assert_eq!(orchestrator.toggle_expanded(1).await, Some(true));
    let toggled = orchestrator.snapshot().await;
    assert!(toggled.records[1].is_expanded);
    assert!(toggled.records[1].is_loading);

    evaluator.release.notify_one();
    let summary = assert_ok!(tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .unwrap()
        .unwrap());
    assert_eq!(summary.total, 3);
    assert!(!summary.superseded);

    let done = orchestrator.snapshot().await;
    assert_eq!(done.phase, RunPhase::Done);
    assert!(done.records.iter().all(|r| !r.is_loading));
    assert!(done.records[1].is_expanded);
    assert_eq!(evaluator.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_http_round_trip_through_service() {
    let backend = ScriptedBackend::new(vec![
        Ok(MOVIE_VERDICT.to_string()),
        Ok("I think this criterion is fine.".to_string()),
        Err(ServiceError::upstream(429, "rate_limit_error")),
    ]);
    let router =
        rubric_check::server::build_router(service(backend, StaticCredentials::new("sk-test")));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let config = Config {
        service_url: format!("http://{}", addr),
        ..Config::default()
    };
    let client = RubricClient::new(&config).unwrap();

    let verdict = assert_ok!(client.evaluate(MOVIE_PROMPT, "The response should be clear.").await);
    assert_eq!(verdict.violations.len(), 2);

    // 解析失败：客户端只看到通用信息
    let err = assert_err!(client.evaluate(MOVIE_PROMPT, "x").await);
    assert!(matches!(err.kind, ServiceErrorKind::Upstream { status: 500, .. }));
    assert!(err.to_string().contains("Failed to parse analysis result"));
    assert!(!err.to_string().contains("I think"));

    // 上游 429 原样透传
    let err = assert_err!(client.evaluate(MOVIE_PROMPT, "y").await);
    assert!(matches!(err.kind, ServiceErrorKind::Upstream { status: 429, .. }));

    // 缺少字段 → 400，不消耗脚本
    let err = assert_err!(client.evaluate(MOVIE_PROMPT, "   ").await);
    assert!(matches!(err.kind, ServiceErrorKind::Upstream { status: 400, .. }));

    // 无法解析的请求体同样是 400 + {"error": ...}
    let raw = reqwest::Client::new();
    let endpoint = format!("http://{}/analyze-rubric", addr);
    let bad_bodies = [
        raw.post(&endpoint)
            .header("content-type", "application/json")
            .body(r#"{"prompt":5,"criterion":"x"}"#),
        raw.post(&endpoint).body(r#"{"prompt":"p","criterion":"c"}"#),
        raw.post(&endpoint).header("content-type", "application/json"),
    ];
    for request in bad_bodies {
        let response = request.send().await.unwrap();
        assert_eq!(response.status().as_u16(), 400);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }
}

/// 真实调用 LLM 提供方
///
/// 运行方式：
/// ```bash
/// ANTHROPIC_API_KEY=... cargo test test_live_movie_scenario -- --ignored --nocapture
/// ```
#[tokio::test]
#[ignore]
async fn test_live_movie_scenario() {
    rubric_check::utils::logging::init(true);

    let config = Config::from_env().expect("配置无效");
    let service = EvaluationService::from_config(&config).expect("创建评估服务失败");

    let verdict = service
        .evaluate(MOVIE_PROMPT, "The response should be clear.")
        .await
        .expect("LLM 调用失败");

    println!("{:#?}", verdict);
    assert!(!verdict.is_valid);
    assert!(!verdict.prompt_requirement.is_empty());
    assert!(!verdict.violations.is_empty());
    assert!(!verdict.suggestion.is_empty());
}
