use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use rubric_check::clients::RubricClient;
use rubric_check::render::render_run;
use rubric_check::services::{EvaluationService, Evaluator};
use rubric_check::utils::logging;
use rubric_check::{Config, Orchestrator};

#[derive(Parser)]
#[command(name = "rubric-check", about = "Validate rubric criteria against a prompt with an LLM")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 启动评估服务 (POST /analyze-rubric)
    Serve {
        /// 覆盖配置中的监听地址
        #[arg(long)]
        bind: Option<String>,
    },
    /// 对一组 criteria 运行一次分析
    Analyze {
        /// prompt 文本，或 @路径 从文件读取
        #[arg(long)]
        prompt: String,
        /// 每行一个 criterion，或 @路径 从文件读取
        #[arg(long)]
        criteria: String,
        /// 在进程内评估，不经过 HTTP 服务
        #[arg(long)]
        local: bool,
        /// 展开指定序号的结果（从 1 开始）
        #[arg(long = "expand", value_name = "N")]
        expand: Vec<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    match cli.command {
        Command::Serve { bind } => {
            let bind_addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            logging::log_startup(&bind_addr, &config.llm_model_name);
            let service = EvaluationService::from_config(&config)?;
            rubric_check::server::start_server(&bind_addr, Arc::new(service)).await
        }
        Command::Analyze {
            prompt,
            criteria,
            local,
            expand,
        } => {
            let prompt = read_arg(&prompt)?;
            let criteria = read_arg(&criteria)?;

            let evaluator: Arc<dyn Evaluator> = if local {
                info!("使用进程内评估");
                Arc::new(EvaluationService::from_config(&config)?)
            } else {
                info!("使用评估服务: {}", config.service_url);
                Arc::new(RubricClient::new(&config)?)
            };

            let orchestrator = Orchestrator::new(evaluator);
            let outcome = orchestrator.analyze(&prompt, &criteria).await;

            for n in expand {
                if n > 0 {
                    orchestrator.toggle_expanded(n - 1).await;
                }
            }
            println!("{}", render_run(&orchestrator.snapshot().await));

            outcome?;
            Ok(())
        }
    }
}

/// `@path` 读取文件内容，否则原样返回
fn read_arg(value: &str) -> Result<String> {
    match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("读取文件失败: {}", path)),
        None => Ok(value.to_string()),
    }
}
