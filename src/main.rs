//! 命令行入口：翻译一个网页并输出译文 HTML

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use page_translator::core::{print_error_message, print_info_message, PipelineEvent};
use page_translator::logging::{init_logging, use_color};
use page_translator::network::{FetcherConfig, PageFetcher};
use page_translator::translation::{OpenAiCompatibleClient, TranslationConfig, TranslationEngine};
use page_translator::{Pipeline, PipelineError, PipelineOutput};

#[derive(Parser, Debug)]
#[command(name = "page-translator", version, about = "Translate a web page through an LLM completion endpoint")]
struct Cli {
    /// 要翻译的页面地址（http/https）
    url: String,

    /// 配置文件路径（TOML）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 翻译接口根地址，例如 http://localhost:1234/v1
    #[arg(long)]
    base_url: Option<String>,

    /// 模型名称
    #[arg(long)]
    model: Option<String>,

    /// API 密钥
    #[arg(long)]
    api_key: Option<String>,

    /// 源语言
    #[arg(long)]
    source_lang: Option<String>,

    /// 目标语言
    #[arg(long)]
    target_lang: Option<String>,

    /// 译文输出文件，默认写到 stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 原文输出文件
    #[arg(long)]
    original: Option<PathBuf>,

    /// 以 JSON 格式输出结果
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let color = use_color();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(message) => {
            print_error_message(&message, color);
            return ExitCode::FAILURE;
        }
    };

    let fetcher = match PageFetcher::new(&FetcherConfig::from_env()) {
        Ok(fetcher) => Arc::new(fetcher),
        Err(e) => {
            print_error_message(&e.to_string(), color);
            return ExitCode::FAILURE;
        }
    };

    let backend = match OpenAiCompatibleClient::new(&config) {
        Ok(backend) => {
            tracing::debug!("翻译接口: {}", backend.endpoint());
            Arc::new(backend)
        }
        Err(e) => {
            print_error_message(&e.to_string(), color);
            return ExitCode::FAILURE;
        }
    };

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut pipeline = Pipeline::new(fetcher, TranslationEngine::new(config, backend)).with_events(events_tx);

    let progress = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            if let PipelineEvent::StateChanged(state) = event {
                if !state.is_terminal() {
                    print_info_message(&format!("[{}]", state.as_str()));
                }
            }
        }
    });

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let result = pipeline.run(&cli.url, &token).await;
    drop(pipeline);
    let _ = progress.await;

    match result {
        Ok(output) => match write_output(&cli, &output) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                print_error_message(&format!("无法写入输出: {}", e), color);
                ExitCode::FAILURE
            }
        },
        Err(e @ PipelineError::Cancelled) => {
            print_info_message(&e.user_message());
            ExitCode::from(130)
        }
        Err(e) => {
            print_error_message(&e.user_message(), color);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<TranslationConfig, String> {
    let config = match &cli.config {
        Some(path) => TranslationConfig::load_from(path),
        None => TranslationConfig::load(),
    }
    .map_err(|e| e.to_string())?;

    let mut config = config.with_overrides(
        cli.base_url.as_deref(),
        cli.model.as_deref(),
        cli.api_key.as_deref(),
    );
    if let Some(source_lang) = &cli.source_lang {
        config.source_lang = source_lang.clone();
    }
    if let Some(target_lang) = &cli.target_lang {
        config.target_lang = target_lang.clone();
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn write_output(cli: &Cli, output: &PipelineOutput) -> std::io::Result<()> {
    if let Some(path) = &cli.original {
        std::fs::write(path, output.original_html())?;
    }

    let rendered = if cli.json {
        json!({
            "status": "done",
            "url": output.url.as_str(),
            "units": output.units,
            "translated": output.translated_units,
            "original_html": output.original_html(),
            "translated_html": output.translated_html(),
        })
        .to_string()
    } else {
        output.translated_html()
    };

    match &cli.output {
        Some(path) => std::fs::write(path, rendered),
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}
