//! Web 服务器主程序入口

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use page_translator::env::generate_env_docs;
use page_translator::logging::init_logging;
use page_translator::network::{FetcherConfig, PageFetcher};
use page_translator::translation::TranslationConfig;
use page_translator::web::{AppState, WebConfig, WebServer};

#[derive(Parser, Debug)]
#[command(name = "page-translator-web", version, about = "Page Translator Web Server")]
struct Args {
    /// 绑定地址
    #[arg(short, long)]
    bind: Option<String>,

    /// 端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 静态文件目录
    #[arg(long)]
    static_dir: Option<String>,

    /// 翻译配置文件路径（TOML）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 打印环境变量说明并退出
    #[arg(long)]
    env_docs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_logging();

    let args = Args::parse();
    if args.env_docs {
        print!("{}", generate_env_docs());
        return Ok(());
    }

    // 创建 Web 配置
    let mut web_config = WebConfig::default();
    if let Some(bind) = args.bind {
        web_config.bind_addr = bind;
    }
    if let Some(port) = args.port {
        web_config.port = port;
    }
    if let Some(static_dir) = args.static_dir {
        web_config.static_dir = Some(static_dir).filter(|dir| !dir.is_empty());
    }
    web_config.validate()?;

    let translation = match &args.config {
        Some(path) => TranslationConfig::load_from(path)?,
        None => TranslationConfig::load()?,
    };
    tracing::info!("翻译配置: {:?}", translation);

    let fetcher = Arc::new(PageFetcher::new(&FetcherConfig::from_env())?);
    let state = AppState::new(fetcher, translation);

    // 启动 Web 服务器
    let server = WebServer::new(web_config, state);
    server.start().await?;

    Ok(())
}
