use clap::Parser;
use template_base::config::load_env_file;
use template_base::utils::{logger, validation::Validate};
use template_base::{transport, AppConfig, AppContext, CliArgs, TransportMode};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 先載入環境檔，模式判斷可能依賴其中的變數
    let env_file = load_env_file(args.env_file.as_deref());

    // 啟動時只判斷一次執行模式
    let mode = TransportMode::detect();

    // 初始化日誌
    logger::init_logger(mode, args.verbose);
    tracing::info!(?mode, "Starting template-base");

    match env_file {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "Environment file loaded"),
        Ok(None) => tracing::debug!("No environment file found"),
        Err(e) => {
            tracing::error!("❌ {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    }

    if let Err(e) = run(args, mode).await {
        tracing::error!("❌ {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: CliArgs, mode: TransportMode) -> template_base::Result<()> {
    // 載入並驗證配置
    let config = AppConfig::from_env()?.with_port_override(args.port);
    config.validate()?;
    tracing::debug!(
        port = config.port,
        environment = config.environment_label(),
        "Configuration loaded"
    );

    // 組裝依賴，之後交給對應的傳輸層
    let context = AppContext::build(config);
    transport::run(mode, context).await
}
