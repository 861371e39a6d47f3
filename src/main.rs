use clap::Parser;
use score_analyzer::app::commands;
use score_analyzer::utils::{logger, validation::Validate};
use score_analyzer::{AppConfig, Cli, LocalStorage, ScoreAnalyzer, ScoreError};

fn report_failure(context: &str, e: &ScoreError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 依嚴重程度決定退出碼
    std::process::exit(e.exit_code());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI arguments: {:?}", cli);

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => report_failure("Failed to load configuration", &e),
    };
    if let Some(data) = &cli.data {
        config.storage.data_file = data.clone();
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        report_failure("Configuration validation failed", &e);
    }

    let storage = LocalStorage::new(".".to_string());
    let mut analyzer = match ScoreAnalyzer::open(storage, config) {
        Ok(analyzer) => analyzer,
        Err(e) => report_failure("Failed to open data file", &e),
    };

    if let Err(e) = commands::execute(&mut analyzer, &cli.command) {
        report_failure("Command failed", &e);
    }

    Ok(())
}
