use clap::Parser;
use doc_tracker::adapters::http::{self, AppState};
use doc_tracker::domain::ports::ConfigProvider;
use doc_tracker::utils::logger;
use doc_tracker::{CliConfig, DocumentRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger(config.logging.level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, config.logging.level.as_deref());
    }

    tracing::info!("Starting doc-tracker");
    if cli.verbose {
        tracing::debug!("Configuration: {:?}", config);
    }

    let mut registry = DocumentRegistry::open(&config)?;
    let seeded = registry.seed(&config.departments, &config.users)?;
    if seeded > 0 {
        tracing::info!("🌱 Seeded {} directory entries from configuration", seeded);
    }

    if let Err(e) = http::serve(AppState::new(registry), config.bind_address()).await {
        tracing::error!("❌ Server failed: {} (category: {:?})", e, e.category());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    Ok(())
}
