use clap::Parser;
use doc_tracker::core::reports;
use doc_tracker::domain::model::{DocumentFilter, DocumentStatus};
use doc_tracker::domain::ports::Storage;
use doc_tracker::utils::{logger, validation::Validate};
use doc_tracker::{AppConfig, DocumentRegistry, LocalStorage};

#[derive(Parser)]
#[command(name = "records-report")]
#[command(about = "Offline status summary and CSV export of the records database")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override database.path from config
    #[arg(long)]
    database: Option<String>,

    /// Directory the CSV export is written to
    #[arg(short, long, default_value = "./reports")]
    output: String,

    /// CSV file name inside the output directory
    #[arg(long, default_value = "documents.csv")]
    file: String,

    /// Only export documents in this status
    #[arg(long)]
    status: Option<String>,

    /// Only export documents held by this department id
    #[arg(long)]
    department: Option<i64>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Also list transfers pending longer than workflow.overdue_after_hours
    #[arg(long)]
    overdue: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose, None);

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(database) = &args.database {
        config.database.path = database.clone();
    }
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let status = match args.status.as_deref() {
        Some(raw) => match DocumentStatus::from_db_value(raw) {
            Some(status) => Some(status),
            None => {
                eprintln!("❌ Unknown status '{}'", raw);
                std::process::exit(2);
            }
        },
        None => None,
    };

    let registry = DocumentRegistry::open(&config)?;

    let summary = registry.offline_summary()?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports::summary_map(&summary))?
        );
    } else {
        println!("📊 Documents by status");
        for entry in &summary {
            println!("  {:<12} {:>6}", entry.status.as_str(), entry.count);
        }
    }

    if args.overdue {
        let overdue = registry.offline_overdue()?;
        println!("⏰ {} overdue transfer(s)", overdue.len());
        for t in &overdue {
            println!(
                "  {} {} → {} ({}h)",
                t.tracking_number, t.from_department, t.to_department, t.hours_pending
            );
        }
    }

    let filter = DocumentFilter {
        status,
        department_id: args.department,
        ..Default::default()
    };
    let csv = registry.offline_export(&filter)?;

    let storage = LocalStorage::new(args.output.clone());
    storage.write_file(&args.file, &csv).await?;

    tracing::info!("✅ Export completed");
    println!("📁 CSV saved to: {}", storage.full_path(&args.file));
    Ok(())
}
