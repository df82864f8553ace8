use clap::Parser;
use toll_report::utils::error::ErrorSeverity;
use toll_report::utils::{logger, validation::Validate};
use toll_report::{
    CliConfig, EtlEngine, FileCredentialStore, LocalStorage, StorageSink, TollError,
    TollReportPipeline,
};

fn fail(e: &TollError) -> ! {
    tracing::error!(
        "❌ Toll report failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2, // re-running may succeed
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting toll-report CLI");
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.report_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    let credentials = match FileCredentialStore::from_file(&cli.credentials_file) {
        Ok(store) => store,
        Err(e) => fail(&e),
    };

    let storage = LocalStorage::new(cli.storage_root.clone());
    let sink = match &cli.output_path {
        Some(path) => StorageSink::new(LocalStorage::new(path.clone()), ".", ""),
        None => StorageSink::new(
            LocalStorage::new(cli.storage_root.clone()),
            config.output.bucket.clone(),
            config.output.prefix.clone(),
        ),
    };

    let mut pipeline = match TollReportPipeline::new(credentials, storage, sink, config) {
        Ok(pipeline) => pipeline,
        Err(e) => fail(&e),
    };
    if let Some(today) = cli.today {
        pipeline = pipeline.with_today(today);
    }

    let engine = EtlEngine::new(pipeline);
    match engine.run(&cli.sender).await {
        Ok(summary) => {
            tracing::info!("✅ Toll report completed successfully!");
            println!("✅ Toll report for {} completed", summary.range);
            println!(
                "🧾 {} transactions, total ${}",
                summary.transactions, summary.total
            );
            println!("📁 Output saved to: {}", summary.output_location);
            Ok(())
        }
        Err(e) => fail(&e),
    }
}
