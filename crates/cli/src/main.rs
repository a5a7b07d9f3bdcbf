use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use camps_core::config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE};
use camps_core::{
    create_notification_system, load_config, validate_config, BatchOrchestrator, Config,
    DirectoryWalker, FfmpegTranscoder, FileProcessor, FsReplacer, LoftyTagAccessor, LogNotifier,
    Notifier, OrchestratorConfig, ProcessorConfig, SanitizedConfig, Transcoder, WebhookNotifier,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = config_path();
    match &config_path {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!("No configuration file, reading environment only"),
    }
    let config = load_config(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        input_dir = %sanitized.input_dir.display(),
        bitrate = sanitized.bitrate,
        target = sanitized.target_format.label(),
        workers = sanitized.workers,
        webhook = sanitized.webhook_configured,
        repair_skipped_tags = sanitized.repair_skipped_tags,
        scratch_dir = %sanitized.scratch_dir.display(),
        "Configuration loaded"
    );

    let transcoder = FfmpegTranscoder::new(config.transcoder.clone(), config.target_format);
    transcoder
        .validate()
        .await
        .context("Transcoder is not usable")?;
    info!("Using transcoder: {}", transcoder.name());

    let notifier = create_notifier(&config)?;
    info!("Using notifier: {}", notifier.name());

    let (notifications, writer) =
        create_notification_system(notifier, config.notifications.buffer_size);
    let writer_handle = tokio::spawn(writer.run());

    let processor = FileProcessor::new(
        ProcessorConfig::from(&config),
        Arc::new(transcoder),
        Arc::new(LoftyTagAccessor::new()),
        Arc::new(FsReplacer::with_defaults()),
        notifications.clone(),
    );
    let orchestrator =
        BatchOrchestrator::new(OrchestratorConfig::from(&config), processor, notifications)
            .with_walker(DirectoryWalker::new().exclude(&config.transcoder.scratch_dir));

    let result = orchestrator.run(&config.input_dir).await;

    // Dropping the last handle lets the writer drain and stop
    drop(orchestrator);
    match writer_handle.await {
        Ok(delivered) => info!(delivered, "Notifications flushed"),
        Err(e) => error!("Notification writer failed: {}", e),
    }

    let summary = result
        .with_context(|| format!("Batch over {:?} aborted", config.input_dir))?;
    println!("{}", summary.report_line());

    Ok(())
}

/// `CAMPS_CONFIG` when set, otherwise `camps.toml` if it exists.
fn config_path() -> Option<PathBuf> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    }
}

fn create_notifier(config: &Config) -> Result<Arc<dyn Notifier>> {
    match config.webhook_url() {
        Some(url) => {
            let timeout = Duration::from_secs(config.notifications.timeout_secs);
            let notifier =
                WebhookNotifier::new(url, timeout).context("Failed to create webhook client")?;
            Ok(Arc::new(notifier))
        }
        None => {
            info!("No webhook configured, notifications go to the log");
            Ok(Arc::new(LogNotifier))
        }
    }
}
