use std::sync::atomic::Ordering;

use anyhow::Context;

use vendcrawl_core::{load_regions, AppConfig};
use vendcrawl_crawler::{CrawlError, CrawlRunner};
use vendcrawl_export::Uploader;
use vendcrawl_fetch::CatalogClient;
use vendcrawl_progress::{HttpBackupSink, ProgressStore};

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let regions = load_regions(&config.regions_path).with_context(|| {
        format!("loading regions file {}", config.regions_path.display())
    })?;
    let source = CatalogClient::new(config.request_timeout_secs, &config.user_agent)?;
    let store = ProgressStore::new(&config.data_dir)?;
    let uploader = Uploader::new(
        config.upload_destinations.clone(),
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    let backup = match &config.backup_base_url {
        Some(base) => Some(HttpBackupSink::new(
            base,
            config.request_timeout_secs,
            &config.user_agent,
        )?),
        None => None,
    };

    let runner = CrawlRunner::new(source, store, regions, config, uploader, backup);

    // Ctrl-C requests a stop at the next entity boundary; the runner
    // checkpoints before returning, so the next invocation resumes there.
    let shutdown = runner.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received — stopping after the current entity");
            shutdown.store(true, Ordering::Relaxed);
        }
    });

    match runner.run().await {
        Ok(summary) => {
            tracing::info!(
                regions_completed = summary.regions_completed,
                total_records = summary.total_records,
                "crawl finished"
            );
            Ok(())
        }
        Err(e @ CrawlError::Interrupted) => {
            tracing::info!("progress checkpointed — run again to resume");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
