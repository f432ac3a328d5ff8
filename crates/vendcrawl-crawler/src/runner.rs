//! Process entry point of the engine: region ordering and the resume rule.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use vendcrawl_core::{AppConfig, RegionConfig, RegionsFile};
use vendcrawl_export::Uploader;
use vendcrawl_fetch::{CatalogSource, RetryPolicy};
use vendcrawl_progress::{
    backup_after_checkpoint, Accumulator, HttpBackupSink, ProgressStore, RegionProgress,
};

use crate::error::CrawlError;

/// Totals reported by a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub regions_completed: usize,
    pub total_records: usize,
}

/// Drives the configured region list to completion, resuming from the
/// persisted cursor.
pub struct CrawlRunner<S> {
    pub(crate) source: S,
    pub(crate) store: ProgressStore,
    pub(crate) regions: RegionsFile,
    pub(crate) config: AppConfig,
    pub(crate) retry: RetryPolicy,
    pub(crate) uploader: Uploader,
    pub(crate) backup: Option<HttpBackupSink>,
    shutdown: Arc<AtomicBool>,
}

impl<S: CatalogSource> CrawlRunner<S> {
    pub fn new(
        source: S,
        store: ProgressStore,
        regions: RegionsFile,
        config: AppConfig,
        uploader: Uploader,
        backup: Option<HttpBackupSink>,
    ) -> Self {
        let retry = RetryPolicy::from_config(&config);
        Self {
            source,
            store,
            regions,
            config,
            retry,
            uploader,
            backup,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag the caller sets (e.g. from a signal handler) to stop the run at
    /// the next unit-of-work boundary with a final checkpoint.
    #[must_use]
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub(crate) fn interrupted(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Saves both progress documents and pushes them to the backup sink,
    /// best-effort. This is the only place persistence happens.
    pub(crate) async fn checkpoint(&self, accumulator: &mut Accumulator) -> Result<(), CrawlError> {
        self.store.save(accumulator)?;
        if let Some(sink) = &self.backup {
            backup_after_checkpoint(sink, &self.store).await;
        }
        Ok(())
    }

    /// Runs the crawl: loads progress, determines the resume point, and
    /// drives every unfinished region in order.
    ///
    /// A terminal state (every configured region completed) is recognized
    /// and returns immediately as a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Interrupted`] when the shutdown flag was set
    /// (progress already checkpointed), or the underlying persistence /
    /// finalization error. Progress is checkpointed before any error
    /// propagates, so a subsequent run resumes where this one stopped.
    pub async fn run(&self) -> Result<CrawlSummary, CrawlError> {
        let mut accumulator = self.store.load();

        let pending = resume_order(&self.regions.regions, &accumulator.progress);
        if pending.is_empty() {
            tracing::info!(
                regions = self.regions.regions.len(),
                "all regions already completed — nothing to do"
            );
            return Ok(self.summary(&accumulator));
        }

        tracing::info!(
            pending = pending.len(),
            resume_region = pending.first().map(|(_, r)| r.slug.as_str()),
            "starting crawl"
        );

        for (index, region) in pending {
            if self.interrupted() {
                self.checkpoint(&mut accumulator).await?;
                return Err(CrawlError::Interrupted);
            }
            accumulator.progress.current_region_index = index;
            self.crawl_region(&mut accumulator, region).await?;
        }

        Ok(self.summary(&accumulator))
    }

    fn summary(&self, accumulator: &Accumulator) -> CrawlSummary {
        CrawlSummary {
            regions_completed: accumulator.progress.completed_regions.len(),
            total_records: accumulator.total_records(),
        }
    }
}

/// Orders the pending regions for this run.
///
/// The region named by the persisted cursor always comes first when it is
/// not yet completed — `current_region_index` is advisory only, and a
/// reordered config file must not strand an in-flight region. The rest
/// follow in configured order, completed regions skipped. A cursor naming
/// a region that is no longer configured is ignored.
fn resume_order<'a>(
    regions: &'a [RegionConfig],
    progress: &RegionProgress,
) -> Vec<(usize, &'a RegionConfig)> {
    let in_flight: Option<&str> = progress
        .cursor
        .region
        .as_deref()
        .filter(|slug| !progress.is_region_completed(slug));

    let mut ordered = Vec::new();
    if let Some(slug) = in_flight {
        if let Some((i, region)) = regions.iter().enumerate().find(|(_, r)| r.slug == slug) {
            ordered.push((i, region));
        }
    }
    for (i, region) in regions.iter().enumerate() {
        if progress.is_region_completed(&region.slug) {
            continue;
        }
        if in_flight == Some(region.slug.as_str()) {
            continue;
        }
        ordered.push((i, region));
    }
    ordered
}
