//! Per-region crawl: page-count discovery, the page loop, finalization.

use std::time::Duration;

use vendcrawl_core::RegionConfig;
use vendcrawl_export::{write_menu_csv, write_summary_csv};
use vendcrawl_fetch::{CatalogSource, FetchError};
use vendcrawl_progress::Accumulator;

use crate::error::CrawlError;
use crate::outcome::PageOutcome;
use crate::runner::CrawlRunner;

impl<S: CatalogSource> CrawlRunner<S> {
    /// Crawls one region to completion: adopts the cursor, discovers the
    /// page count if unknown, walks every listing page, then finalizes.
    ///
    /// All of this is re-entrant. A run killed at any point leaves a cursor
    /// a later run picks up: an unknown page count is re-discovered,
    /// completed pages are skipped, a mid-page ordinal resumes within the
    /// page, and a region whose pages are all complete goes straight to
    /// finalization again.
    pub(crate) async fn crawl_region(
        &self,
        accumulator: &mut Accumulator,
        region: &RegionConfig,
    ) -> Result<(), CrawlError> {
        if accumulator.progress.cursor.region.as_deref() != Some(region.slug.as_str()) {
            accumulator.progress.cursor.reset();
            accumulator.progress.cursor.region = Some(region.slug.clone());
            self.checkpoint(accumulator).await?;
        }

        if accumulator.progress.cursor.total_pages == 0 {
            let total_pages = self.determine_page_count(region).await;
            tracing::info!(region = %region.slug, total_pages, "page count determined");
            accumulator.progress.cursor.total_pages = total_pages;
            self.checkpoint(accumulator).await?;
        }

        let total_pages = accumulator.progress.cursor.total_pages;
        tracing::info!(
            region = %region.slug,
            name = %region.name,
            resume_page = accumulator.progress.cursor.page.max(1),
            total_pages,
            "crawling region"
        );

        // Every page is walked; completed ones fall through the fast path
        // in `collect_page`. Finalization is therefore only reachable with
        // all pages in `completed_pages`, even when a persisted page
        // number is inconsistent with the page count.
        for page in 1..=total_pages {
            if self.interrupted() {
                self.checkpoint(accumulator).await?;
                return Err(CrawlError::Interrupted);
            }

            // A fresh page resets the ordinal; re-entering the cursor's own
            // page keeps it so the run resumes mid-page.
            if !accumulator.progress.cursor.is_page_completed(page)
                && accumulator.progress.cursor.page != page
            {
                accumulator.progress.cursor.start_page(page);
                self.checkpoint(accumulator).await?;
            }

            let outcome = self.collect_page(accumulator, region, page).await?;
            let fetched = !matches!(outcome, PageOutcome::AlreadyComplete);
            if fetched && page < total_pages && self.config.inter_page_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.inter_page_delay_ms)).await;
            }
        }

        self.finalize_region(accumulator, region).await
    }

    /// Discovers how many listing pages the region has.
    ///
    /// Exhausted retries fall back to a single page rather than failing the
    /// region; page one is always worth attempting.
    async fn determine_page_count(&self, region: &RegionConfig) -> u32 {
        match self
            .retry
            .run_where(|| self.source.page_count(region), FetchError::is_transient)
            .await
        {
            Ok(total) => total.max(1),
            Err(e) => {
                tracing::warn!(
                    region = %region.slug,
                    error = %e,
                    "page count discovery failed — assuming a single page"
                );
                1
            }
        }
    }

    /// Exports and uploads the region's records, then marks it completed.
    ///
    /// Export or upload failure propagates and ends the run with the cursor
    /// still naming this region, so the next run re-enters finalization
    /// without re-fetching anything. Completion is only recorded after the
    /// outputs exist (and, when destinations are configured, after every
    /// upload succeeded).
    async fn finalize_region(
        &self,
        accumulator: &mut Accumulator,
        region: &RegionConfig,
    ) -> Result<(), CrawlError> {
        let records = accumulator.records_for(&region.slug).to_vec();
        tracing::info!(
            region = %region.slug,
            records = records.len(),
            "finalizing region"
        );

        std::fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            vendcrawl_export::ExportError::Io {
                path: self.config.output_dir.display().to_string(),
                source: e,
            }
        })?;
        let summary_path =
            write_summary_csv(&self.config.output_dir, &region.slug, &records)?;
        let menu_path = write_menu_csv(&self.config.output_dir, &region.slug, &records)?;

        if self.uploader.has_destinations() {
            self.uploader.upload_all(&summary_path, &self.retry).await?;
            self.uploader.upload_all(&menu_path, &self.retry).await?;
        }

        accumulator.progress.complete_region(&region.slug);
        self.checkpoint(accumulator).await?;
        tracing::info!(region = %region.slug, "region completed");
        Ok(())
    }
}
