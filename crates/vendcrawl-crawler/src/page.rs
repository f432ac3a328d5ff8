//! Per-page collection: listing fetch, entity iteration, ordinal cursor.

use std::time::Duration;

use vendcrawl_core::{record::entity_key, RegionConfig};
use vendcrawl_fetch::{CatalogSource, FetchError};
use vendcrawl_progress::Accumulator;

use crate::error::CrawlError;
use crate::outcome::{EntityOutcome, PageOutcome, SkipReason};
use crate::runner::CrawlRunner;

impl<S: CatalogSource> CrawlRunner<S> {
    /// Collects one listing page of the region.
    ///
    /// The save after every single entity is the finest-grained durability
    /// point in the system: per-entity fetches are the most expensive and
    /// least safe work to repeat, so the ordinal advance, the processed
    /// key, and the appended record always hit disk together before the
    /// next entity starts.
    ///
    /// # Errors
    ///
    /// Only persistence failures and interruption propagate; fetch
    /// failures degrade the page instead.
    pub(crate) async fn collect_page(
        &self,
        accumulator: &mut Accumulator,
        region: &RegionConfig,
        page: u32,
    ) -> Result<PageOutcome, CrawlError> {
        if accumulator.progress.cursor.is_page_completed(page) {
            tracing::debug!(region = %region.slug, page, "page already completed — skipping");
            return Ok(PageOutcome::AlreadyComplete);
        }

        let listings = match self
            .retry
            .run_where(
                || self.source.listing_page(region, page),
                FetchError::is_transient,
            )
            .await
        {
            Ok(listings) => listings,
            Err(e) => {
                // One bad page must not abort the region: treat it as
                // empty, mark it complete, and move on.
                tracing::error!(
                    region = %region.slug,
                    page,
                    error = %e,
                    "listing fetch exhausted retries — treating page as empty"
                );
                accumulator.progress.cursor.complete_page(page);
                self.checkpoint(accumulator).await?;
                return Ok(PageOutcome::ListingFailed);
            }
        };

        accumulator.progress.cursor.total_entities = listings.len();
        let resume_at = accumulator.progress.cursor.entity_ordinal.min(listings.len());
        if resume_at > 0 {
            tracing::info!(
                region = %region.slug,
                page,
                entity_ordinal = resume_at,
                "resuming mid-page"
            );
        }

        let mut collected = 0usize;
        let mut skipped = 0usize;
        let mut failed = 0usize;

        for (ordinal, listing) in listings.iter().enumerate().skip(resume_at) {
            if self.interrupted() {
                self.checkpoint(accumulator).await?;
                return Err(CrawlError::Interrupted);
            }

            // A page re-fetched after a crash may list entities at shifted
            // ordinals; the key set, not the ordinal, decides whether an
            // entity was already collected.
            let key = entity_key(&listing.name, page);
            let outcome = if accumulator.progress.cursor.processed_keys.contains(&key) {
                tracing::debug!(entity = %listing.name, page, "already processed — skipping");
                EntityOutcome::Skipped(SkipReason::AlreadyProcessed)
            } else {
                self.collect_entity(accumulator, region, listing, page).await
            };

            match outcome {
                EntityOutcome::Collected => collected += 1,
                EntityOutcome::Skipped(_) => skipped += 1,
                EntityOutcome::Failed => failed += 1,
            }

            // Advance past this entity whatever happened, and persist.
            accumulator.progress.cursor.entity_ordinal = ordinal + 1;
            self.checkpoint(accumulator).await?;

            if ordinal + 1 < listings.len() && self.config.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.inter_request_delay_ms)).await;
            }
        }

        accumulator.progress.cursor.complete_page(page);
        self.checkpoint(accumulator).await?;

        tracing::info!(
            region = %region.slug,
            page,
            collected,
            skipped,
            failed,
            "page completed"
        );
        Ok(PageOutcome::Collected {
            collected,
            skipped,
            failed,
        })
    }
}
