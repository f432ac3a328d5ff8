//! Per-entity collection: the three dependent follow-up fetches.

use vendcrawl_core::{record::entity_key, RegionConfig, VendorListing, VendorRecord};
use vendcrawl_fetch::{CatalogSource, FetchError};
use vendcrawl_progress::Accumulator;

use crate::outcome::{EntityOutcome, SkipReason};
use crate::runner::CrawlRunner;

impl<S: CatalogSource> CrawlRunner<S> {
    /// Collects one entity: menu, then details, then (conditionally)
    /// reviews, merging whatever succeeds into a single record.
    ///
    /// A failed follow-up fetch degrades to an empty block — the entity is
    /// never dropped over a sub-fetch failure, and once recorded its key
    /// enters `processed_keys` so it is not fetched again. Retries of the
    /// *same* entity across process restarts are the page loop's business
    /// via `entity_ordinal`, not this function's; the only retry here is
    /// the bounded HTTP-level policy around each individual fetch.
    ///
    /// The caller is responsible for checkpointing after this returns, so
    /// the key, the record, and the ordinal advance persist together.
    pub(crate) async fn collect_entity(
        &self,
        accumulator: &mut Accumulator,
        region: &RegionConfig,
        listing: &VendorListing,
        page: u32,
    ) -> EntityOutcome {
        // Pure membership test — checked before any I/O.
        if self.regions.is_skipped_category(&listing.cuisine) {
            tracing::debug!(
                region = %region.slug,
                entity = %listing.name,
                category = %listing.cuisine,
                "skipping excluded category"
            );
            return EntityOutcome::Skipped(SkipReason::ExcludedCategory);
        }

        tracing::info!(region = %region.slug, page, entity = %listing.name, "collecting entity");
        let mut record = VendorRecord::from_listing(listing);
        let mut failed_fetches = 0u8;
        let mut attempted_fetches = 0u8;

        attempted_fetches += 1;
        match self
            .retry
            .run_where(|| self.source.vendor_menu(&listing.url), FetchError::is_transient)
            .await
        {
            Ok(menu) => record.menu = menu,
            Err(e) => {
                failed_fetches += 1;
                tracing::warn!(
                    entity = %listing.name,
                    error = %e,
                    "menu fetch failed — continuing with empty menu"
                );
            }
        }

        attempted_fetches += 1;
        match self
            .retry
            .run_where(
                || self.source.vendor_details(&listing.url),
                FetchError::is_transient,
            )
            .await
        {
            Ok(details) => record.details = details,
            Err(e) => {
                failed_fetches += 1;
                tracing::warn!(
                    entity = %listing.name,
                    error = %e,
                    "detail fetch failed — continuing with empty details"
                );
            }
        }

        // The reviews link is only known once details are in; absence or a
        // placeholder value is not an error.
        if let Some(reviews_url) = record.details.reviews_url.clone() {
            attempted_fetches += 1;
            match self
                .retry
                .run_where(
                    || self.source.vendor_reviews(&reviews_url),
                    FetchError::is_transient,
                )
                .await
            {
                Ok(reviews) => record.reviews = reviews,
                Err(e) => {
                    failed_fetches += 1;
                    tracing::warn!(
                        entity = %listing.name,
                        error = %e,
                        "reviews fetch failed — continuing without reviews"
                    );
                }
            }
        }

        accumulator
            .progress
            .cursor
            .processed_keys
            .insert(entity_key(&listing.name, page));
        accumulator.push_record(&region.slug, record);

        if failed_fetches == attempted_fetches {
            tracing::error!(
                entity = %listing.name,
                "every follow-up fetch exhausted its retries — recorded listing data only"
            );
            EntityOutcome::Failed
        } else {
            EntityOutcome::Collected
        }
    }
}
