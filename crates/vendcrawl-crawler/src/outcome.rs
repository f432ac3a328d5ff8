//! Tagged outcomes for expected branches.
//!
//! "Skip this entity" and "this page produced nothing" are ordinary
//! results of a crawl, not exceptional conditions, so they are values the
//! caller matches on rather than errors thrown and caught.

/// Why an entity was skipped without any network I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The entity's category matches the configured exclusion set.
    ExcludedCategory,
    /// The entity's identity key is already in `processed_keys` — its
    /// record was collected before a crash shifted listing ordinals.
    AlreadyProcessed,
}

/// Outcome of processing one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityOutcome {
    Skipped(SkipReason),
    /// A record was appended; some follow-up blocks may be empty.
    Collected,
    /// Every follow-up fetch exhausted its retries. The entity is still
    /// recorded with its listing data and marked processed so it is not
    /// retried forever.
    Failed,
}

/// Outcome of processing one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was in `completed_pages`; nothing was fetched.
    AlreadyComplete,
    Collected {
        collected: usize,
        skipped: usize,
        failed: usize,
    },
    /// The listing fetch exhausted its retries; the page was treated as
    /// having zero entities and marked complete to bound the blast radius.
    ListingFailed,
}
