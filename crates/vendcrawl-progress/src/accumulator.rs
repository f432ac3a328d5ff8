//! The collected-records store, persisted as `accumulator.json`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use vendcrawl_core::VendorRecord;

use crate::cursor::RegionProgress;

/// The heavyweight progress document: the same pointer state as
/// `cursor.json` plus every record collected so far, keyed by region slug.
///
/// This is the single source of truth for output. The embedded
/// [`RegionProgress`] is what makes the two persisted views reconcilable:
/// if the pointer document is lost or corrupt, the pointer is recovered
/// from here instead of replaying the crawl.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Accumulator {
    #[serde(default)]
    pub progress: RegionProgress,
    #[serde(default)]
    pub collected: BTreeMap<String, Vec<VendorRecord>>,
}

impl Accumulator {
    #[must_use]
    pub fn records_for(&self, region: &str) -> &[VendorRecord] {
        self.collected.get(region).map_or(&[], Vec::as_slice)
    }

    /// Appends `record` to the region's list, replacing any existing record
    /// with the same name and URL.
    ///
    /// The replace path only fires when a crash landed between the
    /// accumulator write and the pointer write of a checkpoint, and the
    /// entity is re-collected on resume; replacing keeps the list free of
    /// duplicates without dropping the fresher data.
    pub fn push_record(&mut self, region: &str, record: VendorRecord) {
        let records = self.collected.entry(region.to_owned()).or_default();
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.name == record.name && r.url == record.url)
        {
            *existing = record;
        } else {
            records.push(record);
        }
    }

    #[must_use]
    pub fn total_records(&self) -> usize {
        self.collected.values().map(Vec::len).sum()
    }
}
