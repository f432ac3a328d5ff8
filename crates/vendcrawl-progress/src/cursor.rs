//! The resumption pointer: where exactly did collection stop.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Three-level resumption pointer: region, listing page, entity ordinal.
///
/// `entity_ordinal` is only meaningful while `region` is set and `page >= 1`.
/// `processed_keys` is a dedup set of stable entity identities (name + page);
/// it is append-only for the lifetime of a region and covers the case where
/// a page is re-fetched after a crash and entity ordinals have shifted.
///
/// All fields default so that documents written by older builds fill in
/// missing keys at load time instead of failing to parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cursor {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub entity_ordinal: usize,
    #[serde(default)]
    pub total_entities: usize,
    #[serde(default)]
    pub processed_keys: BTreeSet<String>,
    #[serde(default)]
    pub completed_pages: BTreeSet<u32>,
}

impl Cursor {
    /// Re-establishes the cursor invariants before persisting or after
    /// loading a document written by an interrupted process:
    /// `completed_pages ⊆ [1, total_pages]` (cleared entirely while the
    /// page count is still unknown), and no stray per-entity state when no
    /// region is in flight.
    pub fn normalize(&mut self) {
        if self.total_pages == 0 {
            self.completed_pages.clear();
        } else {
            let total = self.total_pages;
            self.completed_pages.retain(|&p| p >= 1 && p <= total);
        }
        if self.region.is_none() {
            *self = Cursor::default();
        }
    }

    /// Resets every field to the fresh-region defaults. Called when a region
    /// completes so the next region starts clean.
    pub fn reset(&mut self) {
        *self = Cursor::default();
    }

    /// Positions the cursor at the start of `page`, clearing the per-page
    /// ordinal.
    pub fn start_page(&mut self, page: u32) {
        self.page = page;
        self.entity_ordinal = 0;
        self.total_entities = 0;
    }

    /// Marks `page` complete and clears the per-page ordinal.
    pub fn complete_page(&mut self, page: u32) {
        self.completed_pages.insert(page);
        self.entity_ordinal = 0;
        self.total_entities = 0;
    }

    #[must_use]
    pub fn is_page_completed(&self, page: u32) -> bool {
        self.completed_pages.contains(&page)
    }

    /// All pages are in `completed_pages` (and the page count is known).
    #[must_use]
    pub fn all_pages_completed(&self) -> bool {
        self.total_pages >= 1 && (1..=self.total_pages).all(|p| self.completed_pages.contains(&p))
    }
}

/// The lightweight pointer document persisted as `cursor.json`.
///
/// `current_region_index` is advisory bookkeeping; the region named by the
/// cursor always takes precedence when resuming. A region only enters
/// `completed_regions` after its export and upload have succeeded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionProgress {
    #[serde(default)]
    pub completed_regions: BTreeSet<String>,
    #[serde(default)]
    pub current_region_index: usize,
    #[serde(default)]
    pub cursor: Cursor,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl RegionProgress {
    #[must_use]
    pub fn is_region_completed(&self, slug: &str) -> bool {
        self.completed_regions.contains(slug)
    }

    /// Moves `slug` into the completed set and resets the cursor for the
    /// next region. Only call after export + upload success.
    pub fn complete_region(&mut self, slug: &str) {
        self.completed_regions.insert(slug.to_owned());
        self.cursor.reset();
    }

    /// Refreshes the checkpoint timestamp.
    pub fn touch(&mut self) {
        self.last_updated = Some(Utc::now());
    }

    pub fn normalize(&mut self) {
        self.cursor.normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cursor_points_nowhere() {
        let cursor = Cursor::default();
        assert!(cursor.region.is_none());
        assert_eq!(cursor.total_pages, 0);
        assert!(cursor.processed_keys.is_empty());
        assert!(!cursor.all_pages_completed());
    }

    #[test]
    fn normalize_drops_out_of_range_completed_pages() {
        let mut cursor = Cursor {
            region: Some("dhaher".to_string()),
            total_pages: 3,
            completed_pages: [0, 1, 3, 4, 9].into_iter().collect(),
            ..Cursor::default()
        };
        cursor.normalize();
        assert_eq!(
            cursor.completed_pages,
            [1, 3].into_iter().collect::<BTreeSet<u32>>()
        );
    }

    #[test]
    fn normalize_clears_pages_while_count_is_unknown() {
        let mut cursor = Cursor {
            region: Some("dhaher".to_string()),
            total_pages: 0,
            completed_pages: [1, 2].into_iter().collect(),
            ..Cursor::default()
        };
        cursor.normalize();
        assert!(cursor.completed_pages.is_empty());
    }

    #[test]
    fn normalize_resets_stray_state_without_region() {
        let mut cursor = Cursor {
            region: None,
            page: 4,
            entity_ordinal: 7,
            total_pages: 9,
            ..Cursor::default()
        };
        cursor.normalize();
        assert_eq!(cursor, Cursor::default());
    }

    #[test]
    fn all_pages_completed_requires_every_page() {
        let mut cursor = Cursor {
            region: Some("dhaher".to_string()),
            total_pages: 2,
            ..Cursor::default()
        };
        cursor.complete_page(1);
        assert!(!cursor.all_pages_completed());
        cursor.complete_page(2);
        assert!(cursor.all_pages_completed());
    }

    #[test]
    fn complete_page_resets_entity_ordinal() {
        let mut cursor = Cursor {
            region: Some("dhaher".to_string()),
            page: 1,
            total_pages: 2,
            entity_ordinal: 5,
            total_entities: 5,
            ..Cursor::default()
        };
        cursor.complete_page(1);
        assert_eq!(cursor.entity_ordinal, 0);
        assert!(cursor.is_page_completed(1));
    }

    #[test]
    fn complete_region_resets_cursor() {
        let mut progress = RegionProgress::default();
        progress.cursor.region = Some("dhaher".to_string());
        progress.cursor.total_pages = 4;
        progress.complete_region("dhaher");
        assert!(progress.is_region_completed("dhaher"));
        assert_eq!(progress.cursor, Cursor::default());
    }

    #[test]
    fn cursor_round_trips_through_json() {
        let cursor = Cursor {
            region: Some("riqqa".to_string()),
            page: 2,
            total_pages: 5,
            entity_ordinal: 3,
            total_entities: 10,
            processed_keys: ["A@p1".to_string(), "B@p2".to_string()]
                .into_iter()
                .collect(),
            completed_pages: [1].into_iter().collect(),
        };
        let json = serde_json::to_string(&cursor).unwrap();
        let back: Cursor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cursor);
    }

    #[test]
    fn missing_keys_fill_with_defaults() {
        // A pointer document from an older build that predates total_entities.
        let json = r#"{"completed_regions":["dhaher"],"cursor":{"region":"riqqa","page":2}}"#;
        let progress: RegionProgress = serde_json::from_str(json).unwrap();
        assert!(progress.is_region_completed("dhaher"));
        assert_eq!(progress.cursor.page, 2);
        assert_eq!(progress.cursor.total_entities, 0);
        assert!(progress.last_updated.is_none());
    }
}
