//! Durable, atomic persistence of the two progress documents.
//!
//! Layout in the data directory:
//! - `cursor.json` — the lightweight pointer document ([`RegionProgress`]).
//! - `accumulator.json` — the full [`Accumulator`] including collected
//!   records.
//!
//! Every save writes the accumulator **before** the pointer. A crash
//! between the two writes can therefore only leave the pointer behind the
//! accumulator, which on resume re-processes at most one entity (deduped by
//! [`Accumulator::push_record`]) — never skips an entity whose record was
//! not persisted.
//!
//! Each document is written to a temp file in the same directory, fsynced,
//! and atomically renamed over the target, so a crash mid-write never
//! leaves a half-written file.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::accumulator::Accumulator;
use crate::cursor::RegionProgress;
use crate::error::ProgressError;

const CURSOR_FILE: &str = "cursor.json";
const ACCUMULATOR_FILE: &str = "accumulator.json";

pub struct ProgressStore {
    data_dir: PathBuf,
}

impl ProgressStore {
    /// Opens (and creates if needed) the data directory.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::Io`] if the directory cannot be created.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, ProgressError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|e| ProgressError::io(&data_dir, e))?;
        Ok(Self { data_dir })
    }

    #[must_use]
    pub fn cursor_path(&self) -> PathBuf {
        self.data_dir.join(CURSOR_FILE)
    }

    #[must_use]
    pub fn accumulator_path(&self) -> PathBuf {
        self.data_dir.join(ACCUMULATOR_FILE)
    }

    /// Loads the persisted state, repairing whatever is missing or corrupt.
    ///
    /// The accumulator document is authoritative. The pointer document,
    /// when it parses **and the accumulator itself parsed**, overrides the
    /// embedded pointer: it is written last, so it is never *ahead* of the
    /// accumulator, and preferring it means a checkpoint interrupted
    /// between the two writes re-processes one entity instead of skipping
    /// it. A pointer surviving a lost accumulator is ignored entirely:
    /// its `processed_keys`/`completed_pages` would skip work whose
    /// records no longer exist, and re-scraping is recoverable where
    /// dropped output is not. A missing or unparseable file is logged and
    /// replaced by defaults — this method never fails the caller over
    /// file contents.
    #[must_use]
    pub fn load(&self) -> Accumulator {
        let loaded = self.read_document::<Accumulator>(&self.accumulator_path());
        let records_intact = matches!(loaded, LoadedDocument::Parsed(_));
        let mut accumulator = match loaded {
            LoadedDocument::Parsed(acc) => acc,
            LoadedDocument::Missing => {
                tracing::info!(path = %self.accumulator_path().display(), "no accumulator document — starting fresh");
                Accumulator::default()
            }
            LoadedDocument::Corrupt => Accumulator::default(),
        };

        if records_intact {
            match self.read_document::<RegionProgress>(&self.cursor_path()) {
                LoadedDocument::Parsed(progress) => accumulator.progress = progress,
                LoadedDocument::Missing | LoadedDocument::Corrupt => {
                    // Fall back to the pointer embedded in the accumulator.
                }
            }
        } else if self.cursor_path().exists() {
            tracing::warn!(
                path = %self.cursor_path().display(),
                "ignoring pointer document — its accumulator is missing or corrupt"
            );
        }

        accumulator.progress.normalize();
        accumulator
    }

    /// Checkpoint: re-normalizes derived fields, stamps the time, and
    /// atomically writes both documents (accumulator first).
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError`] if serialization or any file operation
    /// fails; the previous on-disk documents are left intact in that case.
    pub fn save(&self, accumulator: &mut Accumulator) -> Result<(), ProgressError> {
        accumulator.progress.touch();
        accumulator.progress.normalize();

        let accumulator_bytes = serde_json::to_vec_pretty(accumulator)?;
        self.atomic_write(&self.accumulator_path(), &accumulator_bytes)?;

        let cursor_bytes = serde_json::to_vec_pretty(&accumulator.progress)?;
        self.atomic_write(&self.cursor_path(), &cursor_bytes)?;
        Ok(())
    }

    fn read_document<T: serde::de::DeserializeOwned>(&self, path: &Path) -> LoadedDocument<T> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return LoadedDocument::Missing,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable progress document — replacing with defaults");
                return LoadedDocument::Corrupt;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => LoadedDocument::Parsed(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt progress document — replacing with defaults");
                LoadedDocument::Corrupt
            }
        }
    }

    fn atomic_write(&self, path: &Path, bytes: &[u8]) -> Result<(), ProgressError> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.data_dir)
            .map_err(|e| ProgressError::io(&self.data_dir, e))?;
        tmp.write_all(bytes).map_err(|e| ProgressError::io(path, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| ProgressError::io(path, e))?;
        tmp.persist(path)
            .map_err(|e| ProgressError::io(path, e.error))?;
        Ok(())
    }
}

enum LoadedDocument<T> {
    Parsed(T),
    Missing,
    Corrupt,
}

#[cfg(test)]
mod tests {
    use vendcrawl_core::{VendorListing, VendorRecord};

    use super::*;

    fn store() -> (tempfile::TempDir, ProgressStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path()).unwrap();
        (dir, store)
    }

    fn record(name: &str) -> VendorRecord {
        VendorRecord::from_listing(&VendorListing {
            name: name.to_string(),
            cuisine: "Pizza".to_string(),
            rating: None,
            delivery_time: None,
            delivery_fee: None,
            min_order: None,
            url: format!("https://x.example/{name}"),
        })
    }

    #[test]
    fn load_with_no_files_returns_defaults() {
        let (_dir, store) = store();
        let acc = store.load();
        assert!(acc.progress.cursor.region.is_none());
        assert_eq!(acc.total_records(), 0);
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = store();
        let mut acc = Accumulator::default();
        acc.progress.cursor.region = Some("dhaher".to_string());
        acc.progress.cursor.page = 2;
        acc.progress.cursor.total_pages = 5;
        acc.progress.cursor.completed_pages.insert(1);
        acc.push_record("dhaher", record("A"));
        store.save(&mut acc).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.progress.cursor.region.as_deref(), Some("dhaher"));
        assert_eq!(loaded.progress.cursor.page, 2);
        assert_eq!(loaded.records_for("dhaher").len(), 1);
        assert!(loaded.progress.last_updated.is_some());
    }

    #[test]
    fn corrupt_accumulator_is_replaced_with_defaults() {
        let (_dir, store) = store();
        std::fs::write(store.accumulator_path(), "{ not json").unwrap();
        let acc = store.load();
        assert_eq!(acc.total_records(), 0);
        assert!(acc.progress.cursor.region.is_none());
    }

    #[test]
    fn corrupt_accumulator_also_discards_surviving_pointer() {
        // A cursor outliving its accumulator must not be believed: its
        // processed keys and completed pages would skip entities and pages
        // whose records no longer exist.
        let (_dir, store) = store();
        let mut acc = Accumulator::default();
        acc.progress.cursor.region = Some("dhaher".to_string());
        acc.progress.cursor.total_pages = 2;
        acc.progress.cursor.completed_pages.insert(1);
        acc.progress.cursor.processed_keys.insert("Alpha Burgers@p1".to_string());
        acc.push_record("dhaher", record("Alpha Burgers"));
        store.save(&mut acc).unwrap();

        std::fs::write(store.accumulator_path(), "{ corrupt").unwrap();

        let loaded = store.load();
        assert_eq!(loaded.total_records(), 0);
        assert!(!loaded.progress.cursor.processed_keys.contains("Alpha Burgers@p1"));
        assert!(loaded.progress.cursor.completed_pages.is_empty());
        assert!(loaded.progress.cursor.region.is_none());
    }

    #[test]
    fn corrupt_cursor_falls_back_to_embedded_pointer() {
        let (_dir, store) = store();
        let mut acc = Accumulator::default();
        acc.progress.cursor.region = Some("riqqa".to_string());
        acc.progress.cursor.page = 3;
        acc.progress.cursor.total_pages = 4;
        store.save(&mut acc).unwrap();

        std::fs::write(store.cursor_path(), "garbage").unwrap();
        let loaded = store.load();
        assert_eq!(loaded.progress.cursor.region.as_deref(), Some("riqqa"));
        assert_eq!(loaded.progress.cursor.page, 3);
    }

    #[test]
    fn pointer_document_overrides_embedded_pointer() {
        // Simulates a crash between the accumulator write and the pointer
        // write of an *earlier* checkpoint: the pointer on disk is one step
        // behind the accumulator's embedded pointer.
        let (_dir, store) = store();
        let mut acc = Accumulator::default();
        acc.progress.cursor.region = Some("dhaher".to_string());
        acc.progress.cursor.page = 1;
        acc.progress.cursor.total_pages = 2;
        acc.progress.cursor.entity_ordinal = 4;
        store.save(&mut acc).unwrap();

        let mut behind = acc.progress.clone();
        behind.cursor.entity_ordinal = 3;
        std::fs::write(
            store.cursor_path(),
            serde_json::to_vec(&behind).unwrap(),
        )
        .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.progress.cursor.entity_ordinal, 3);
    }

    #[test]
    fn save_normalizes_out_of_range_completed_pages() {
        let (_dir, store) = store();
        let mut acc = Accumulator::default();
        acc.progress.cursor.region = Some("dhaher".to_string());
        acc.progress.cursor.total_pages = 2;
        acc.progress.cursor.completed_pages.extend([1, 2, 7]);
        store.save(&mut acc).unwrap();

        let loaded = store.load();
        assert_eq!(
            loaded.progress.cursor.completed_pages,
            [1, 2].into_iter().collect()
        );
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let (dir, store) = store();
        let mut acc = Accumulator::default();
        store.save(&mut acc).unwrap();
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2, "unexpected files: {names:?}");
        assert!(names.contains(&"cursor.json".to_string()));
        assert!(names.contains(&"accumulator.json".to_string()));
    }

    #[test]
    fn terminal_state_round_trips_as_a_noop() {
        let (_dir, store) = store();
        let mut acc = Accumulator::default();
        acc.progress.complete_region("dhaher");
        acc.progress.complete_region("riqqa");
        store.save(&mut acc).unwrap();

        let loaded = store.load();
        assert!(loaded.progress.is_region_completed("dhaher"));
        assert!(loaded.progress.is_region_completed("riqqa"));
        assert_eq!(loaded.progress.cursor, crate::Cursor::default());
    }
}
