pub mod accumulator;
pub mod backup;
pub mod cursor;
pub mod error;
pub mod store;

pub use accumulator::Accumulator;
pub use backup::{backup_after_checkpoint, BackupError, BackupSink, HttpBackupSink};
pub use cursor::{Cursor, RegionProgress};
pub use error::ProgressError;
pub use store::ProgressStore;
